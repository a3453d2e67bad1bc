use crate::db::Budget;
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::parse_date_safe;

pub const BUDGET_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

pub async fn get_budget_list(State(state): State<AppState>) -> VenueResult<Json<Vec<Budget>>> {
    Ok(Json(
        sqlx::query_as::<_, Budget>("SELECT * FROM budgets ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub id: Option<i32>,
    pub client_name: String,
    pub package: String,
    pub amount: i64,
    pub status: Option<String>,
    pub event_date: Option<String>,
    pub notes: Option<String>,
}

pub async fn save_budget(
    State(state): State<AppState>,
    Json(budget): Json<BudgetInput>,
) -> VenueResult<Json<i32>> {
    if budget.client_name.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe o nome do cliente.".to_string(),
        ));
    }
    if budget.amount < 0 {
        return Err(VenueError::Validation(
            "O valor não pode ser negativo.".to_string(),
        ));
    }

    let status = budget.status.unwrap_or_else(|| "pending".to_string());
    if !BUDGET_STATUSES.contains(&status.as_str()) {
        return Err(VenueError::Validation(
            "Status de orçamento inválido.".to_string(),
        ));
    }

    let event_date = budget.event_date.as_deref().and_then(parse_date_safe);

    let id = if let Some(id) = budget.id {
        sqlx::query(
            "UPDATE budgets SET client_name=$1, package=$2, amount=$3, status=$4, event_date=$5, notes=$6, updated_at=CURRENT_TIMESTAMP WHERE id=$7",
        )
        .bind(budget.client_name.trim())
        .bind(&budget.package)
        .bind(budget.amount)
        .bind(&status)
        .bind(event_date)
        .bind(&budget.notes)
        .bind(id)
        .execute(&state.pool)
        .await?;
        id
    } else {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO budgets (client_name, package, amount, status, event_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(budget.client_name.trim())
        .bind(&budget.package)
        .bind(budget.amount)
        .bind(&status)
        .bind(event_date)
        .bind(&budget.notes)
        .fetch_one(&state.pool)
        .await?;
        row.0
    };

    Ok(Json(id))
}

#[derive(Deserialize)]
pub struct DeleteBudgetInput {
    pub id: i32,
}

pub async fn delete_budget(
    State(state): State<AppState>,
    Json(input): Json<DeleteBudgetInput>,
) -> VenueResult<Json<Value>> {
    sqlx::query("DELETE FROM budgets WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
