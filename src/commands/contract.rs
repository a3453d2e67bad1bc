use crate::db::{Contract, DbPool};
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, State};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::{next_protocol, parse_date_safe};

pub const CONTRACT_STATUSES: [&str; 3] = ["pending", "signed", "cancelled"];

pub async fn get_contract_list(State(state): State<AppState>) -> VenueResult<Json<Vec<Contract>>> {
    Ok(Json(
        sqlx::query_as::<_, Contract>("SELECT * FROM contracts ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInput {
    pub id: Option<i32>,
    pub client_name: String,
    pub amount: i64,
    pub event_date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_contract_internal(pool: &DbPool, input: ContractInput) -> VenueResult<String> {
    if input.client_name.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe o nome do cliente.".to_string(),
        ));
    }
    if input.amount < 0 {
        return Err(VenueError::Validation(
            "O valor não pode ser negativo.".to_string(),
        ));
    }

    let status = input.status.unwrap_or_else(|| "pending".to_string());
    if !CONTRACT_STATUSES.contains(&status.as_str()) {
        return Err(VenueError::Validation(
            "Status de contrato inválido.".to_string(),
        ));
    }

    let event_date = input.event_date.as_deref().and_then(parse_date_safe);

    // Protocol: YYYYMMDD-5XXXX, sequence restarts every day.
    let date_str = Local::now().format("%Y%m%d").to_string();
    let last_record: Option<(String,)> = sqlx::query_as(
        "SELECT protocol FROM contracts WHERE protocol LIKE $1 ORDER BY protocol DESC LIMIT 1",
    )
    .bind(format!("{}%", date_str))
    .fetch_optional(pool)
    .await?;

    let protocol = next_protocol(&date_str, last_record.as_ref().map(|(p,)| p.as_str()));

    sqlx::query(
        "INSERT INTO contracts (protocol, client_name, amount, event_date, status, notes)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&protocol)
    .bind(input.client_name.trim())
    .bind(input.amount)
    .bind(event_date)
    .bind(&status)
    .bind(&input.notes)
    .execute(pool)
    .await?;

    Ok(protocol)
}

pub async fn save_contract(
    State(state): State<AppState>,
    Json(input): Json<ContractInput>,
) -> VenueResult<Json<Value>> {
    if let Some(id) = input.id {
        if input.client_name.trim().is_empty() {
            return Err(VenueError::Validation(
                "Informe o nome do cliente.".to_string(),
            ));
        }
        let status = input.status.unwrap_or_else(|| "pending".to_string());
        if !CONTRACT_STATUSES.contains(&status.as_str()) {
            return Err(VenueError::Validation(
                "Status de contrato inválido.".to_string(),
            ));
        }
        let event_date = input.event_date.as_deref().and_then(parse_date_safe);

        // The protocol never changes after issuance.
        sqlx::query(
            "UPDATE contracts SET client_name=$1, amount=$2, event_date=$3, status=$4, notes=$5, updated_at=CURRENT_TIMESTAMP WHERE id=$6",
        )
        .bind(input.client_name.trim())
        .bind(input.amount)
        .bind(event_date)
        .bind(&status)
        .bind(&input.notes)
        .bind(id)
        .execute(&state.pool)
        .await?;

        Ok(Json(json!({ "success": true, "id": id })))
    } else {
        let protocol = create_contract_internal(&state.pool, input).await?;
        Ok(Json(json!({ "success": true, "protocol": protocol })))
    }
}

#[derive(Deserialize)]
pub struct DeleteContractInput {
    pub id: i32,
}

pub async fn delete_contract(
    State(state): State<AppState>,
    Json(input): Json<DeleteContractInput>,
) -> VenueResult<Json<Value>> {
    sqlx::query("DELETE FROM contracts WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
