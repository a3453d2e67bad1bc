use crate::db::{DbPool, FinancialEntry};
use crate::error::{VenueError, VenueResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Json, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{Postgres, Transaction};

use super::utils::{parse_date_safe, total_receivable};

/// Posts the deposit of a freshly created booking into the ledger. Runs in
/// the booking's own transaction; the unique (booking_id, posting_reason)
/// index makes a duplicate call a no-op. Returns whether a row was written.
pub async fn post_deposit(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: i32,
    client_id: Option<i32>,
    client_name: &str,
    service_label: &str,
    entry_date: NaiveDate,
    deposit_value: i64,
) -> VenueResult<bool> {
    if deposit_value <= 0 {
        return Ok(false);
    }

    let result = sqlx::query(
        "INSERT INTO financial (description, amount, kind, entry_date, category, booking_id, posting_reason)
         VALUES ($1, $2, 'income', $3, 'Reserva', $4, 'deposit')
         ON CONFLICT (booking_id, posting_reason) WHERE posting_reason IS NOT NULL DO NOTHING",
    )
    .bind(format!("Sinal - {} ({})", client_name, service_label))
    .bind(deposit_value)
    .bind(entry_date)
    .bind(booking_id)
    .execute(&mut **tx)
    .await?;

    let posted = result.rows_affected() > 0;
    if posted {
        if let Some(client_id) = client_id {
            sqlx::query("UPDATE clients SET total_revenue = total_revenue + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
                .bind(deposit_value)
                .bind(client_id)
                .execute(&mut **tx)
                .await?;
        }
    }
    Ok(posted)
}

/// Posts the remaining balance when a booking is marked paid. Same
/// transaction as the status change, so the two writes commit together.
pub async fn post_final_payment(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: i32,
    client_id: Option<i32>,
    client_name: &str,
    service_label: &str,
    entry_date: NaiveDate,
    amount: i64,
) -> VenueResult<bool> {
    if amount <= 0 {
        return Ok(false);
    }

    let result = sqlx::query(
        "INSERT INTO financial (description, amount, kind, entry_date, category, booking_id, posting_reason)
         VALUES ($1, $2, 'income', $3, 'Evento', $4, 'final-payment')
         ON CONFLICT (booking_id, posting_reason) WHERE posting_reason IS NOT NULL DO NOTHING",
    )
    .bind(format!(
        "Pagamento final - {} ({})",
        client_name, service_label
    ))
    .bind(amount)
    .bind(entry_date)
    .bind(booking_id)
    .execute(&mut **tx)
    .await?;

    let posted = result.rows_affected() > 0;
    if posted {
        if let Some(client_id) = client_id {
            sqlx::query("UPDATE clients SET total_revenue = total_revenue + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
                .bind(amount)
                .bind(client_id)
                .execute(&mut **tx)
                .await?;
        }
    }
    Ok(posted)
}

// --- Manual entries ---

#[derive(Deserialize)]
pub struct LedgerSearchQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn get_financial_entries(
    State(state): State<AppState>,
    Query(query): Query<LedgerSearchQuery>,
) -> VenueResult<Json<Vec<FinancialEntry>>> {
    let entries = if let (Some(s), Some(e)) = (query.start_date, query.end_date) {
        let sd = parse_date_safe(&s)
            .ok_or_else(|| VenueError::Validation("Data inicial inválida.".to_string()))?;
        let ed = parse_date_safe(&e)
            .ok_or_else(|| VenueError::Validation("Data final inválida.".to_string()))?;
        sqlx::query_as::<_, FinancialEntry>(
            "SELECT * FROM financial WHERE entry_date BETWEEN $1 AND $2 ORDER BY entry_date DESC, id DESC",
        )
        .bind(sd)
        .bind(ed)
        .fetch_all(&state.pool)
        .await?
    } else {
        sqlx::query_as::<_, FinancialEntry>(
            "SELECT * FROM financial ORDER BY entry_date DESC, id DESC",
        )
        .fetch_all(&state.pool)
        .await?
    };
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntryInput {
    pub id: Option<i32>,
    pub description: String,
    pub amount: i64,
    pub kind: String,
    pub entry_date: String,
    pub category: String,
}

pub async fn create_financial_entry_internal(
    pool: &DbPool,
    input: FinancialEntryInput,
) -> VenueResult<i32> {
    if input.description.trim().is_empty() {
        return Err(VenueError::Validation("Informe a descrição.".to_string()));
    }
    if input.amount <= 0 {
        return Err(VenueError::Validation(
            "O valor deve ser maior que zero.".to_string(),
        ));
    }
    if !matches!(input.kind.as_str(), "income" | "expense") {
        return Err(VenueError::Validation(
            "Tipo de lançamento inválido.".to_string(),
        ));
    }
    let entry_date = parse_date_safe(&input.entry_date)
        .ok_or_else(|| VenueError::Validation("Data inválida.".to_string()))?;

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO financial (description, amount, kind, entry_date, category)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(input.description.trim())
    .bind(input.amount)
    .bind(&input.kind)
    .bind(entry_date)
    .bind(&input.category)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

pub async fn save_financial_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<FinancialEntryInput>,
) -> VenueResult<Json<i32>> {
    claims.require_admin()?;

    if let Some(id) = input.id {
        if input.amount <= 0 {
            return Err(VenueError::Validation(
                "O valor deve ser maior que zero.".to_string(),
            ));
        }
        if !matches!(input.kind.as_str(), "income" | "expense") {
            return Err(VenueError::Validation(
                "Tipo de lançamento inválido.".to_string(),
            ));
        }
        let entry_date = parse_date_safe(&input.entry_date)
            .ok_or_else(|| VenueError::Validation("Data inválida.".to_string()))?;

        // Automatic postings stay tied to their booking event; only manual
        // rows can be edited.
        let posting: Option<Option<String>> =
            sqlx::query_scalar("SELECT posting_reason FROM financial WHERE id = $1")
                .bind(id)
                .fetch_optional(&state.pool)
                .await?;

        match posting {
            None => {
                return Err(VenueError::Validation(
                    "Lançamento não encontrado.".to_string(),
                ))
            }
            Some(Some(_)) => {
                return Err(VenueError::Validation(
                    "Lançamentos automáticos não podem ser editados.".to_string(),
                ))
            }
            Some(None) => {}
        }

        sqlx::query(
            "UPDATE financial SET description=$1, amount=$2, kind=$3, entry_date=$4, category=$5 WHERE id=$6",
        )
        .bind(input.description.trim())
        .bind(input.amount)
        .bind(&input.kind)
        .bind(entry_date)
        .bind(&input.category)
        .bind(id)
        .execute(&state.pool)
        .await?;
        Ok(Json(id))
    } else {
        let id = create_financial_entry_internal(&state.pool, input).await?;
        Ok(Json(id))
    }
}

#[derive(Deserialize)]
pub struct DeleteEntryInput {
    pub id: i32,
}

pub async fn delete_financial_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<DeleteEntryInput>,
) -> VenueResult<Json<Value>> {
    claims.require_admin()?;
    sqlx::query("DELETE FROM financial WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}

// --- Aggregates ---

#[derive(Debug, Serialize)]
pub struct FinanceSummary {
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
    pub total_receivable: i64,
}

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub async fn get_finance_summary_internal(
    pool: &DbPool,
    year: Option<i32>,
    month: Option<u32>,
) -> VenueResult<FinanceSummary> {
    let (income, expense): (Option<i64>, Option<i64>) = match (year, month) {
        (Some(y), Some(m)) => {
            sqlx::query_as(
                "SELECT SUM(amount) FILTER (WHERE kind = 'income'), SUM(amount) FILTER (WHERE kind = 'expense')
                 FROM financial
                 WHERE EXTRACT(YEAR FROM entry_date) = $1 AND EXTRACT(MONTH FROM entry_date) = $2",
            )
            .bind(y)
            .bind(m as i32)
            .fetch_one(pool)
            .await?
        }
        (Some(y), None) => {
            sqlx::query_as(
                "SELECT SUM(amount) FILTER (WHERE kind = 'income'), SUM(amount) FILTER (WHERE kind = 'expense')
                 FROM financial WHERE EXTRACT(YEAR FROM entry_date) = $1",
            )
            .bind(y)
            .fetch_one(pool)
            .await?
        }
        _ => {
            sqlx::query_as(
                "SELECT SUM(amount) FILTER (WHERE kind = 'income'), SUM(amount) FILTER (WHERE kind = 'expense')
                 FROM financial",
            )
            .fetch_one(pool)
            .await?
        }
    };

    // Receivables are re-derived from the booking collection on every call:
    // a plain fold over (status, remaining) rows.
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, total_value - deposit_value FROM appointments",
    )
    .fetch_all(pool)
    .await?;

    let income = income.unwrap_or(0);
    let expense = expense.unwrap_or(0);

    Ok(FinanceSummary {
        income,
        expense,
        balance: income - expense,
        total_receivable: total_receivable(&rows),
    })
}

pub async fn get_finance_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> VenueResult<Json<FinanceSummary>> {
    let summary = get_finance_summary_internal(&state.pool, query.year, query.month).await?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
pub struct MonthlyFlow {
    pub month: String,
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
}

#[derive(Deserialize)]
pub struct MonthlyQuery {
    pub year: i32,
}

pub async fn get_monthly_flow(
    State(state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> VenueResult<Json<Vec<MonthlyFlow>>> {
    let year = query.year;

    let income: Vec<(i32, i64)> = sqlx::query_as(
        "SELECT EXTRACT(MONTH FROM entry_date)::integer, SUM(amount)::bigint
         FROM financial WHERE EXTRACT(YEAR FROM entry_date) = $1 AND kind = 'income' GROUP BY 1",
    )
    .bind(year)
    .fetch_all(&state.pool)
    .await?;
    let expense: Vec<(i32, i64)> = sqlx::query_as(
        "SELECT EXTRACT(MONTH FROM entry_date)::integer, SUM(amount)::bigint
         FROM financial WHERE EXTRACT(YEAR FROM entry_date) = $1 AND kind = 'expense' GROUP BY 1",
    )
    .bind(year)
    .fetch_all(&state.pool)
    .await?;

    let mut report = Vec::new();
    for m in 1..=12 {
        let month_income = income
            .iter()
            .find(|(month, _)| *month == m)
            .map(|(_, amt)| *amt)
            .unwrap_or(0);
        let month_expense = expense
            .iter()
            .find(|(month, _)| *month == m)
            .map(|(_, amt)| *amt)
            .unwrap_or(0);

        report.push(MonthlyFlow {
            month: format!("{}-{:02}", year, m),
            income: month_income,
            expense: month_expense,
            balance: month_income - month_expense,
        });
    }

    Ok(Json(report))
}
