use crate::db::{Appointment, DbPool};
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ledger::{post_deposit, post_final_payment};
use super::utils::parse_date_safe;

/// The calendar works on a fixed grid of half-hour slots.
pub const TIME_SLOTS: [&str; 30] = [
    "08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30",
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00", "17:30",
    "18:00", "18:30", "19:00", "19:30", "20:00", "20:30", "21:00", "21:30", "22:00", "22:30",
];

pub const STATUSES: [&str; 5] = ["pending", "confirmed", "done", "paid", "cancelled"];

pub fn is_valid_slot(label: &str) -> bool {
    TIME_SLOTS.contains(&label)
}

const APPOINTMENT_SELECT: &str = "SELECT a.id, a.booking_date, a.time_slot, a.client_id, \
     c.name AS client_name, a.service_label, a.status, a.total_value, a.deposit_value, \
     (a.total_value - a.deposit_value) AS remaining_value, a.notes, a.payment_at, \
     a.created_at, a.updated_at \
     FROM appointments a LEFT JOIN clients c ON a.client_id = c.id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub id: Option<i32>,
    pub booking_date: String,
    pub time_slot: String,
    pub client_id: Option<i32>,
    pub service_label: String,
    pub status: Option<String>,
    pub total_value: i64,
    pub deposit_value: i64,
    pub notes: Option<String>,
}

fn validate_money(total: i64, deposit: i64) -> VenueResult<()> {
    if total < 0 || deposit < 0 {
        return Err(VenueError::Validation(
            "Valores não podem ser negativos.".to_string(),
        ));
    }
    if deposit > total {
        return Err(VenueError::Validation(
            "O sinal não pode ser maior que o valor total.".to_string(),
        ));
    }
    Ok(())
}

fn validate_status(status: &str) -> VenueResult<()> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(VenueError::Validation(
            "Status de agendamento inválido.".to_string(),
        ))
    }
}

async fn slot_taken(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    date: NaiveDate,
    slot: &str,
    exclude_id: Option<i32>,
) -> VenueResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM appointments
         WHERE booking_date = $1 AND time_slot = $2 AND status != 'cancelled' AND id != COALESCE($3, -1)",
    )
    .bind(date)
    .bind(slot)
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count > 0)
}

async fn client_display_name(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    client_id: Option<i32>,
) -> VenueResult<String> {
    if let Some(id) = client_id {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some(name) = name {
            return Ok(name);
        }
        return Err(VenueError::Validation(
            "Cliente não encontrado.".to_string(),
        ));
    }
    Ok("Cliente avulso".to_string())
}

pub async fn create_appointment_internal(
    pool: &DbPool,
    input: AppointmentInput,
) -> VenueResult<i32> {
    if input.service_label.trim().is_empty() {
        return Err(VenueError::Validation("Informe o serviço.".to_string()));
    }
    if !is_valid_slot(&input.time_slot) {
        return Err(VenueError::Validation("Horário inválido.".to_string()));
    }
    validate_money(input.total_value, input.deposit_value)?;

    let date = parse_date_safe(&input.booking_date)
        .ok_or_else(|| VenueError::Validation("Data inválida.".to_string()))?;

    let status = input.status.unwrap_or_else(|| "pending".to_string());
    validate_status(&status)?;

    let mut tx = pool.begin().await?;

    if status != "cancelled" && slot_taken(&mut tx, date, &input.time_slot, None).await? {
        return Err(VenueError::Validation(
            "Este horário já está reservado.".to_string(),
        ));
    }

    let client_name = client_display_name(&mut tx, input.client_id).await?;

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO appointments (booking_date, time_slot, client_id, service_label, status, total_value, deposit_value, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
    )
    .bind(date)
    .bind(&input.time_slot)
    .bind(input.client_id)
    .bind(input.service_label.trim())
    .bind(&status)
    .bind(input.total_value)
    .bind(input.deposit_value)
    .bind(&input.notes)
    .fetch_one(&mut *tx)
    .await?;

    let id = row.0;

    if input.deposit_value > 0 {
        post_deposit(
            &mut tx,
            id,
            input.client_id,
            &client_name,
            input.service_label.trim(),
            date,
            input.deposit_value,
        )
        .await?;
    }

    tx.commit().await?;
    Ok(id)
}

pub async fn update_appointment_internal(
    pool: &DbPool,
    input: AppointmentInput,
) -> VenueResult<()> {
    let id = input
        .id
        .ok_or_else(|| VenueError::Validation("Agendamento não informado.".to_string()))?;

    if input.service_label.trim().is_empty() {
        return Err(VenueError::Validation("Informe o serviço.".to_string()));
    }
    if !is_valid_slot(&input.time_slot) {
        return Err(VenueError::Validation("Horário inválido.".to_string()));
    }
    validate_money(input.total_value, input.deposit_value)?;

    let date = parse_date_safe(&input.booking_date)
        .ok_or_else(|| VenueError::Validation("Data inválida.".to_string()))?;

    let mut tx = pool.begin().await?;

    let current_status: Option<String> =
        sqlx::query_scalar("SELECT status FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let current_status = current_status
        .ok_or_else(|| VenueError::Validation("Agendamento não encontrado.".to_string()))?;

    if current_status != "cancelled" && slot_taken(&mut tx, date, &input.time_slot, Some(id)).await?
    {
        return Err(VenueError::Validation(
            "Este horário já está reservado.".to_string(),
        ));
    }

    // The deposit posting fires only on creation; editing money fields later
    // just re-derives the remaining balance.
    sqlx::query(
        "UPDATE appointments SET booking_date=$1, time_slot=$2, client_id=$3, service_label=$4,
         total_value=$5, deposit_value=$6, notes=$7, updated_at=CURRENT_TIMESTAMP WHERE id=$8",
    )
    .bind(date)
    .bind(&input.time_slot)
    .bind(input.client_id)
    .bind(input.service_label.trim())
    .bind(input.total_value)
    .bind(input.deposit_value)
    .bind(&input.notes)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn update_appointment_status_internal(
    pool: &DbPool,
    id: i32,
    status: String,
) -> VenueResult<()> {
    validate_status(&status)?;

    let mut tx = pool.begin().await?;

    let row: Option<(NaiveDate, String, Option<i32>, String, String, i64, i64)> = sqlx::query_as(
        "SELECT booking_date, time_slot, client_id, service_label, status, total_value, deposit_value
         FROM appointments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let (date, time_slot, client_id, service_label, old_status, total_value, deposit_value) =
        row.ok_or_else(|| VenueError::Validation("Agendamento não encontrado.".to_string()))?;

    // Reactivating a cancelled booking has to re-claim its slot.
    if old_status == "cancelled"
        && status != "cancelled"
        && slot_taken(&mut tx, date, &time_slot, Some(id)).await?
    {
        return Err(VenueError::Validation(
            "Este horário já está reservado.".to_string(),
        ));
    }

    if status == "paid" {
        let remaining = total_value - deposit_value;
        let client_name = client_display_name(&mut tx, client_id).await?;

        sqlx::query(
            "UPDATE appointments SET status = 'paid', payment_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Amount is the remaining balance at the moment of the action.
        if remaining > 0 {
            post_final_payment(
                &mut tx,
                id,
                client_id,
                &client_name,
                &service_label,
                chrono::Local::now().date_naive(),
                remaining,
            )
            .await?;
        }
    } else {
        sqlx::query(
            "UPDATE appointments SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(&status)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_appointment_internal(pool: &DbPool, id: i32) -> VenueResult<()> {
    // Ledger rows keep their history; the FK sets booking_id to NULL.
    sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// --- Axum Handlers ---

#[derive(Deserialize)]
pub struct AppointmentListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn get_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentListQuery>,
) -> VenueResult<Json<Vec<Appointment>>> {
    let appointments = if let (Some(s), Some(e)) = (query.start_date, query.end_date) {
        let sd = parse_date_safe(&s)
            .ok_or_else(|| VenueError::Validation("Data inicial inválida.".to_string()))?;
        let ed = parse_date_safe(&e)
            .ok_or_else(|| VenueError::Validation("Data final inválida.".to_string()))?;
        let sql = format!(
            "{} WHERE a.booking_date BETWEEN $1 AND $2 ORDER BY a.booking_date ASC, a.time_slot ASC",
            APPOINTMENT_SELECT
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(sd)
            .bind(ed)
            .fetch_all(&state.pool)
            .await?
    } else {
        let sql = format!(
            "{} ORDER BY a.booking_date DESC, a.time_slot ASC",
            APPOINTMENT_SELECT
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .fetch_all(&state.pool)
            .await?
    };
    Ok(Json(appointments))
}

#[derive(Deserialize)]
pub struct DayGridQuery {
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotEntry {
    pub time_slot: &'static str,
    pub booking: Option<Appointment>,
}

/// The day grid: every fixed slot, with the non-cancelled booking occupying
/// it, if any. Cancelled bookings do not hold their slot.
pub async fn get_day_grid(
    State(state): State<AppState>,
    Query(query): Query<DayGridQuery>,
) -> VenueResult<Json<Vec<SlotEntry>>> {
    let date = parse_date_safe(&query.date)
        .ok_or_else(|| VenueError::Validation("Data inválida.".to_string()))?;

    let sql = format!(
        "{} WHERE a.booking_date = $1 AND a.status != 'cancelled'",
        APPOINTMENT_SELECT
    );
    let mut bookings = sqlx::query_as::<_, Appointment>(&sql)
        .bind(date)
        .fetch_all(&state.pool)
        .await?;

    let grid = TIME_SLOTS
        .iter()
        .map(|&slot| {
            let booking = bookings
                .iter()
                .position(|b| b.time_slot == slot)
                .map(|i| bookings.swap_remove(i));
            SlotEntry {
                time_slot: slot,
                booking,
            }
        })
        .collect();

    Ok(Json(grid))
}

pub async fn save_appointment(
    State(state): State<AppState>,
    Json(input): Json<AppointmentInput>,
) -> VenueResult<Json<i32>> {
    if let Some(id) = input.id {
        update_appointment_internal(&state.pool, input).await?;
        Ok(Json(id))
    } else {
        let id = create_appointment_internal(&state.pool, input).await?;
        Ok(Json(id))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInput {
    pub id: i32,
    pub status: String,
}

pub async fn update_appointment_status(
    State(state): State<AppState>,
    Json(input): Json<StatusInput>,
) -> VenueResult<Json<Value>> {
    update_appointment_status_internal(&state.pool, input.id, input.status).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct DeleteAppointmentInput {
    pub id: i32,
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    Json(input): Json<DeleteAppointmentInput>,
) -> VenueResult<Json<Value>> {
    delete_appointment_internal(&state.pool, input.id).await?;
    Ok(Json(json!({ "success": true })))
}
