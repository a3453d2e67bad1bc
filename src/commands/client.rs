use crate::db::Client;
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::parse_date_safe;

#[derive(Deserialize)]
pub struct ClientSearchQuery {
    pub query: Option<String>,
}

pub async fn get_client_list(
    State(state): State<AppState>,
    Query(search): Query<ClientSearchQuery>,
) -> VenueResult<Json<Vec<Client>>> {
    let clients = match search.query {
        Some(q) if !q.trim().is_empty() => {
            let pattern = format!("%{}%", q.trim());
            sqlx::query_as::<_, Client>(
                "SELECT * FROM clients WHERE name ILIKE $1 OR phone ILIKE $1 OR email ILIKE $1 ORDER BY name",
            )
            .bind(pattern)
            .fetch_all(&state.pool)
            .await?
        }
        _ => {
            sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name")
                .fetch_all(&state.pool)
                .await?
        }
    };
    Ok(Json(clients))
}

#[derive(Deserialize)]
pub struct ClientIdQuery {
    pub id: i32,
}

pub async fn get_client(
    State(state): State<AppState>,
    Query(query): Query<ClientIdQuery>,
) -> VenueResult<Json<Client>> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(query.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| VenueError::Validation("Cliente não encontrado.".to_string()))?;
    Ok(Json(client))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub zip_code: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub notes: Option<String>,
    pub client_since: Option<String>,
}

pub async fn save_client(
    State(state): State<AppState>,
    Json(client): Json<ClientInput>,
) -> VenueResult<Json<i32>> {
    if client.name.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe o nome do cliente.".to_string(),
        ));
    }

    let since = client.client_since.as_deref().and_then(parse_date_safe);

    let id = if let Some(id) = client.id {
        sqlx::query(
            "UPDATE clients SET name=$1, email=$2, phone=$3, tax_id=$4, zip_code=$5, street=$6, city=$7, state=$8, notes=$9, client_since=COALESCE($10, client_since), updated_at=CURRENT_TIMESTAMP WHERE id=$11",
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.tax_id)
        .bind(&client.zip_code)
        .bind(&client.street)
        .bind(&client.city)
        .bind(&client.state)
        .bind(&client.notes)
        .bind(since)
        .bind(id)
        .execute(&state.pool)
        .await?;
        id
    } else {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO clients (name, email, phone, tax_id, zip_code, street, city, state, notes, client_since)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, CURRENT_DATE)) RETURNING id",
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.tax_id)
        .bind(&client.zip_code)
        .bind(&client.street)
        .bind(&client.city)
        .bind(&client.state)
        .bind(&client.notes)
        .bind(since)
        .fetch_one(&state.pool)
        .await?;
        row.0
    };

    Ok(Json(id))
}

#[derive(Deserialize)]
pub struct DeleteClientInput {
    pub id: i32,
}

pub async fn delete_client(
    State(state): State<AppState>,
    Json(input): Json<DeleteClientInput>,
) -> VenueResult<Json<Value>> {
    let open_bookings: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM appointments WHERE client_id = $1 AND status NOT IN ('cancelled', 'done', 'paid')",
    )
    .bind(input.id)
    .fetch_one(&state.pool)
    .await?;

    if open_bookings.0 > 0 {
        return Err(VenueError::Validation(
            "O cliente possui agendamentos em aberto.".to_string(),
        ));
    }

    sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}
