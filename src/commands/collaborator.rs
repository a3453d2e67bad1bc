use crate::db::Collaborator;
use crate::error::{VenueError, VenueResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Json, Query, State};
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};

pub const ACCESS_LEVELS: [&str; 3] = ["master", "admin", "operational"];

#[derive(Deserialize)]
pub struct CollaboratorListQuery {
    pub active_only: Option<bool>,
}

pub async fn get_collaborator_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CollaboratorListQuery>,
) -> VenueResult<Json<Vec<Collaborator>>> {
    claims.require_admin()?;
    let list = if query.active_only.unwrap_or(false) {
        sqlx::query_as::<_, Collaborator>(
            "SELECT * FROM collaborators WHERE active = TRUE ORDER BY name",
        )
        .fetch_all(&state.pool)
        .await?
    } else {
        sqlx::query_as::<_, Collaborator>("SELECT * FROM collaborators ORDER BY name")
            .fetch_all(&state.pool)
            .await?
    };
    Ok(Json(list))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorInput {
    pub id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub access_level: String,
    pub active: Option<bool>,
}

pub async fn save_collaborator(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CollaboratorInput>,
) -> VenueResult<Json<i32>> {
    claims.require_admin()?;
    if input.name.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe o nome do colaborador.".to_string(),
        ));
    }
    if !ACCESS_LEVELS.contains(&input.access_level.as_str()) {
        return Err(VenueError::Validation(
            "Nível de acesso inválido.".to_string(),
        ));
    }

    let id = if let Some(id) = input.id {
        sqlx::query(
            "UPDATE collaborators SET name=$1, email=$2, access_level=$3, active=$4, updated_at=CURRENT_TIMESTAMP WHERE id=$5",
        )
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.access_level)
        .bind(input.active.unwrap_or(true))
        .bind(id)
        .execute(&state.pool)
        .await?;
        id
    } else {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO collaborators (name, email, access_level, active)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.access_level)
        .bind(input.active.unwrap_or(true))
        .fetch_one(&state.pool)
        .await?;
        row.0
    };

    Ok(Json(id))
}

#[derive(Deserialize)]
pub struct DeleteCollaboratorInput {
    pub id: i32,
}

pub async fn delete_collaborator(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<DeleteCollaboratorInput>,
) -> VenueResult<Json<Value>> {
    claims.require_admin()?;
    sqlx::query("DELETE FROM collaborators WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
