use crate::db::TeamMember;
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, State};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn get_team_list(State(state): State<AppState>) -> VenueResult<Json<Vec<TeamMember>>> {
    Ok(Json(
        sqlx::query_as::<_, TeamMember>("SELECT * FROM team ORDER BY position, id")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberInput {
    pub id: Option<i32>,
    pub name: String,
    pub role_title: String,
    pub photo_url: Option<String>,
    pub position: Option<i32>,
}

pub async fn save_team_member(
    State(state): State<AppState>,
    Json(input): Json<TeamMemberInput>,
) -> VenueResult<Json<i32>> {
    if input.name.trim().is_empty() || input.role_title.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe nome e função do integrante.".to_string(),
        ));
    }

    let id = if let Some(id) = input.id {
        sqlx::query(
            "UPDATE team SET name=$1, role_title=$2, photo_url=$3, position=COALESCE($4, position), updated_at=CURRENT_TIMESTAMP WHERE id=$5",
        )
        .bind(input.name.trim())
        .bind(input.role_title.trim())
        .bind(&input.photo_url)
        .bind(input.position)
        .bind(id)
        .execute(&state.pool)
        .await?;
        id
    } else {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO team (name, role_title, photo_url, position)
             VALUES ($1, $2, $3, COALESCE($4, (SELECT COALESCE(MAX(position), 0) + 1 FROM team))) RETURNING id",
        )
        .bind(input.name.trim())
        .bind(input.role_title.trim())
        .bind(&input.photo_url)
        .bind(input.position)
        .fetch_one(&state.pool)
        .await?;
        row.0
    };

    Ok(Json(id))
}

#[derive(Deserialize)]
pub struct DeleteTeamMemberInput {
    pub id: i32,
}

pub async fn delete_team_member(
    State(state): State<AppState>,
    Json(input): Json<DeleteTeamMemberInput>,
) -> VenueResult<Json<Value>> {
    sqlx::query("DELETE FROM team WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
