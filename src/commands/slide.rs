use crate::db::Slide;
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, State};
use serde::Deserialize;
use serde_json::{json, Value};

pub const SLIDE_KINDS: [&str; 3] = ["image", "video", "text"];

pub async fn get_slide_list(State(state): State<AppState>) -> VenueResult<Json<Vec<Slide>>> {
    Ok(Json(
        sqlx::query_as::<_, Slide>("SELECT * FROM slides ORDER BY position, id")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideInput {
    pub id: Option<i32>,
    pub kind: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

fn validate_slide(input: &SlideInput) -> VenueResult<()> {
    if !SLIDE_KINDS.contains(&input.kind.as_str()) {
        return Err(VenueError::Validation("Tipo de slide inválido.".to_string()));
    }
    match input.kind.as_str() {
        "image" | "video" => {
            if input.url.as_deref().unwrap_or("").trim().is_empty() {
                return Err(VenueError::Validation(
                    "Informe a URL da mídia do slide.".to_string(),
                ));
            }
        }
        _ => {
            if input.title.as_deref().unwrap_or("").trim().is_empty() {
                return Err(VenueError::Validation(
                    "Informe o título do slide.".to_string(),
                ));
            }
        }
    }
    Ok(())
}

pub async fn save_slide(
    State(state): State<AppState>,
    Json(input): Json<SlideInput>,
) -> VenueResult<Json<i32>> {
    validate_slide(&input)?;

    let id = if let Some(id) = input.id {
        sqlx::query(
            "UPDATE slides SET kind=$1, url=$2, title=$3, description=$4, position=COALESCE($5, position), updated_at=CURRENT_TIMESTAMP WHERE id=$6",
        )
        .bind(&input.kind)
        .bind(&input.url)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.position)
        .bind(id)
        .execute(&state.pool)
        .await?;
        id
    } else {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO slides (kind, url, title, description, position)
             VALUES ($1, $2, $3, $4, COALESCE($5, (SELECT COALESCE(MAX(position), 0) + 1 FROM slides))) RETURNING id",
        )
        .bind(&input.kind)
        .bind(&input.url)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.position)
        .fetch_one(&state.pool)
        .await?;
        row.0
    };

    Ok(Json(id))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderInput {
    pub ordered_ids: Vec<i32>,
}

/// Applies an explicit carousel ordering: position follows the index in the
/// submitted list.
pub async fn reorder_slides(
    State(state): State<AppState>,
    Json(input): Json<ReorderInput>,
) -> VenueResult<Json<Value>> {
    let mut tx = state.pool.begin().await?;

    for (position, id) in input.ordered_ids.iter().enumerate() {
        sqlx::query("UPDATE slides SET position = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(position as i32)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct DeleteSlideInput {
    pub id: i32,
}

pub async fn delete_slide(
    State(state): State<AppState>,
    Json(input): Json<DeleteSlideInput>,
) -> VenueResult<Json<Value>> {
    sqlx::query("DELETE FROM slides WHERE id = $1")
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
