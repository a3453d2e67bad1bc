use crate::db::{Album, DbPool, Photo};
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::parse_date_safe;

pub async fn get_album_list(State(state): State<AppState>) -> VenueResult<Json<Vec<Album>>> {
    Ok(Json(
        sqlx::query_as::<_, Album>("SELECT * FROM albums ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct AlbumIdQuery {
    pub album_id: i32,
}

pub async fn get_album_photos(
    State(state): State<AppState>,
    Query(query): Query<AlbumIdQuery>,
) -> VenueResult<Json<Vec<Photo>>> {
    Ok(Json(
        sqlx::query_as::<_, Photo>(
            "SELECT * FROM photos WHERE album_id = $1 ORDER BY position, id",
        )
        .bind(query.album_id)
        .fetch_all(&state.pool)
        .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInput {
    pub id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub published: Option<bool>,
}

pub async fn save_album(
    State(state): State<AppState>,
    Json(input): Json<AlbumInput>,
) -> VenueResult<Json<i32>> {
    if input.title.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe o título do álbum.".to_string(),
        ));
    }

    let event_date = input.event_date.as_deref().and_then(parse_date_safe);

    let id = if let Some(id) = input.id {
        sqlx::query(
            "UPDATE albums SET title=$1, description=$2, event_date=$3, published=$4, updated_at=CURRENT_TIMESTAMP WHERE id=$5",
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(event_date)
        .bind(input.published.unwrap_or(true))
        .bind(id)
        .execute(&state.pool)
        .await?;
        id
    } else {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO albums (title, description, event_date, published)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(event_date)
        .bind(input.published.unwrap_or(true))
        .fetch_one(&state.pool)
        .await?;
        row.0
    };

    Ok(Json(id))
}

pub async fn delete_album_internal(pool: &DbPool, album_id: i32) -> VenueResult<()> {
    let mut tx = pool.begin().await?;

    // Photos belong to exactly one album; remove them with it.
    sqlx::query("DELETE FROM photos WHERE album_id = $1")
        .bind(album_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM albums WHERE id = $1")
        .bind(album_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAlbumInput {
    pub id: i32,
}

pub async fn delete_album(
    State(state): State<AppState>,
    Json(input): Json<DeleteAlbumInput>,
) -> VenueResult<Json<Value>> {
    delete_album_internal(&state.pool, input.id).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInput {
    pub album_id: i32,
    pub url: String,
    pub caption: Option<String>,
}

/// Adds a photo and keeps the album's denormalized photo_count / cover_url
/// in step, all in one transaction.
pub async fn add_photo_internal(pool: &DbPool, input: PhotoInput) -> VenueResult<i32> {
    if input.url.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe a URL da imagem.".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM albums WHERE id = $1")
        .bind(input.album_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(VenueError::Validation("Álbum não encontrado.".to_string()));
    }

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO photos (album_id, url, caption, position)
         VALUES ($1, $2, $3, (SELECT COALESCE(MAX(position), 0) + 1 FROM photos WHERE album_id = $1))
         RETURNING id",
    )
    .bind(input.album_id)
    .bind(input.url.trim())
    .bind(&input.caption)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE albums SET photo_count = photo_count + 1, cover_url = COALESCE(cover_url, $1), updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(input.url.trim())
    .bind(input.album_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row.0)
}

pub async fn add_photo(
    State(state): State<AppState>,
    Json(input): Json<PhotoInput>,
) -> VenueResult<Json<i32>> {
    let id = add_photo_internal(&state.pool, input).await?;
    Ok(Json(id))
}

pub async fn delete_photo_internal(pool: &DbPool, photo_id: i32) -> VenueResult<()> {
    let mut tx = pool.begin().await?;

    let photo: Option<(i32, String)> =
        sqlx::query_as("SELECT album_id, url FROM photos WHERE id = $1")
            .bind(photo_id)
            .fetch_optional(&mut *tx)
            .await?;

    let (album_id, url) = match photo {
        Some(photo) => photo,
        None => return Err(VenueError::Validation("Foto não encontrada.".to_string())),
    };

    sqlx::query("DELETE FROM photos WHERE id = $1")
        .bind(photo_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE albums SET photo_count = GREATEST(photo_count - 1, 0), updated_at = CURRENT_TIMESTAMP WHERE id = $1",
    )
    .bind(album_id)
    .execute(&mut *tx)
    .await?;

    // If the cover just left, promote the most recent remaining photo.
    let cover: Option<Option<String>> =
        sqlx::query_scalar("SELECT cover_url FROM albums WHERE id = $1")
            .bind(album_id)
            .fetch_optional(&mut *tx)
            .await?;

    if cover.flatten().as_deref() == Some(url.as_str()) {
        sqlx::query(
            "UPDATE albums SET cover_url = (SELECT url FROM photos WHERE album_id = $1 ORDER BY id DESC LIMIT 1) WHERE id = $1",
        )
        .bind(album_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

#[derive(Deserialize)]
pub struct DeletePhotoInput {
    pub id: i32,
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Json(input): Json<DeletePhotoInput>,
) -> VenueResult<Json<Value>> {
    delete_photo_internal(&state.pool, input.id).await?;
    Ok(Json(json!({ "success": true })))
}
