use crate::db::{Album, DbPool, Lead, Photo, SiteSettings, Slide, TeamMember};
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct PublicAlbum {
    #[serde(flatten)]
    pub album: Album,
    pub photos: Vec<Photo>,
}

#[derive(Serialize)]
pub struct PublicSite {
    pub settings: SiteSettings,
    pub slides: Vec<Slide>,
    pub albums: Vec<PublicAlbum>,
    pub team: Vec<TeamMember>,
}

pub async fn get_public_site_internal(pool: &DbPool) -> VenueResult<PublicSite> {
    let settings = sqlx::query_as::<_, SiteSettings>("SELECT * FROM settings LIMIT 1")
        .fetch_optional(pool)
        .await?
        .unwrap_or_default();

    let slides = sqlx::query_as::<_, Slide>("SELECT * FROM slides ORDER BY position, id")
        .fetch_all(pool)
        .await?;

    let albums = sqlx::query_as::<_, Album>(
        "SELECT * FROM albums WHERE published = TRUE ORDER BY event_date DESC NULLS LAST, id DESC",
    )
    .fetch_all(pool)
    .await?;

    let photos = sqlx::query_as::<_, Photo>(
        "SELECT p.* FROM photos p JOIN albums a ON p.album_id = a.id WHERE a.published = TRUE ORDER BY p.position, p.id",
    )
    .fetch_all(pool)
    .await?;

    let team = sqlx::query_as::<_, TeamMember>("SELECT * FROM team ORDER BY position, id")
        .fetch_all(pool)
        .await?;

    let albums = albums
        .into_iter()
        .map(|album| {
            let album_photos = photos
                .iter()
                .filter(|p| p.album_id == album.id)
                .cloned()
                .collect();
            PublicAlbum {
                album,
                photos: album_photos,
            }
        })
        .collect();

    Ok(PublicSite {
        settings,
        slides,
        albums,
        team,
    })
}

pub async fn get_public_site(State(state): State<AppState>) -> VenueResult<Json<PublicSite>> {
    let site = get_public_site_internal(&state.pool).await?;
    Ok(Json(site))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    pub name: String,
    pub contact: String,
    pub email: Option<String>,
    pub event_type: Option<String>,
    pub message: Option<String>,
}

pub async fn create_lead_internal(pool: &DbPool, input: LeadInput) -> VenueResult<i32> {
    if input.name.trim().is_empty() || input.contact.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe seu nome e um contato.".to_string(),
        ));
    }

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO leads (name, contact, email, event_type, message)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(input.name.trim())
    .bind(input.contact.trim())
    .bind(&input.email)
    .bind(&input.event_type)
    .bind(&input.message)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

pub async fn create_lead(
    State(state): State<AppState>,
    Json(input): Json<LeadInput>,
) -> VenueResult<Json<Value>> {
    create_lead_internal(&state.pool, input).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn get_lead_list(State(state): State<AppState>) -> VenueResult<Json<Vec<Lead>>> {
    Ok(Json(
        sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY handled ASC, created_at DESC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct MarkLeadInput {
    pub id: i32,
    pub handled: bool,
}

pub async fn mark_lead_handled(
    State(state): State<AppState>,
    Json(input): Json<MarkLeadInput>,
) -> VenueResult<Json<Value>> {
    sqlx::query("UPDATE leads SET handled = $1 WHERE id = $2")
        .bind(input.handled)
        .bind(input.id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
