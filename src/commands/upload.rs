use crate::error::{VenueError, VenueResult};
use axum::extract::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UploadImageInput {
    pub image: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub url: String,
}

/// Forwards a base64 image to the external host and returns the hosted URL.
/// One attempt only; a failure surfaces to the caller so they can retry.
pub async fn upload_image(Json(input): Json<UploadImageInput>) -> VenueResult<Json<UploadResult>> {
    // Payload may arrive as a data URL; the host wants the raw base64 body.
    let image = match input.image.find(";base64,") {
        Some(idx) => input.image[idx + ";base64,".len()..].to_string(),
        None => input.image,
    };

    if image.trim().is_empty() {
        return Err(VenueError::Validation("Nenhuma imagem enviada.".to_string()));
    }
    base64::engine::general_purpose::STANDARD.decode(image.trim())?;

    let endpoint = std::env::var("IMAGE_HOST_URL")
        .unwrap_or_else(|_| "https://api.imgbb.com/1/upload".to_string());
    let key = std::env::var("IMAGE_HOST_KEY")
        .map_err(|_| VenueError::Internal("IMAGE_HOST_KEY not configured".to_string()))?;

    let mut params = vec![("key", key), ("image", image)];
    if let Some(name) = input.name {
        params.push(("name", name));
    }

    let response = reqwest::Client::new()
        .post(&endpoint)
        .form(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(VenueError::Upload(format!(
            "image host returned {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response.json().await?;
    let url = body
        .pointer("/data/url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| VenueError::Upload("image host response missing url".to_string()))?;

    Ok(Json(UploadResult {
        url: url.to_string(),
    }))
}
