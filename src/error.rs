#![allow(dead_code)]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VenueError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Upload error: {0}")]
    Upload(String),
}

pub type VenueResult<T> = Result<T, VenueError>;

impl IntoResponse for VenueError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            VenueError::Database(ref e) => {
                tracing::error!("Database Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro ao acessar o banco de dados.".to_string(),
                )
            }
            VenueError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            VenueError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            VenueError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            VenueError::Internal(msg) => {
                tracing::error!("Internal Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro interno no servidor.".to_string(),
                )
            }
            VenueError::Io(e) => {
                tracing::error!("IO Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro no sistema de arquivos.".to_string(),
                )
            }
            VenueError::Jwt(_) => (
                StatusCode::UNAUTHORIZED,
                "Sessão inválida ou expirada.".to_string(),
            ),
            VenueError::Network(ref e) => {
                tracing::error!("Network Error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Falha na conexão com o serviço externo.".to_string(),
                )
            }
            VenueError::Upload(msg) => {
                tracing::error!("Upload Error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Falha ao enviar a imagem. Tente novamente.".to_string(),
                )
            }
            _ => {
                tracing::error!("Unhandled Error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
