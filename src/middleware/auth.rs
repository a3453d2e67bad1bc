use crate::error::{VenueError, VenueResult};
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn require_admin(&self) -> VenueResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(VenueError::Forbidden(
                "Acesso restrito ao administrador.".to_string(),
            ))
        }
    }
}

pub fn get_jwt_secret() -> Vec<u8> {
    std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using insecure default!");
            "insecure-development-secret-key-replace-me-immediately".to_string()
        })
        .into_bytes()
}

pub fn issue_token(user_id: i32, username: &str, role: &str) -> VenueResult<String> {
    let exp = chrono::Utc::now() + chrono::Duration::hours(12);
    let claims = Claims {
        sub: username.to_string(),
        user_id,
        username: username.to_string(),
        role: role.to_string(),
        exp: exp.timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(&get_jwt_secret()),
    )?)
}

pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let path = request.uri().path();
    let public_routes = ["/api/auth/login", "/api/ping"];

    if !path.starts_with("/api/")
        || path.starts_with("/api/public/")
        || public_routes.contains(&path)
    {
        return Ok(next.run(request).await);
    }

    let auth_header = match request.headers().get(header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    if !auth_header.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = &auth_header["Bearer ".len()..];

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&get_jwt_secret()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(token_data.claims);

    Ok(next.run(request).await)
}
