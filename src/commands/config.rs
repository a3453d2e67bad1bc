use crate::db::{SiteSettings, User};
use crate::error::{VenueError, VenueResult};
use crate::middleware::auth::{issue_token, Claims};
use crate::state::AppState;
use axum::extract::{Json, State};
use axum::Extension;
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: Option<String>,
    pub user_id: Option<i32>,
    pub username: Option<String>,
    pub role: Option<String>,
}

fn login_failure(message: &str) -> LoginResponse {
    LoginResponse {
        success: false,
        message: message.to_string(),
        token: None,
        user_id: None,
        username: None,
        role: None,
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> VenueResult<Json<LoginResponse>> {
    let username = payload.username;
    let password = payload.password;

    if username.trim().is_empty() || password.trim().is_empty() {
        return Ok(Json(login_failure("Informe usuário e senha.")));
    }

    let user_result = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role, created_at, updated_at FROM users WHERE username = $1",
    )
    .bind(&username)
    .fetch_optional(&state.pool)
    .await?;

    let user = match user_result {
        Some(user) => user,
        None => return Ok(Json(login_failure("Usuário não encontrado."))),
    };

    let password_hash = match &user.password_hash {
        Some(hash) => hash,
        None => return Ok(Json(login_failure("Cadastro de usuário inválido."))),
    };

    match verify(&password, password_hash) {
        Ok(true) => {
            let token = issue_token(user.id, &user.username, &user.role)?;
            Ok(Json(LoginResponse {
                success: true,
                message: "Login realizado com sucesso.".to_string(),
                token: Some(token),
                user_id: Some(user.id),
                username: Some(user.username.clone()),
                role: Some(user.role.clone()),
            }))
        }
        Ok(false) => Ok(Json(login_failure("Usuário ou senha inválidos."))),
        Err(_) => Ok(Json(login_failure("Erro ao verificar a senha."))),
    }
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub logged_in: bool,
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

pub async fn check_auth_status(Extension(claims): Extension<Claims>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        logged_in: true,
        user_id: claims.user_id,
        username: claims.username,
        role: claims.role,
    })
}

pub async fn get_all_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> VenueResult<Json<Vec<User>>> {
    claims.require_admin()?;
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, NULL as password_hash, role, created_at, updated_at FROM users ORDER BY id ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> VenueResult<Json<Value>> {
    claims.require_admin()?;
    if !matches!(payload.role.as_str(), "admin" | "collaborator") {
        return Err(VenueError::Validation(
            "Perfil de acesso inválido.".to_string(),
        ));
    }

    let hashed = hash(payload.password, DEFAULT_COST)?;

    sqlx::query("INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3)")
        .bind(payload.username)
        .bind(hashed)
        .bind(payload.role)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub id: i32,
    pub username: String,
    pub password: Option<String>,
    pub role: String,
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserRequest>,
) -> VenueResult<Json<Value>> {
    claims.require_admin()?;
    if !matches!(payload.role.as_str(), "admin" | "collaborator") {
        return Err(VenueError::Validation(
            "Perfil de acesso inválido.".to_string(),
        ));
    }

    if let Some(password) = payload.password {
        if !password.trim().is_empty() {
            let hashed = hash(password, DEFAULT_COST)?;

            sqlx::query("UPDATE users SET username = $1, password_hash = $2, role = $3, updated_at = CURRENT_TIMESTAMP WHERE id = $4")
                .bind(payload.username)
                .bind(hashed)
                .bind(payload.role)
                .bind(payload.id)
                .execute(&state.pool)
                .await?;
            return Ok(Json(json!({ "success": true })));
        }
    }

    sqlx::query("UPDATE users SET username = $1, role = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3")
        .bind(payload.username)
        .bind(payload.role)
        .bind(payload.id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct DeleteUserRequest {
    pub id: i32,
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteUserRequest>,
) -> VenueResult<Json<Value>> {
    claims.require_admin()?;

    let username: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
        .bind(payload.id)
        .fetch_optional(&state.pool)
        .await?;

    match username {
        None => return Err(VenueError::Validation("Usuário não encontrado.".to_string())),
        Some(name) if name == "admin" => {
            return Err(VenueError::Validation(
                "O administrador do sistema não pode ser removido.".to_string(),
            ))
        }
        Some(_) => {}
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(payload.id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn get_site_settings(State(state): State<AppState>) -> VenueResult<Json<SiteSettings>> {
    let settings = sqlx::query_as::<_, SiteSettings>("SELECT * FROM settings LIMIT 1")
        .fetch_optional(&state.pool)
        .await?
        .unwrap_or_default();
    Ok(Json(settings))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsRequest {
    pub venue_name: String,
    pub tagline: Option<String>,
    pub about_text: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_address: Option<String>,
    pub instagram_url: Option<String>,
    pub whatsapp_url: Option<String>,
    pub background_url: Option<String>,
}

pub async fn save_site_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SaveSettingsRequest>,
) -> VenueResult<Json<Value>> {
    claims.require_admin()?;
    if payload.venue_name.trim().is_empty() {
        return Err(VenueError::Validation(
            "Informe o nome do espaço.".to_string(),
        ));
    }

    let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
        .fetch_one(&state.pool)
        .await?;

    if exists.0 > 0 {
        sqlx::query(
            "UPDATE settings SET
                venue_name = $1,
                tagline = $2,
                about_text = $3,
                contact_phone = $4,
                contact_email = $5,
                contact_address = $6,
                instagram_url = $7,
                whatsapp_url = $8,
                background_url = $9,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(payload.venue_name)
        .bind(payload.tagline)
        .bind(payload.about_text)
        .bind(payload.contact_phone)
        .bind(payload.contact_email)
        .bind(payload.contact_address)
        .bind(payload.instagram_url)
        .bind(payload.whatsapp_url)
        .bind(payload.background_url)
        .execute(&state.pool)
        .await?;
    } else {
        sqlx::query(
            "INSERT INTO settings (
                venue_name, tagline, about_text, contact_phone, contact_email,
                contact_address, instagram_url, whatsapp_url, background_url
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(payload.venue_name)
        .bind(payload.tagline)
        .bind(payload.about_text)
        .bind(payload.contact_phone)
        .bind(payload.contact_email)
        .bind(payload.contact_address)
        .bind(payload.instagram_url)
        .bind(payload.whatsapp_url)
        .bind(payload.background_url)
        .execute(&state.pool)
        .await?;
    }

    Ok(Json(json!({ "success": true })))
}
