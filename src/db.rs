use bcrypt;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;

use crate::error::{VenueError, VenueResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> VenueResult<DbPool> {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> VenueResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| VenueError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Disable);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool) -> VenueResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    let _ = ensure_seeds(pool).await;
    tracing::info!("Database ready");
    Ok(())
}

async fn ensure_seeds(pool: &DbPool) -> VenueResult<()> {
    let admin_username = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());

    let admin_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&admin_username)
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if admin_exists.0 == 0 {
        if let Ok(hash) = bcrypt::hash("admin", bcrypt::DEFAULT_COST) {
            let _ = sqlx::query(
                "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, 'admin') ON CONFLICT DO NOTHING",
            )
            .bind(&admin_username)
            .bind(hash)
            .execute(pool)
            .await;
        }
    }

    let settings_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if settings_exists.0 == 0 {
        let _ = sqlx::query("INSERT INTO settings (venue_name) VALUES ($1)")
            .bind("Espaço de Eventos")
            .execute(pool)
            .await;
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: Option<String>,
    pub role: String,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub zip_code: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub notes: Option<String>,
    pub total_revenue: i64,
    pub client_since: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// A calendar booking. `remaining_value` is always computed in the query as
/// `total_value - deposit_value`, never stored.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: i32,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub client_id: Option<i32>,
    #[sqlx(default)]
    pub client_name: Option<String>,
    pub service_label: String,
    pub status: String,
    pub total_value: i64,
    pub deposit_value: i64,
    pub remaining_value: i64,
    pub notes: Option<String>,
    pub payment_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct FinancialEntry {
    pub id: i32,
    pub description: String,
    pub amount: i64,
    pub kind: String,
    pub entry_date: NaiveDate,
    pub category: String,
    pub booking_id: Option<i32>,
    pub posting_reason: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Budget {
    pub id: i32,
    pub client_name: String,
    pub package: String,
    pub amount: i64,
    pub status: String,
    pub event_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Contract {
    pub id: i32,
    pub protocol: String,
    pub client_name: String,
    pub amount: i64,
    pub event_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Collaborator {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub access_level: String,
    pub active: bool,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Album {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub photo_count: i32,
    pub cover_url: Option<String>,
    pub published: bool,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: i32,
    pub album_id: i32,
    pub url: String,
    pub caption: Option<String>,
    pub position: i32,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Slide {
    pub id: i32,
    pub kind: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Default)]
pub struct SiteSettings {
    pub id: i32,
    pub venue_name: String,
    pub tagline: Option<String>,
    pub about_text: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_address: Option<String>,
    pub instagram_url: Option<String>,
    pub whatsapp_url: Option<String>,
    pub background_url: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub id: i32,
    pub name: String,
    pub role_title: String,
    pub photo_url: Option<String>,
    pub position: i32,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub contact: String,
    pub email: Option<String>,
    pub event_type: Option<String>,
    pub message: Option<String>,
    pub handled: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Default)]
pub struct DashboardStats {
    pub today_bookings: Option<i64>,
    pub pending_bookings: Option<i64>,
    pub total_clients: Option<i64>,
    pub open_leads: Option<i64>,
    pub month_income: Option<i64>,
    pub month_expense: Option<i64>,
}
