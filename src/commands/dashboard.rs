use crate::db::DashboardStats;
use crate::error::VenueResult;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

use super::utils::total_receivable;

#[derive(Serialize)]
pub struct DashboardPayload {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub total_receivable: i64,
}

pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> VenueResult<Json<DashboardPayload>> {
    let today = chrono::Local::now().date_naive();

    let sql = r#"
        WITH booking_stats AS (
            SELECT
                COUNT(*) FILTER (WHERE booking_date = $1 AND status != 'cancelled') as today_bookings,
                COUNT(*) FILTER (WHERE status = 'pending') as pending_bookings
            FROM appointments
        ),
        client_stats AS (
            SELECT COUNT(*) as total_clients FROM clients
        ),
        lead_stats AS (
            SELECT COUNT(*) as open_leads FROM leads WHERE handled = FALSE
        ),
        month_flow AS (
            SELECT
                SUM(amount) FILTER (WHERE kind = 'income') as month_income,
                SUM(amount) FILTER (WHERE kind = 'expense') as month_expense
            FROM financial
            WHERE EXTRACT(YEAR FROM entry_date) = EXTRACT(YEAR FROM $1::date)
              AND EXTRACT(MONTH FROM entry_date) = EXTRACT(MONTH FROM $1::date)
        )
        SELECT
            CAST(bs.today_bookings AS BIGINT) as today_bookings,
            CAST(bs.pending_bookings AS BIGINT) as pending_bookings,
            CAST(cs.total_clients AS BIGINT) as total_clients,
            CAST(ls.open_leads AS BIGINT) as open_leads,
            CAST(COALESCE(mf.month_income, 0) AS BIGINT) as month_income,
            CAST(COALESCE(mf.month_expense, 0) AS BIGINT) as month_expense
        FROM booking_stats bs, client_stats cs, lead_stats ls, month_flow mf
    "#;

    let stats = match tokio::time::timeout(
        std::time::Duration::from_secs(15),
        sqlx::query_as::<_, DashboardStats>(sql)
            .bind(today)
            .fetch_one(&state.pool),
    )
    .await
    {
        Ok(Ok(stats)) => stats,
        Ok(Err(e)) => {
            tracing::error!("Dashboard Stats Error: {:?}", e);
            DashboardStats::default()
        }
        Err(_) => {
            tracing::error!("Dashboard Stats Timeout");
            DashboardStats::default()
        }
    };

    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, total_value - deposit_value FROM appointments")
            .fetch_all(&state.pool)
            .await
            .unwrap_or_default();

    Ok(Json(DashboardPayload {
        stats,
        total_receivable: total_receivable(&rows),
    }))
}
