use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::dashboard_service::{self, Alert, DashboardStats};
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub recent: Vec<Alert>,
    pub critical: Vec<Alert>,
}

pub async fn alerts_handler() -> Json<AlertsResponse> {
    Json(AlertsResponse {
        recent: dashboard_service::recent_alerts(),
        critical: dashboard_service::critical_alerts(),
    })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<DashboardStats> {
    let mut stats = *state.stats.read().await;
    stats.total_shelters = state.proximity.shelter_count().await;
    Json(stats)
}
