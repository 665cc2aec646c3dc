use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::models::UserLocation;
use crate::services::area_service::AreaReport;
use crate::services::location_service::LocationError;
use crate::services::shelter_view_service::{self, NearbyPanelView};
use crate::web::error::AppError;
use crate::web::state::AppState;

/// How long a fix push waits for the running watch to publish it.
const WATCH_PUBLISH_WAIT: Duration = Duration::from_secs(2);

fn check_coordinates(fix: &UserLocation) -> Result<(), AppError> {
    let valid = fix.lat.is_finite()
        && fix.lng.is_finite()
        && (-90.0..=90.0).contains(&fix.lat)
        && (-180.0..=180.0).contains(&fix.lng)
        && fix.accuracy >= 0.0;
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Location fix has out-of-range coordinates".to_string(),
        ))
    }
}

/// A browser geolocation result. With a running watch the watch task applies
/// it, otherwise it is applied here.
pub async fn fix_handler(
    State(state): State<AppState>,
    Json(fix): Json<UserLocation>,
) -> Result<Json<NearbyPanelView>, AppError> {
    check_coordinates(&fix)?;

    let mut published = state.proximity.subscribe();
    published.borrow_and_update();
    let seq = state.location.push_fix(fix);

    let snapshot = if state.tracker.is_watching().await {
        if tokio::time::timeout(WATCH_PUBLISH_WAIT, published.changed())
            .await
            .is_err()
        {
            debug!("📍 Fix #{} not yet published by the watch", seq);
        }
        state.proximity.snapshot()
    } else {
        state.tracker.apply_fix(fix).await
    };

    Ok(Json(shelter_view_service::nearby_panel(&snapshot)))
}

#[derive(Debug, Deserialize)]
pub struct LocationErrorBody {
    /// `GeolocationPositionError.code`
    pub code: Option<u16>,
    pub error: Option<LocationError>,
}

#[derive(Debug, Serialize)]
pub struct Notice {
    pub error: &'static str,
    pub message: String,
}

pub async fn error_handler(
    State(state): State<AppState>,
    Json(body): Json<LocationErrorBody>,
) -> Json<Notice> {
    let error = body
        .error
        .or_else(|| body.code.map(LocationError::from_code))
        .unwrap_or(LocationError::Unknown);
    state.location.push_error(error);
    Json(Notice {
        error: "location-unavailable",
        message: error.to_string(),
    })
}

/// Forget the user's position and stop watching.
pub async fn revoke_handler(State(state): State<AppState>) -> Json<NearbyPanelView> {
    state.tracker.stop().await;
    let snapshot = state.proximity.set_user_location(None).await;
    info!("📍 Location revoked, showing all {} shelters", snapshot.total_shelters);
    Json(shelter_view_service::nearby_panel(&snapshot))
}

pub async fn area_handler(
    State(state): State<AppState>,
) -> Result<Json<AreaReport>, (StatusCode, Json<Notice>)> {
    match state.area.latest().await {
        Some(report) => Ok(Json(report)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(Notice {
                error: "location-unavailable",
                message: "No location report yet.".to_string(),
            }),
        )),
    }
}
