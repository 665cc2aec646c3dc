use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::services::proximity_service::DistanceFilter;
use crate::services::shelter_view_service::{
    self, MapLayerView, NearbyPanelView, ShelterListView,
};
use crate::web::error::AppError;
use crate::web::state::AppState;

pub async fn shelter_list_handler(State(state): State<AppState>) -> Json<ShelterListView> {
    let snapshot = state.proximity.snapshot();
    let place = match snapshot.location {
        Some(_) => state.area.latest().await.map(|report| report.place),
        None => None,
    };
    Json(shelter_view_service::shelter_list(&snapshot, place.as_ref()))
}

pub async fn nearby_panel_handler(State(state): State<AppState>) -> Json<NearbyPanelView> {
    Json(shelter_view_service::nearby_panel(&state.proximity.snapshot()))
}

pub async fn map_layer_handler(State(state): State<AppState>) -> Json<MapLayerView> {
    Json(shelter_view_service::map_layer(&state.proximity.snapshot()))
}

/// One `nearby` event per published snapshot, starting with the current one.
pub async fn nearby_stream_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.proximity.subscribe()).map(|snapshot| {
        Event::default()
            .event("nearby")
            .id(snapshot.version.to_string())
            .json_data(shelter_view_service::nearby_panel(&snapshot))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// "Find nearby": reuses the current fix or waits for one from the browser.
pub async fn find_nearby_handler(
    State(state): State<AppState>,
) -> Result<Json<NearbyPanelView>, AppError> {
    let snapshot = state.tracker.find_nearby().await?;
    Ok(Json(shelter_view_service::nearby_panel(&snapshot)))
}

#[derive(Debug, Deserialize)]
pub struct FilterBody {
    pub radius_km: f64,
}

pub async fn set_filter_handler(
    State(state): State<AppState>,
    Json(body): Json<FilterBody>,
) -> Result<Json<NearbyPanelView>, AppError> {
    let filter = DistanceFilter::try_from(body.radius_km)?;
    let snapshot = state.proximity.set_distance_filter(filter).await;
    info!(
        "🧭 Distance filter set to {}km ({} nearby)",
        filter.km(),
        snapshot.nearby.len()
    );
    Ok(Json(shelter_view_service::nearby_panel(&snapshot)))
}
