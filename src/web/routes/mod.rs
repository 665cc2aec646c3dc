use axum::{
    routing::{delete, get, get_service, post, put},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

pub mod camps;
pub mod dashboard;
pub mod feeds;
pub mod health;
pub mod location;
pub mod shelters;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        // Presentation surfaces
        .route("/shelters", get(shelters::shelter_list_handler))
        .route("/shelters/nearby", get(shelters::nearby_panel_handler))
        .route("/map", get(shelters::map_layer_handler))
        .route("/nearby/stream", get(shelters::nearby_stream_handler))
        .route("/nearby/find", post(shelters::find_nearby_handler))
        .route("/filter", put(shelters::set_filter_handler))
        // Location pushed by the browser
        .route("/location", delete(location::revoke_handler))
        .route("/location/fix", post(location::fix_handler))
        .route("/location/error", post(location::error_handler))
        .route("/location/area", get(location::area_handler))
        // Feeds
        .route("/weather", get(feeds::weather_handler))
        .route("/news", get(feeds::news_handler))
        // Registration
        .route("/camps", post(camps::create_camp_handler))
        .route(
            "/camps/draft",
            get(camps::load_draft_handler)
                .put(camps::save_draft_handler)
                .delete(camps::reset_draft_handler),
        )
        // Dashboard
        .route("/alerts", get(dashboard::alerts_handler))
        .route("/stats", get(dashboard::stats_handler));

    Router::new()
        .nest("/api", api)
        .nest_service("/assets", get_service(ServeDir::new("assets")))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
