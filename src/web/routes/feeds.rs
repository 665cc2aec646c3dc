use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::services::geocode_service::PLACEHOLDER;
use crate::services::news_service::NewsView;
use crate::services::weather_service::WeatherView;
use crate::web::error::AppError;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lng: f64,
    pub location: Option<String>,
}

pub async fn weather_handler(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Json<WeatherView> {
    let location = query
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("Your Current Location");
    let result = state.weather.current_weather(query.lat, query.lng).await;
    Json(WeatherView::from_result(result, location))
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub city: Option<String>,
    pub district: Option<String>,
}

fn known(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != PLACEHOLDER)
}

pub async fn news_handler(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsView>, AppError> {
    let (Some(city), Some(district)) = (
        known(query.city.as_deref()),
        known(query.district.as_deref()),
    ) else {
        return Err(AppError::Validation(
            "News needs a resolved city and district".to_string(),
        ));
    };
    let result = state.news.recent_headlines(city, district).await;
    Ok(Json(NewsView::from_result(result)))
}
