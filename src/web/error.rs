use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::services::camp_service::CampError;
use crate::services::location_service::LocationError;
use crate::services::proximity_service::UnsupportedRadius;
use crate::services::upstream::UpstreamError;

/// Every failure the API reports. Rendered as `{ "error": kind, "message": text }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error("{0}")]
    Validation(String),
    #[error("Unable to locate that district/city. Please check the names.")]
    GeocodeMiss,
    #[error(transparent)]
    Network(#[from] UpstreamError),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Location(_) => "location-unavailable",
            AppError::Validation(_) => "validation-failure",
            AppError::GeocodeMiss => "geocode-miss",
            AppError::Network(_) => "network-failure",
            AppError::Storage(_) => "storage-failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Location(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Validation(_) | AppError::GeocodeMiss => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CampError> for AppError {
    fn from(err: CampError) -> Self {
        match err {
            CampError::Validation(message) => AppError::Validation(message),
            CampError::GeocodeMiss => AppError::GeocodeMiss,
        }
    }
}

impl From<UnsupportedRadius> for AppError {
    fn from(err: UnsupportedRadius) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Storage(e) => {
                error!("❌ Storage failure: {}", e);
                "Could not reach local storage.".to_string()
            }
            other => other.to_string(),
        };
        (
            self.status(),
            Json(json!({ "error": self.kind(), "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses() {
        let err = AppError::from(LocationError::Timeout);
        assert_eq!(err.kind(), "location-unavailable");
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.to_string(),
            "Unable to retrieve your location. Location request timed out."
        );

        let err = AppError::from(CampError::GeocodeMiss);
        assert_eq!(err.kind(), "geocode-miss");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::from(UpstreamError::Status(500));
        assert_eq!(err.kind(), "network-failure");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
