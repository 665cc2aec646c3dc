use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::models::CampForm;
use crate::services::camp_service::{self, CampCreated, CampDeps};
use crate::services::draft_service::{self, DraftFields, SavedDraft};
use crate::web::error::AppError;
use crate::web::state::AppState;

pub async fn create_camp_handler(
    State(state): State<AppState>,
    Json(form): Json<CampForm>,
) -> Result<(StatusCode, Json<CampCreated>), AppError> {
    let deps = CampDeps {
        pool: &state.pool,
        proximity: &state.proximity,
        geocoder: state.geocoder.as_ref(),
        registry: state.registry.as_ref(),
    };
    let created = camp_service::submit_camp(deps, &form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub draft: Option<SavedDraft>,
}

pub async fn load_draft_handler(
    State(state): State<AppState>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = draft_service::load_draft(&state.pool).await?;
    Ok(Json(DraftResponse { draft }))
}

/// Overwrites the whole draft with the posted fields.
pub async fn save_draft_handler(
    State(state): State<AppState>,
    Json(fields): Json<DraftFields>,
) -> Result<StatusCode, AppError> {
    draft_service::save_draft(&state.pool, &fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_draft_handler(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    draft_service::clear_draft(&state.pool).await?;
    Ok(StatusCode::NO_CONTENT)
}
