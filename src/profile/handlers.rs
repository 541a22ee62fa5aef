use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use super::dto::{OnboardingResponse, ProfileRequest, ProfileResponse};
use super::services;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

pub fn onboarding_routes() -> Router<AppState> {
    Router::new().route("/onboarding", get(get_onboarding))
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    let session = state.session.lock().await;
    Json(services::summary(&session))
}

#[instrument(skip(state))]
pub async fn get_onboarding(State(state): State<AppState>) -> Json<OnboardingResponse> {
    let session = state.session.lock().await;
    Json(OnboardingResponse {
        onboarding_complete: session.onboarding_complete,
    })
}

#[instrument(skip(state))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(body): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let profile = body
        .into_profile()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let response = services::edit_profile(&state, profile)
        .await
        .map_err(|e| {
            error!(error = %e, "profile save failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(response))
}
