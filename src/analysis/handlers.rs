use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use tracing::{instrument, warn};

use super::dto::{AnalyzeBase64Request, ServiceStatus, ServicesResponse};
use super::{AnalysisError, AnalysisResult, ImagePayload};
use crate::config::AnalysisService;
use crate::state::AppState;

const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/foods/analyze", post(analyze_multipart)) // multipart field "image"
        .route("/foods/analyze/base64", post(analyze_base64))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
}

pub fn service_routes() -> Router<AppState> {
    Router::new().route("/analysis/services", get(list_services))
}

/// POST /foods/analyze. The result is not logged until the client confirms it.
#[instrument(skip(state, mp))]
pub async fn analyze_multipart(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<AnalysisResult>, (StatusCode, String)> {
    let mut image = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().map(str::to_string);
            let body = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            image = Some(ImagePayload::new(body, content_type.as_deref()));
        }
    }
    let image = image.ok_or((StatusCode::BAD_REQUEST, "image is required".to_string()))?;
    run_analysis(&state, image).await
}

/// POST /foods/analyze/base64 { image_b64, content_type? }
#[instrument(skip(state, body))]
pub async fn analyze_base64(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBase64Request>,
) -> Result<Json<AnalysisResult>, (StatusCode, String)> {
    let (data_url_type, encoded) = split_data_url(&body.image_b64);
    let bytes = Base64::decode_vec(encoded.trim())
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64".to_string()))?;
    let content_type = body.content_type.as_deref().or(data_url_type);
    run_analysis(&state, ImagePayload::new(Bytes::from(bytes), content_type)).await
}

#[instrument(skip(state))]
pub async fn list_services(State(state): State<AppState>) -> Json<ServicesResponse> {
    let analysis = &state.config.analysis;
    let services = AnalysisService::ALL
        .into_iter()
        .map(|s| ServiceStatus {
            key: s.key(),
            name: s.display_name(),
            configured: analysis.has_credentials(s),
            active: s == analysis.service,
        })
        .collect();
    Json(ServicesResponse {
        active: analysis.service.key(),
        services,
    })
}

async fn run_analysis(
    state: &AppState,
    image: ImagePayload,
) -> Result<Json<AnalysisResult>, (StatusCode, String)> {
    if image.body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image is empty".into()));
    }
    state
        .analyzer
        .analyze(image)
        .await
        .map(Json)
        .map_err(failure)
}

fn failure(e: AnalysisError) -> (StatusCode, String) {
    warn!(error = %e, retryable = e.is_retryable(), "analysis failed");
    (e.status_code(), e.to_string())
}

/// `data:image/png;base64,AAAA` -> (Some("image/png"), "AAAA"); anything else passes through.
fn split_data_url(raw: &str) -> (Option<&str>, &str) {
    raw.strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .map(|(meta, data)| (meta.strip_suffix(";base64").filter(|t| !t.is_empty()), data))
        .unwrap_or((None, raw))
}
