use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::dates::{DateKey, Direction};
use super::dto::{AddFoodRequest, LedgerDayResponse, LedgerQuery, LoggedDate, NavigateRequest};
use super::model::FoodEntry;
use super::services;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/ledger", get(get_day))
        .route("/ledger/dates", get(list_dates))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/navigate", post(navigate))
        .route("/foods", post(add_food))
        .route("/foods/:date/:id", delete(remove_food))
}

#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    Query(q): Query<LedgerQuery>,
) -> Result<Json<LedgerDayResponse>, (StatusCode, String)> {
    let session = state.session.lock().await;
    let key = match q.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => session.selected_date,
    };
    Ok(Json(services::day_view(&session, key, state.clock.as_ref())))
}

#[instrument(skip(state))]
pub async fn list_dates(State(state): State<AppState>) -> Json<Vec<LoggedDate>> {
    let session = state.session.lock().await;
    Json(services::logged_dates(&session, state.clock.as_ref()))
}

#[instrument(skip(state))]
pub async fn navigate(
    State(state): State<AppState>,
    Json(body): Json<NavigateRequest>,
) -> Result<Json<LedgerDayResponse>, (StatusCode, String)> {
    let direction = Direction::try_from(body.direction).map_err(|step| {
        (
            StatusCode::BAD_REQUEST,
            format!("direction must be -1 or 1, got {step}"),
        )
    })?;
    Ok(Json(services::navigate(&state, direction).await))
}

#[instrument(skip(state, body), fields(food = %body.analysis.food_name))]
pub async fn add_food(
    State(state): State<AppState>,
    Json(body): Json<AddFoodRequest>,
) -> Result<(StatusCode, Json<FoodEntry>), (StatusCode, String)> {
    body.analysis
        .validate()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let entry = services::add_food(&state, body.analysis, body.image_reference)
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn remove_food(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let key = parse_date(&date)?;
    services::remove_food(&state, key, id).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_date(raw: &str) -> Result<DateKey, (StatusCode, String)> {
    DateKey::parse(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid date {raw:?}, expected YYYY-MM-DD"),
        )
    })
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "ledger write failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
