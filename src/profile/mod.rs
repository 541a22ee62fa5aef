mod calculator;
mod dto;
pub mod handlers;
pub mod repo;
mod services;

use axum::Router;

use crate::state::AppState;

pub use calculator::{ActivityLevel, BiometricProfile, Gender, WeightGoal, DEFAULT_CALORIE_GOAL};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::profile_routes())
        .merge(handlers::onboarding_routes())
}
