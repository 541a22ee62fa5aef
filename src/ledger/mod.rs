//! Per-day calorie ledger: date keys, the ledger itself, its persistence and
//! the HTTP surface over the selected day.

mod dates;
mod dto;
pub mod handlers;
mod model;
pub mod repo;
mod services;

use axum::Router;

use crate::state::AppState;

pub use dates::DateKey;
pub use model::Ledger;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
