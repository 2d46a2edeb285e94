//! Route table.

pub mod notes;
pub mod settings;

use crate::state::AppState;
use axum::Router;

pub const NOTES_BASE: &str = "/api/v1/notes";
pub const CONFIG_BASE: &str = "/api/v1/config";

/// Builds the full application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(notes::router())
        .merge(settings::router())
        .with_state(state)
}
