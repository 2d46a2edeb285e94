//! Admin-only runtime settings under `/api/v1/config`.

use super::CONFIG_BASE;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use log::info;
use sharenote_core::AppSettings;

pub fn router() -> Router<AppState> {
    Router::new().route(
        &format!("{CONFIG_BASE}/permissions"),
        get(get_permissions).post(set_permissions),
    )
}

async fn get_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AppSettings>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.settings().snapshot()))
}

async fn set_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(settings): Json<AppSettings>,
) -> Result<Json<AppSettings>, ApiError> {
    let admin = user.require_admin()?;
    state.settings().replace(settings.clone());
    info!(
        "event=settings_update module=server status=ok user_id={} enable_notes={} user_notes={}",
        admin.id, settings.enable_notes, settings.user_permissions.features.notes
    );
    Ok(Json(settings))
}
