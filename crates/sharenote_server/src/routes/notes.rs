//! `/api/v1/notes` handlers.
//!
//! Handlers stay thin: resolve the caller, run one `NoteService` call on the
//! blocking pool, return JSON. Status mapping lives in `ApiError`.

use super::NOTES_BASE;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use log::warn;
use sharenote_core::{
    Feature, Identity, Note, NoteForm, NoteService, NoteServiceError, PermissionGate,
    SqliteNoteRepository,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(NOTES_BASE, get(list_notes))
        .route(&format!("{NOTES_BASE}/"), get(list_notes))
        .route(&format!("{NOTES_BASE}/create"), post(create_note))
        .route(&format!("{NOTES_BASE}/:id"), get(get_note))
        .route(&format!("{NOTES_BASE}/:id/update"), post(update_note))
        .route(&format!("{NOTES_BASE}/:id/delete"), delete(delete_note))
}

async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    let gate = state.settings().clone();
    let notes = state
        .with_db(move |conn| {
            let service = NoteService::new(SqliteNoteRepository::try_new(conn)?, gate);
            Ok(service.list_notes(&identity)?)
        })
        .await?;
    Ok(Json(notes))
}

async fn create_note(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    body: Result<Json<NoteForm>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let form = gated_form(&state, &identity, body)?;
    let gate = state.settings().clone();
    let note = state
        .with_db(move |conn| {
            let service = NoteService::new(SqliteNoteRepository::try_new(conn)?, gate);
            Ok(service.create_note(&identity, form)?)
        })
        .await?;
    Ok(Json(note))
}

async fn get_note(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let gate = state.settings().clone();
    let note = state
        .with_db(move |conn| {
            let service = NoteService::new(SqliteNoteRepository::try_new(conn)?, gate);
            Ok(service.get_note(&identity, &id)?)
        })
        .await?;
    Ok(Json(note))
}

async fn update_note(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<NoteForm>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let form = gated_form(&state, &identity, body)?;
    let gate = state.settings().clone();
    let note = state
        .with_db(move |conn| {
            let mut service = NoteService::new(SqliteNoteRepository::try_new(conn)?, gate);
            Ok(service.update_note(&identity, &id, form)?)
        })
        .await?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let gate = state.settings().clone();
    state
        .with_db(move |conn| {
            let mut service = NoteService::new(SqliteNoteRepository::try_new(conn)?, gate);
            Ok(service.delete_note(&identity, &id)?)
        })
        .await?;
    Ok(Json(true))
}

/// Checks the notes gate before looking at the request body, so a closed gate
/// answers 401 whatever the body holds.
fn gated_form(
    state: &AppState,
    identity: &Identity,
    body: Result<Json<NoteForm>, JsonRejection>,
) -> Result<NoteForm, ApiError> {
    if !state.settings().is_feature_enabled(identity, Feature::Notes) {
        warn!(
            "event=note_request module=server status=denied user_id={} role={} reason=feature_disabled",
            identity.id, identity.role
        );
        return Err(NoteServiceError::PermissionDenied(Feature::Notes).into());
    }
    let Json(form) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(form)
}
