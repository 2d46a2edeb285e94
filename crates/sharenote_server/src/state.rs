//! Shared request state.

use crate::error::ApiError;
use rusqlite::Connection;
use sharenote_core::SharedSettings;
use std::sync::{Arc, Mutex, PoisonError};

/// State cloned into every handler.
///
/// One SQLite connection serves all requests; storage work runs on the
/// blocking pool while holding the connection lock.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    settings: SharedSettings,
}

impl AppState {
    pub fn new(conn: Connection, settings: SharedSettings) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            settings,
        }
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Runs `work` against the connection on the blocking pool.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            work(&mut conn)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
    }
}
