//! HTTP transport for sharenote.
//!
//! # Responsibility
//! - Resolve the caller identity for each request.
//! - Translate note and settings requests into core service calls.
//! - Map service failures onto HTTP statuses without leaking note content.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
