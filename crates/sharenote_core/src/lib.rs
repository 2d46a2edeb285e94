//! Core domain logic for sharenote.
//!
//! Owns the access-control model for shared notes, the feature gate consulted
//! before any note operation, and SQLite persistence for users, groups and
//! notes. Transports (HTTP server, admin CLI) only translate requests into
//! calls on the services exported here.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod permissions;
pub mod repo;
pub mod service;

pub use access::{can_read, can_write, evaluate, is_shared_with, AccessDecision, AccessReason};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::access_control::{AccessControl, AccessGrant, AccessKind};
pub use model::group::Group;
pub use model::identity::{GroupId, Identity, Role, UserId};
pub use model::note::{Note, NoteForm, NoteId, NoteValidationError};
pub use model::user::{User, UserValidationError};
pub use permissions::{
    feature_enabled, parse_feature, AppSettings, Feature, FeatureError, FeaturePermissions,
    PermissionGate, SharedSettings, UserPermissions,
};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::note_repo::{NoteRepository, NoteScope, SqliteNoteRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::user_service::{NewUser, UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
