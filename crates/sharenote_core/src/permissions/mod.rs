//! Feature gating ahead of resource-level authorization.
//!
//! # Responsibility
//! - Name the gated features and their stable dotted keys.
//! - Hold the runtime-mutable installation settings.
//! - Answer "is this feature available to this identity at all?".
//!
//! # Invariants
//! - Gate checks read the current settings on every call; no decision is
//!   cached across settings updates.
//! - A closed gate is final for the request; note storage is not consulted.

mod feature;
mod gate;
mod settings;

pub use feature::{parse_feature, Feature, FeatureError};
pub use gate::{feature_enabled, PermissionGate};
pub use settings::{AppSettings, FeaturePermissions, SharedSettings, UserPermissions};
