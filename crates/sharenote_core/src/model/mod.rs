//! Domain model for users, groups, notes and their access declarations.
//!
//! # Invariants
//! - Ids are opaque strings; notes and groups get UUID v4 ids on creation.
//! - Note ownership (`Note::user_id`) never changes after creation.
//! - An absent or empty access declaration means owner-only access.

pub mod access_control;
pub mod group;
pub mod identity;
pub mod note;
pub mod user;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch nanoseconds.
///
/// Clamps to `0` for clocks set before the epoch.
pub fn now_epoch_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
