//! Note-level authorization.
//!
//! # Responsibility
//! - Decide whether an identity may read or write a given note.
//!
//! # Invariants
//! - Evaluation is pure and total: every identity/note pair yields allow or
//!   deny, with no I/O and no shared state.
//! - Admin and owner checks run before any grant inspection.

mod evaluator;

pub use evaluator::{can_read, can_write, evaluate, is_shared_with, AccessDecision, AccessReason};
