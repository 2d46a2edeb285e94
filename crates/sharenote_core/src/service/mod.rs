//! Use-case services.
//!
//! # Responsibility
//! - Compose gate checks, authorization and repository calls into the
//!   operations exposed to transports.
//! - Keep transports decoupled from storage details.

pub mod note_service;
pub mod user_service;
