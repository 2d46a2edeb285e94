//! Note records and the create/update form.
//!
//! # Invariants
//! - `id` and `user_id` are fixed at creation.
//! - `title` is never blank after validation.
//! - `data` and `meta`, when present, are JSON objects. Their inner shape is
//!   opaque to core (typically `{"content": {"html", "md", "json"}}`).
//! - Timestamps are epoch nanoseconds; `updated_at >= created_at`.

use crate::model::access_control::AccessControl;
use crate::model::identity::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable note identifier (UUID v4 text).
pub type NoteId = String;

/// Persisted note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub data: Option<Value>,
    pub meta: Option<Value>,
    #[serde(default)]
    pub access_control: AccessControl,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Builds a new note owned by `user_id` from a form, stamping a fresh id
    /// and both timestamps with `now`.
    pub fn from_form(user_id: impl Into<UserId>, form: NoteForm, now: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: form.title,
            data: form.data,
            meta: form.meta,
            access_control: form.access_control,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, self.data.as_ref(), self.meta.as_ref())?;
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Client-supplied fields for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteForm {
    pub title: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub access_control: AccessControl,
}

impl NoteForm {
    /// Form with a title only; owner-only access.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            data: None,
            meta: None,
            access_control: AccessControl::OwnerOnly,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_access_control(mut self, access_control: AccessControl) -> Self {
        self.access_control = access_control;
        self
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, self.data.as_ref(), self.meta.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankTitle,
    /// The named payload field is present but not a JSON object.
    NotAnObject(&'static str),
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::NotAnObject(field) => write!(f, "note `{field}` must be a JSON object"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "note updated_at ({updated_at}) is earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

fn validate_fields(
    title: &str,
    data: Option<&Value>,
    meta: Option<&Value>,
) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::BlankTitle);
    }
    if data.is_some_and(|value| !value.is_object()) {
        return Err(NoteValidationError::NotAnObject("data"));
    }
    if meta.is_some_and(|value| !value.is_object()) {
        return Err(NoteValidationError::NotAnObject("meta"));
    }
    Ok(())
}
