//! Note use-case service.
//!
//! # Responsibility
//! - Gate every operation on the notes feature before touching storage.
//! - Authorize each record through the access evaluator.
//!
//! # Invariants
//! - A closed feature gate fails with `PermissionDenied` and performs no
//!   repository call.
//! - `get_note` distinguishes absent (`NotFound`) from unreadable
//!   (`Forbidden`); a forbidden result never carries note content.
//! - `list_notes` returns owned notes plus notes explicitly shared for read or
//!   write; admins see every note.
//! - Update and delete authorize inside the mutating transaction.

use crate::access::{evaluate, is_shared_with};
use crate::model::access_control::AccessKind;
use crate::model::identity::Identity;
use crate::model::note::{Note, NoteForm, NoteId, NoteValidationError};
use crate::model::now_epoch_nanos;
use crate::permissions::{Feature, PermissionGate};
use crate::repo::note_repo::{NoteRepository, NoteScope};
use crate::repo::RepoError;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Feature gate is closed for the caller.
    PermissionDenied(Feature),
    /// Note exists but the caller lacks the required access.
    Forbidden { note_id: NoteId, kind: AccessKind },
    /// Note does not exist.
    NotFound(NoteId),
    Validation(NoteValidationError),
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied(feature) => {
                write!(f, "permission denied: `{feature}` is not enabled")
            }
            Self::Forbidden { kind, .. } => write!(f, "{kind} access to this note is forbidden"),
            Self::NotFound(note_id) => write!(f, "note not found: {note_id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "note", id } => Self::NotFound(id),
            RepoError::NoteValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Note service facade over a repository and a feature gate.
pub struct NoteService<R: NoteRepository, G: PermissionGate> {
    repo: R,
    gate: G,
}

impl<R: NoteRepository, G: PermissionGate> NoteService<R, G> {
    pub fn new(repo: R, gate: G) -> Self {
        Self { repo, gate }
    }

    /// Creates a note owned by `identity`.
    pub fn create_note(
        &self,
        identity: &Identity,
        form: NoteForm,
    ) -> Result<Note, NoteServiceError> {
        self.ensure_enabled(identity, "note_create")?;
        form.validate()?;

        let note = Note::from_form(identity.id.as_str(), form, now_epoch_nanos());
        self.repo.insert_note(&note)?;
        info!(
            "event=note_create module=service status=ok note_id={} user_id={}",
            note.id, identity.id
        );
        Ok(note)
    }

    /// Lists every note visible to `identity`, newest first.
    ///
    /// A write grant alone is enough to list a note with its full content,
    /// while `get_note` still requires a read grant for the same caller.
    pub fn list_notes(&self, identity: &Identity) -> Result<Vec<Note>, NoteServiceError> {
        self.ensure_enabled(identity, "note_list")?;

        let scope = if identity.is_admin() {
            NoteScope::All
        } else {
            NoteScope::OwnedOrShared(identity.id.clone())
        };
        let notes: Vec<Note> = self
            .repo
            .list_notes(&scope)?
            .into_iter()
            .filter(|note| {
                identity.is_admin()
                    || note.is_owned_by(&identity.id)
                    || is_shared_with(identity, note)
            })
            .collect();

        debug!(
            "event=note_list module=service status=ok user_id={} count={}",
            identity.id,
            notes.len()
        );
        Ok(notes)
    }

    /// Gets one note the caller can read.
    pub fn get_note(&self, identity: &Identity, note_id: &str) -> Result<Note, NoteServiceError> {
        self.ensure_enabled(identity, "note_get")?;

        let note = self
            .repo
            .get_note(note_id)?
            .ok_or_else(|| NoteServiceError::NotFound(note_id.to_string()))?;
        authorize(identity, &note, AccessKind::Read, "note_get")?;
        Ok(note)
    }

    /// Replaces a note's fields. Requires write access; changing the access
    /// declaration additionally requires ownership or the admin role.
    pub fn update_note(
        &mut self,
        identity: &Identity,
        note_id: &str,
        form: NoteForm,
    ) -> Result<Note, NoteServiceError> {
        self.ensure_enabled(identity, "note_update")?;
        form.validate()?;

        let updated = self
            .repo
            .update_note::<NoteServiceError, _>(note_id, &form, now_epoch_nanos(), |current| {
                authorize(identity, current, AccessKind::Write, "note_update")?;
                let may_reshare = identity.is_admin() || current.is_owned_by(&identity.id);
                if !may_reshare && current.access_control != form.access_control {
                    warn!(
                        "event=note_update module=service status=denied note_id={} user_id={} reason=access_control_change",
                        current.id, identity.id
                    );
                    return Err(NoteServiceError::Forbidden {
                        note_id: current.id.clone(),
                        kind: AccessKind::Write,
                    });
                }
                Ok(())
            })?;

        info!(
            "event=note_update module=service status=ok note_id={} user_id={}",
            updated.id, identity.id
        );
        Ok(updated)
    }

    /// Deletes a note. Requires write access.
    pub fn delete_note(
        &mut self,
        identity: &Identity,
        note_id: &str,
    ) -> Result<(), NoteServiceError> {
        self.ensure_enabled(identity, "note_delete")?;

        self.repo
            .delete_note::<NoteServiceError, _>(note_id, |current| {
                authorize(identity, current, AccessKind::Write, "note_delete")
            })?;
        info!(
            "event=note_delete module=service status=ok note_id={} user_id={}",
            note_id, identity.id
        );
        Ok(())
    }

    fn ensure_enabled(&self, identity: &Identity, event: &str) -> Result<(), NoteServiceError> {
        if self.gate.is_feature_enabled(identity, Feature::Notes) {
            return Ok(());
        }
        warn!(
            "event={event} module=service status=denied user_id={} role={} reason=feature_disabled",
            identity.id, identity.role
        );
        Err(NoteServiceError::PermissionDenied(Feature::Notes))
    }
}

fn authorize(
    identity: &Identity,
    note: &Note,
    kind: AccessKind,
    event: &str,
) -> Result<(), NoteServiceError> {
    let decision = evaluate(identity, note, kind);
    if decision.allowed {
        return Ok(());
    }
    warn!(
        "event={event} module=service status=denied note_id={} user_id={} kind={} reason={}",
        note.id, identity.id, kind, decision.reason
    );
    Err(NoteServiceError::Forbidden {
        note_id: note.id.clone(),
        kind,
    })
}
