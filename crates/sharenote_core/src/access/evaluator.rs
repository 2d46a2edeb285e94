use crate::model::access_control::AccessKind;
use crate::model::identity::Identity;
use crate::model::note::Note;
use std::fmt::{Display, Formatter};

/// Why an evaluation allowed or denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessReason {
    /// Caller has the admin role.
    Admin,
    /// Caller owns the note.
    Owner,
    /// Caller's id is listed in the grant.
    UserGrant,
    /// One of the caller's groups is listed in the grant.
    GroupGrant,
    /// The note carries the owner-only declaration.
    OwnerOnly,
    /// The grant exists but does not name the caller.
    NoGrant,
}

impl AccessReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Owner => "owner",
            Self::UserGrant => "user_grant",
            Self::GroupGrant => "group_grant",
            Self::OwnerOnly => "owner_only",
            Self::NoGrant => "no_grant",
        }
    }
}

impl Display for AccessReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub kind: AccessKind,
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(kind: AccessKind, reason: AccessReason) -> Self {
        Self {
            kind,
            allowed: true,
            reason,
        }
    }

    fn deny(kind: AccessKind, reason: AccessReason) -> Self {
        Self {
            kind,
            allowed: false,
            reason,
        }
    }
}

/// Evaluates `kind` access of `identity` on `note`.
pub fn evaluate(identity: &Identity, note: &Note, kind: AccessKind) -> AccessDecision {
    if identity.is_admin() {
        return AccessDecision::allow(kind, AccessReason::Admin);
    }
    if note.is_owned_by(&identity.id) {
        return AccessDecision::allow(kind, AccessReason::Owner);
    }
    evaluate_grant(identity, note, kind)
}

pub fn can_read(identity: &Identity, note: &Note) -> bool {
    evaluate(identity, note, AccessKind::Read).allowed
}

pub fn can_write(identity: &Identity, note: &Note) -> bool {
    evaluate(identity, note, AccessKind::Write).allowed
}

/// Returns whether `note` explicitly grants `identity` read or write access.
///
/// Ownership and the admin role are not considered.
pub fn is_shared_with(identity: &Identity, note: &Note) -> bool {
    [AccessKind::Read, AccessKind::Write]
        .into_iter()
        .any(|kind| evaluate_grant(identity, note, kind).allowed)
}

fn evaluate_grant(identity: &Identity, note: &Note, kind: AccessKind) -> AccessDecision {
    let Some(grant) = note.access_control.grant(kind) else {
        return AccessDecision::deny(kind, AccessReason::OwnerOnly);
    };
    if grant.contains_user(&identity.id) {
        return AccessDecision::allow(kind, AccessReason::UserGrant);
    }
    if grant.intersects_groups(&identity.group_ids) {
        return AccessDecision::allow(kind, AccessReason::GroupGrant);
    }
    AccessDecision::deny(kind, AccessReason::NoGrant)
}
