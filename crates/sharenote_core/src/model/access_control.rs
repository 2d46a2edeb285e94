//! Access declarations attached to notes.
//!
//! # Invariants
//! - `AccessControl::OwnerOnly` is the default and means nobody but the owner
//!   (and admins) may touch the note. It is never a wildcard.
//! - `Shared` always carries at least one non-empty grant; empty grants
//!   collapse back to `OwnerOnly` on construction and deserialization.
//! - Read and write grants are independent lists.
//!
//! # Wire format
//! `{}` and `null` both mean owner-only. Shared values serialize as
//! `{"read": {"user_ids": [...], "group_ids": [...]}, "write": {...}}`; a
//! missing `read`/`write` key is read as an empty grant.

use crate::model::identity::{GroupId, UserId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Capability requested on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl Display for AccessKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Users and groups authorized for one capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    #[serde(default)]
    pub user_ids: BTreeSet<UserId>,
    #[serde(default)]
    pub group_ids: BTreeSet<GroupId>,
}

impl AccessGrant {
    /// Grant for the given users only.
    pub fn users<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        Self {
            user_ids: user_ids.into_iter().map(Into::into).collect(),
            group_ids: BTreeSet::new(),
        }
    }

    /// Grant for the given groups only.
    pub fn groups<I, S>(group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<GroupId>,
    {
        Self {
            user_ids: BTreeSet::new(),
            group_ids: group_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.group_ids.is_empty()
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_ids.contains(user_id)
    }

    /// Returns whether any of `group_ids` is listed in this grant.
    pub fn intersects_groups(&self, group_ids: &BTreeSet<GroupId>) -> bool {
        // Iterate the smaller side; both are ordered sets.
        if self.group_ids.len() <= group_ids.len() {
            self.group_ids.iter().any(|id| group_ids.contains(id))
        } else {
            group_ids.iter().any(|id| self.group_ids.contains(id))
        }
    }
}

/// Access declaration of one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessControl {
    /// Only the owner (and admins) may read or write.
    #[default]
    OwnerOnly,
    /// Explicit per-capability grants in addition to the owner.
    Shared {
        read: AccessGrant,
        write: AccessGrant,
    },
}

impl AccessControl {
    /// Builds a declaration from two grants, collapsing to `OwnerOnly` when
    /// both are empty.
    pub fn shared(read: AccessGrant, write: AccessGrant) -> Self {
        if read.is_empty() && write.is_empty() {
            Self::OwnerOnly
        } else {
            Self::Shared { read, write }
        }
    }

    pub fn is_owner_only(&self) -> bool {
        matches!(self, Self::OwnerOnly)
    }

    /// Grant list for `kind`; `None` for the owner-only sentinel.
    pub fn grant(&self, kind: AccessKind) -> Option<&AccessGrant> {
        match self {
            Self::OwnerOnly => None,
            Self::Shared { read, .. } if kind == AccessKind::Read => Some(read),
            Self::Shared { write, .. } => Some(write),
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct AccessControlWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    read: Option<AccessGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    write: Option<AccessGrant>,
}

impl Serialize for AccessControl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::OwnerOnly => AccessControlWire::default(),
            Self::Shared { read, write } => AccessControlWire {
                read: Some(read.clone()),
                write: Some(write.clone()),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccessControl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Option::<AccessControlWire>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::shared(
            wire.read.unwrap_or_default(),
            wire.write.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessControl, AccessGrant, AccessKind};
    use serde_json::json;

    #[test]
    fn empty_object_and_null_mean_owner_only() {
        let from_empty: AccessControl = serde_json::from_value(json!({})).unwrap();
        let from_null: AccessControl = serde_json::from_value(json!(null)).unwrap();
        assert!(from_empty.is_owner_only());
        assert!(from_null.is_owner_only());
        assert_eq!(serde_json::to_value(&from_empty).unwrap(), json!({}));
    }

    #[test]
    fn missing_read_key_yields_empty_read_grant() {
        let parsed: AccessControl = serde_json::from_value(json!({
            "write": {"user_ids": ["user-2"], "group_ids": []}
        }))
        .unwrap();

        assert!(parsed.grant(AccessKind::Read).unwrap().is_empty());
        assert!(parsed
            .grant(AccessKind::Write)
            .unwrap()
            .contains_user("user-2"));
    }

    #[test]
    fn all_empty_grants_collapse_to_owner_only() {
        let parsed: AccessControl = serde_json::from_value(json!({
            "read": {"user_ids": [], "group_ids": []},
            "write": {"user_ids": [], "group_ids": []}
        }))
        .unwrap();
        assert_eq!(parsed, AccessControl::OwnerOnly);
        assert_eq!(
            AccessControl::shared(AccessGrant::default(), AccessGrant::default()),
            AccessControl::OwnerOnly
        );
    }

    #[test]
    fn shared_serializes_both_grants() {
        let value = AccessControl::shared(AccessGrant::groups(["g1"]), AccessGrant::default());
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "read": {"user_ids": [], "group_ids": ["g1"]},
                "write": {"user_ids": [], "group_ids": []}
            })
        );
    }
}
