//! User groups. Membership is what group grants on notes match against.

use crate::model::identity::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Creator of the group.
    pub user_id: UserId,
    pub member_ids: BTreeSet<UserId>,
    pub created_at: i64,
    pub updated_at: i64,
}
