//! User and group use-cases, including per-request identity resolution.

use crate::model::group::Group;
use crate::model::identity::{Identity, Role};
use crate::model::now_epoch_nanos;
use crate::model::user::{User, UserValidationError};
use crate::repo::group_repo::GroupRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum UserServiceError {
    /// Referenced user or group does not exist.
    NotFound { entity: &'static str, id: String },
    Conflict { entity: &'static str, id: String },
    Validation(UserValidationError),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict { entity, id } => write!(f, "{entity} already exists: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict { entity, id } => Self::Conflict { entity, id },
            RepoError::UserValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Service over user and group repositories.
pub struct UserService<U: UserRepository, G: GroupRepository> {
    users: U,
    groups: G,
}

impl<U: UserRepository, G: GroupRepository> UserService<U, G> {
    pub fn new(users: U, groups: G) -> Self {
        Self { users, groups }
    }

    pub fn create_user(&self, request: NewUser) -> Result<User, UserServiceError> {
        let user = User::new(
            request.id,
            request.name,
            request.email,
            request.role,
            now_epoch_nanos(),
        );
        self.users.insert_user(&user)?;
        info!(
            "event=user_create module=service status=ok user_id={} role={}",
            user.id, user.role
        );
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<User, UserServiceError> {
        self.users
            .get_user(id)?
            .ok_or_else(|| UserServiceError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
    }

    pub fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.users.list_users()?)
    }

    /// Creates a group owned by `owner_id`; the owner becomes its first member.
    pub fn create_group(&self, owner_id: &str, name: &str) -> Result<Group, UserServiceError> {
        let owner = self.get_user(owner_id)?;
        let now = now_epoch_nanos();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            user_id: owner.id.clone(),
            member_ids: BTreeSet::from([owner.id]),
            created_at: now,
            updated_at: now,
        };
        self.groups.insert_group(&group)?;
        info!(
            "event=group_create module=service status=ok group_id={} user_id={}",
            group.id, group.user_id
        );
        Ok(group)
    }

    /// Adds a member to a group. Re-adding an existing member is a no-op.
    pub fn add_group_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Group, UserServiceError> {
        self.groups.add_member(group_id, user_id, now_epoch_nanos())?;
        self.groups
            .get_group(group_id)?
            .ok_or_else(|| UserServiceError::NotFound {
                entity: "group",
                id: group_id.to_string(),
            })
    }

    pub fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<Group>, UserServiceError> {
        Ok(self.groups.list_groups_for_user(user_id)?)
    }

    /// Builds the request identity for a stored user.
    pub fn resolve_identity(&self, user_id: &str) -> Result<Identity, UserServiceError> {
        let user = self.get_user(user_id)?;
        let group_ids = self.groups.group_ids_for_user(&user.id)?;
        Ok(Identity::new(user.id, user.role).with_groups(group_ids))
    }
}
