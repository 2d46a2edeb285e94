//! Caller identity extraction.
//!
//! The caller is named by the `x-user-id` header and resolved against the
//! users table, so role and group memberships always come from storage.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use log::warn;
use sharenote_core::{
    Identity, SqliteGroupRepository, SqliteUserRepository, UserService, UserServiceError,
};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    /// Rejects callers without the admin role.
    pub fn require_admin(self) -> Result<Identity, ApiError> {
        if self.0.is_admin() {
            Ok(self.0)
        } else {
            Err(ApiError::PermissionDenied(
                "Administrator access required".to_string(),
            ))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthenticated)?
            .to_string();

        let identity = state
            .with_db(move |conn| {
                let service = UserService::new(
                    SqliteUserRepository::try_new(&*conn)?,
                    SqliteGroupRepository::try_new(&*conn)?,
                );
                service.resolve_identity(&user_id).map_err(|err| match err {
                    UserServiceError::NotFound { .. } => {
                        warn!("event=auth module=server status=denied user_id={user_id} reason=unknown_user");
                        ApiError::Unauthenticated
                    }
                    other => other.into(),
                })
            })
            .await?;

        Ok(Self(identity))
    }
}
