//! HTTP error mapping.
//!
//! Bodies are `{"detail": "..."}`. Forbidden and not-found responses use fixed
//! messages so a denied caller learns nothing about the note beyond its
//! existence.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use sharenote_core::{NoteServiceError, RepoError, UserServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FORBIDDEN_DETAIL: &str = "You do not have permission to access this resource.";
const INTERNAL_DETAIL: &str = "Something went wrong. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    /// No usable caller identity on the request.
    Unauthenticated,
    /// Caller is known but the feature or endpoint is closed to them.
    PermissionDenied(String),
    Forbidden,
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::PermissionDenied(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Unauthenticated => "Not authenticated".to_string(),
            Self::PermissionDenied(message) => message.clone(),
            Self::Forbidden => FORBIDDEN_DETAIL.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(message) => message.clone(),
            Self::Internal(_) => INTERNAL_DETAIL.to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal(message) => write!(f, "internal error: {message}"),
            other => write!(f, "{}", other.detail()),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(message) = &self {
            error!("event=http_error module=server status=error error={message}");
        }
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<NoteServiceError> for ApiError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::PermissionDenied(_) => {
                Self::PermissionDenied(value.to_string())
            }
            NoteServiceError::Forbidden { .. } => Self::Forbidden,
            NoteServiceError::NotFound(_) => Self::NotFound("Note".to_string()),
            NoteServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            NoteServiceError::Repo(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(value: UserServiceError) -> Self {
        match value {
            UserServiceError::NotFound { .. } | UserServiceError::Conflict { .. } => {
                Self::BadRequest(value.to_string())
            }
            UserServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            UserServiceError::Repo(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use sharenote_core::{AccessKind, Feature, NoteServiceError};

    #[test]
    fn note_service_errors_map_to_statuses() {
        let cases = [
            (
                NoteServiceError::PermissionDenied(Feature::Notes),
                StatusCode::UNAUTHORIZED,
            ),
            (
                NoteServiceError::Forbidden {
                    note_id: "n1".to_string(),
                    kind: AccessKind::Read,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                NoteServiceError::NotFound("n1".to_string()),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_detail_hides_the_cause() {
        let err = ApiError::Internal("disk I/O error at notes.db".to_string());
        assert!(!err.detail().contains("notes.db"));
        assert!(err.to_string().contains("notes.db"));
    }
}
