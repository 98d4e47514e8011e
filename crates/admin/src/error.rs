//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::authz::AuthzError;
use crate::db::RepositoryError;
use crate::validate::ValidationErrors;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more request fields failed validation. No mutation occurred.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// No principal is attached to the request.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Principal lacks the required role or permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A route gate was declared with zero capabilities. Fails closed.
    #[error("Misconfigured gate: {0}")]
    MisconfiguredGate(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or integrity conflict (e.g. a race the validator missed,
    /// or a guarded delete).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("The requested record does not exist.".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthzError> for AppError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => {
                Self::Unauthenticated("Authentication required.".to_owned())
            }
            AuthzError::Unverified => {
                Self::Forbidden("Email verification required.".to_owned())
            }
            AuthzError::Forbidden => Self::Forbidden("Unauthorized.".to_owned()),
            AuthzError::MisconfiguredGate => {
                Self::MisconfiguredGate("No capabilities specified for gate.".to_owned())
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<crate::services::password::PasswordError> for AppError {
    fn from(err: crate::services::password::PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::MisconfiguredGate(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) | Self::MisconfiguredGate(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal error details to clients
        let (message, errors) = match self {
            Self::Validation(errors) => (
                "Some fields need attention.".to_owned(),
                Some(errors),
            ),
            Self::Database(_) | Self::Internal(_) | Self::MisconfiguredGate(_) => {
                ("Action failed, try again.".to_owned(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("role 9".to_string());
        assert_eq!(err.to_string(), "Not found: role 9");

        let err = AppError::Conflict("name already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: name already exists");
    }

    #[test]
    fn test_app_error_status_codes() {
        let mut validation = ValidationErrors::new();
        validation.add("name", "The name field is required.");

        assert_eq!(
            get_status(AppError::Validation(validation)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::MisconfiguredGate("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("email already exists".to_owned())),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_authz_error_mapping() {
        assert!(matches!(
            AppError::from(AuthzError::Unauthenticated),
            AppError::Unauthenticated(_)
        ));
        assert!(matches!(
            AppError::from(AuthzError::Unverified),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(AuthzError::MisconfiguredGate),
            AppError::MisconfiguredGate(_)
        ));
    }
}
