//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. All route handlers return `Result<T, AppError>`;
//! failures surface to clients as a JSON `{"message": "..."}` body with a
//! conventional status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::cart::CartError;
use crate::models::order::OrderError;
use crate::models::product::ReviewError;
use crate::models::user::ProfileError;
use crate::models::wishlist::WishlistError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is missing a valid session token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller may not act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidCredentials
                | AuthError::UserAlreadyExists
                | AuthError::EmailInUse
                | AuthError::InvalidPassword
                | AuthError::InvalidCurrentPassword
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::Google(_) => StatusCode::UNAUTHORIZED,
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal detail never leaks here.
    fn message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Database(_) | Self::Internal(_) => "Server error".to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::UserAlreadyExists => "User already exists".to_owned(),
                AuthError::EmailInUse => "Email already in use".to_owned(),
                AuthError::InvalidPassword => "Invalid password".to_owned(),
                AuthError::InvalidCurrentPassword => "Invalid current password".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::UserNotFound => "User not found".to_owned(),
                AuthError::Google(_) => "Google sign-in failed".to_owned(),
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Server error".to_owned()
                }
            },
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

// Domain invariant violations map onto conventional REST statuses; the
// Display strings double as the client-facing messages.

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::AddressNotFound | ProfileError::PaymentMethodNotFound => {
                Self::NotFound(err.to_string())
            }
            ProfileError::DefaultAddressUndeletable
            | ProfileError::DefaultPaymentMethodUndeletable => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::InvalidRating => Self::BadRequest(err.to_string()),
            ReviewError::NotFound => Self::NotFound(err.to_string()),
            ReviewError::NotAuthor => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidQuantity => Self::BadRequest(err.to_string()),
            CartError::ItemNotFound => Self::NotFound(err.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<WishlistError> for AppError {
    fn from(err: WishlistError) -> Self {
        match err {
            WishlistError::Duplicate => Self::BadRequest(err.to_string()),
            WishlistError::NotFound => Self::NotFound(err.to_string()),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invariant_violations_are_bad_requests() {
        assert_eq!(
            get_status(ProfileError::DefaultAddressUndeletable.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::InvalidQuantity.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(WishlistError::Duplicate.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_review_author_check_is_forbidden() {
        assert_eq!(
            get_status(ReviewError::NotAuthor.into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_login_failure_is_bad_request() {
        // The wire contract reports bad credentials as 400, not 401
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_detail_does_not_leak() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.7".to_owned());
        assert_eq!(err.message(), "Server error");
    }
}
