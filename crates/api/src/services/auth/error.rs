//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::google::GoogleError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] threadline_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// New email is taken by another account.
    #[error("email already in use")]
    EmailInUse,

    /// Wrong password supplied for an email change.
    #[error("invalid password")]
    InvalidPassword,

    /// Wrong current password supplied for a password change.
    #[error("invalid current password")]
    InvalidCurrentPassword,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Google ID-token verification failed.
    #[error("google sign-in failed: {0}")]
    Google(#[from] GoogleError),

    /// Signing or decoding a session token failed.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
