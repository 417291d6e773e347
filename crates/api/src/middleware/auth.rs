//! Authentication extractor.
//!
//! Authenticated routes take [`RequireAuth`] as an argument; it reads the
//! `x-auth-token` header, verifies the JWT, and hands the handler the
//! calling user's identity. There is no server-side session: the token is
//! the whole session state.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use threadline_core::UserId;

use crate::error::AppError;
use crate::services::auth::verify_token;
use crate::state::AppState;

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// The identity asserted by a valid session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    /// Email at token issue time; may lag behind an email change until the
    /// token is reissued.
    pub email: String,
}

/// Extractor that requires a valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("No token, authorization denied".to_owned())
            })?;

        let claims = verify_token(token, &state.config().jwt_secret)
            .map_err(|_| AppError::Unauthorized("Token is not valid".to_owned()))?;

        Ok(Self(CurrentUser {
            id: UserId::new(claims.sub),
            email: claims.email,
        }))
    }
}
