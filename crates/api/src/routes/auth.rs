//! Authentication route handlers.
//!
//! All three endpoints respond with the same `{token, user}` envelope so the
//! client treats every sign-in path identically.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadline_core::UserId;

use crate::error::Result;
use crate::extract::Json;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google sign-in request body: the ID token issued to the browser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    pub token_id: String,
}

/// The user summary returned alongside a fresh token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.as_str().to_owned(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// Session envelope returned by every sign-in path.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

impl AuthResponse {
    pub(crate) fn new(user: &User, token: String) -> Self {
        Self {
            token,
            user: SessionUser::from(user),
        }
    }
}

/// Register a new account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// Returns 400 if the email is taken or the password is too weak.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), &state.config().jwt_secret);
    let (user, token) = auth
        .register(&body.name, &body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, token))))
}

/// Login with email and password.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 400 for unknown emails, wrong passwords, and Google-only accounts.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), &state.config().jwt_secret);
    let (user, token) = auth.login(&body.email, &body.password).await?;

    Ok(Json(AuthResponse::new(&user, token)))
}

/// Sign in with a Google ID token, creating the account on first sight.
///
/// POST /api/auth/google
///
/// # Errors
///
/// Returns 401 if Google rejects the token or it was issued for a different
/// client.
#[instrument(skip_all)]
pub async fn google(
    State(state): State<AppState>,
    Json(body): Json<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), &state.config().jwt_secret);

    let profile = state
        .google()
        .verify(&body.token_id)
        .await
        .map_err(crate::services::auth::AuthError::from)?;
    let (user, token) = auth.google_sign_in(&profile).await?;

    Ok(Json(AuthResponse::new(&user, token)))
}
