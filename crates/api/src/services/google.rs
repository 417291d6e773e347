//! Google ID-token verification.
//!
//! Sign-in with Google sends the ID token issued to the browser; the server
//! confirms it against Google's tokeninfo endpoint and checks that the
//! token was minted for this application's OAuth client before trusting the
//! identity inside.

use serde::Deserialize;
use thiserror::Error;

/// Google's token introspection endpoint.
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Errors that can occur while verifying a Google ID token.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// The verification request itself failed.
    #[error("token verification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the token (expired, malformed, revoked).
    #[error("Google rejected the token")]
    Rejected,

    /// The token was issued for a different OAuth client.
    #[error("token was issued for a different client")]
    AudienceMismatch,
}

/// The identity attested by a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    /// Google's stable subject identifier for the account.
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// The fields of Google's tokeninfo response this service cares about.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifies Google ID tokens for one OAuth client.
#[derive(Debug, Clone)]
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleVerifier {
    /// Create a verifier for the given OAuth client ID.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
        }
    }

    /// Verify an ID token and return the attested identity.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::Rejected` if Google does not accept the token,
    /// `GoogleError::AudienceMismatch` if it belongs to another client, and
    /// `GoogleError::Http` if the introspection call fails.
    pub async fn verify(&self, id_token: &str) -> Result<GoogleProfile, GoogleError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleError::Rejected);
        }

        let info: TokenInfo = response.json().await?;

        if info.aud != self.client_id {
            return Err(GoogleError::AudienceMismatch);
        }

        // Google omits the display name for some account types
        let name = info
            .name
            .unwrap_or_else(|| info.email.split('@').next().unwrap_or_default().to_owned());

        Ok(GoogleProfile {
            google_id: info.sub,
            email: info.email,
            name,
            picture: info.picture,
        })
    }
}
