//! Authentication service.
//!
//! Provides password and Google sign-in, plus the signed session tokens the
//! rest of the API checks. Tokens are stateless HS256 JWTs carried in the
//! `x-auth-token` header, valid for seven days.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use threadline_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;
use crate::services::google::GoogleProfile;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Session token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: i32,
    /// Email at issue time.
    pub email: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Authentication service.
///
/// Handles registration, login, Google sign-in, and credential changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt_secret: &'a SecretString,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt_secret: &'a SecretString) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_secret,
        }
    }

    // =========================================================================
    // Password authentication
    // =========================================================================

    /// Register a new user with name, email, and password. Creates the
    /// account together with its empty cart and wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong, including for accounts that only have Google sign-in.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Google-only accounts have no hash and can never password-login
        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    // =========================================================================
    // Google sign-in
    // =========================================================================

    /// Sign in with a verified Google identity, creating the account on
    /// first sight or linking the Google ID to an existing email account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the attested email is malformed.
    pub async fn google_sign_in(
        &self,
        profile: &GoogleProfile,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(&profile.email)?;

        let user = match self.users.get_by_email(&email).await? {
            Some(mut user) => {
                if user.google_id.is_none() {
                    self.users
                        .link_google(user.id, &profile.google_id, profile.picture.as_deref())
                        .await?;
                    user.google_id = Some(profile.google_id.clone());
                    if user.profile_picture.is_none() {
                        user.profile_picture = profile.picture.clone();
                    }
                }
                user
            }
            None => {
                self.users
                    .create_from_google(
                        &profile.name,
                        &email,
                        &profile.google_id,
                        profile.picture.as_deref(),
                    )
                    .await?
            }
        };

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    // =========================================================================
    // Credential changes
    // =========================================================================

    /// Change the account email, reissuing the session token.
    ///
    /// Accounts with a password must confirm it; Google-only accounts may
    /// change their email freely.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPassword` on a missing or wrong password,
    /// `AuthError::EmailInUse` if another account holds the email.
    pub async fn change_email(
        &self,
        user_id: UserId,
        new_email: &str,
        password: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(hash) = user.password_hash.as_deref() {
            let password = password.ok_or(AuthError::InvalidPassword)?;
            verify_password(password, hash).map_err(|_| AuthError::InvalidPassword)?;
        }

        let email = Email::parse(new_email)?;
        self.users
            .update_email(user_id, &email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailInUse,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        user.email = email;
        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Change the account password.
    ///
    /// Accounts with an existing password must confirm it; Google-only
    /// accounts may set their first password without one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCurrentPassword` on a missing or wrong
    /// current password, `AuthError::WeakPassword` for an invalid new one.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(hash) = user.password_hash.as_deref() {
            let current = current_password.ok_or(AuthError::InvalidCurrentPassword)?;
            verify_password(current, hash).map_err(|_| AuthError::InvalidCurrentPassword)?;
        }

        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &password_hash).await?;

        Ok(())
    }

    /// Delete the account together with its cart and wishlist. Orders are
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account doesn't exist.
    pub async fn delete_account(&self, user_id: UserId) -> Result<(), AuthError> {
        self.users.delete(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Sign a session token for the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.as_str().to_owned(),
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.expose_secret().as_bytes()),
        )?;

        Ok(token)
    }
}

/// Decode and validate a session token.
///
/// # Errors
///
/// Returns `AuthError::Token` for expired, malformed, or mis-signed tokens.
pub fn verify_token(token: &str, jwt_secret: &SecretString) -> Result<Claims, AuthError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_password_length_requirement() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_token_roundtrip() {
        let secret = SecretString::from("x".repeat(32));
        let claims = Claims {
            sub: 42,
            email: "user@example.com".to_owned(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .unwrap();

        let decoded = verify_token(&token, &secret).unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.email, "user@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = SecretString::from("x".repeat(32));
        let claims = Claims {
            sub: 42,
            email: "user@example.com".to_owned(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &secret).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let secret = SecretString::from("x".repeat(32));
        let other = SecretString::from("y".repeat(32));
        let claims = Claims {
            sub: 42,
            email: "user@example.com".to_owned(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &other).is_err());
    }
}
