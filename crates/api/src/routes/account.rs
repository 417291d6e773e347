//! Account route handlers: profile self-service, address book, and saved
//! payment methods.
//!
//! Address and payment-method mutations all follow the same shape: load the
//! user aggregate, apply the domain operation (which maintains the
//! single-default invariant), persist the list, and respond with the full
//! updated list.

use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use threadline_core::{AddressId, PaymentMethodId, UserId};

use super::MessageResponse;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::models::user::{Address, PaymentMethod, User};
use crate::routes::auth::AuthResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Load the caller's user aggregate or fail with the wire-visible 404.
async fn load_user(state: &AppState, id: UserId) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

// =============================================================================
// Profile
// =============================================================================

/// Profile update request body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Email change request body. `password` is required for accounts that have
/// one.
#[derive(Debug, Deserialize)]
pub struct UpdateEmailRequest {
    pub email: String,
    pub password: Option<String>,
}

/// Password change request body. `currentPassword` is required for accounts
/// that already have a password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: String,
}

/// Get the caller's full profile (password hash excluded by serialization).
///
/// GET /api/user/profile
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let user = load_user(&state, current.id).await?;
    Ok(Json(user))
}

/// Update name and/or phone.
///
/// PUT /api/user/profile
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .update_profile(current.id, body.name.as_deref(), body.phone.as_deref())
        .await?;

    Ok(Json(user))
}

/// Change the account email and reissue the session token.
///
/// PUT /api/user/email
///
/// # Errors
///
/// Returns 400 for a wrong password or an email already in use.
#[instrument(skip_all)]
pub async fn update_email(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<UpdateEmailRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), &state.config().jwt_secret);
    let (user, token) = auth
        .change_email(current.id, &body.email, body.password.as_deref())
        .await?;

    Ok(Json(AuthResponse::new(&user, token)))
}

/// Change the account password.
///
/// PUT /api/user/password
///
/// # Errors
///
/// Returns 400 for a wrong current password or a too-weak new one.
#[instrument(skip_all)]
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), &state.config().jwt_secret);
    auth.change_password(
        current.id,
        body.current_password.as_deref(),
        &body.new_password,
    )
    .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Delete the account together with its cart and wishlist.
///
/// DELETE /api/user
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), &state.config().jwt_secret);
    auth.delete_account(current.id).await?;

    tracing::info!(user_id = %current.id, "account deleted");

    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

// =============================================================================
// Address book
// =============================================================================

/// Address create/update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressPayload {
    fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            name: self.name,
            street_address: self.street_address,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            is_default: self.is_default,
        }
    }
}

/// List the caller's addresses.
///
/// GET /api/user/addresses
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let user = load_user(&state, current.id).await?;
    Ok(Json(user.addresses))
}

/// Add an address; a default flag on the new entry clears all others.
///
/// POST /api/user/addresses
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state, body))]
pub async fn add_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<AddressPayload>,
) -> Result<Json<Vec<Address>>> {
    let mut user = load_user(&state, current.id).await?;
    user.add_address(body.into_address(AddressId::generate()));

    UserRepository::new(state.pool())
        .save_addresses(user.id, &user.addresses)
        .await?;

    Ok(Json(user.addresses))
}

/// Replace one address.
///
/// PUT /api/user/addresses/{id}
///
/// # Errors
///
/// Returns 404 for an unknown address.
#[instrument(skip(state, body))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressPayload>,
) -> Result<Json<Vec<Address>>> {
    let mut user = load_user(&state, current.id).await?;
    user.update_address(id, body.into_address(id))?;

    UserRepository::new(state.pool())
        .save_addresses(user.id, &user.addresses)
        .await?;

    Ok(Json(user.addresses))
}

/// Delete one address. The current default is rejected with 400.
///
/// DELETE /api/user/addresses/{id}
///
/// # Errors
///
/// Returns 404 for an unknown address, 400 for the default one.
#[instrument(skip(state))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<Address>>> {
    let mut user = load_user(&state, current.id).await?;
    user.remove_address(id)?;

    UserRepository::new(state.pool())
        .save_addresses(user.id, &user.addresses)
        .await?;

    Ok(Json(user.addresses))
}

/// Promote one address to default, demoting all others.
///
/// PUT /api/user/addresses/{id}/default
///
/// # Errors
///
/// Returns 404 for an unknown address.
#[instrument(skip(state))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<Address>>> {
    let mut user = load_user(&state, current.id).await?;
    user.set_default_address(id)?;

    UserRepository::new(state.pool())
        .save_addresses(user.id, &user.addresses)
        .await?;

    Ok(Json(user.addresses))
}

// =============================================================================
// Payment methods
// =============================================================================

/// Payment method create request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub card_brand: Option<String>,
    pub last_four: Option<String>,
    pub expiry_month: Option<u8>,
    pub expiry_year: Option<u16>,
    #[serde(default)]
    pub is_default: bool,
}

impl PaymentMethodPayload {
    fn into_payment_method(self, id: PaymentMethodId) -> PaymentMethod {
        PaymentMethod {
            id,
            kind: self.kind,
            card_brand: self.card_brand,
            last_four: self.last_four,
            expiry_month: self.expiry_month,
            expiry_year: self.expiry_year,
            is_default: self.is_default,
        }
    }
}

/// List the caller's payment methods.
///
/// GET /api/user/payment-methods
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<PaymentMethod>>> {
    let user = load_user(&state, current.id).await?;
    Ok(Json(user.payment_methods))
}

/// Add a payment method; a default flag on the new entry clears all others.
///
/// POST /api/user/payment-methods
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
#[instrument(skip(state, body))]
pub async fn add_payment_method(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<PaymentMethodPayload>,
) -> Result<Json<Vec<PaymentMethod>>> {
    let mut user = load_user(&state, current.id).await?;
    user.add_payment_method(body.into_payment_method(PaymentMethodId::generate()));

    UserRepository::new(state.pool())
        .save_payment_methods(user.id, &user.payment_methods)
        .await?;

    Ok(Json(user.payment_methods))
}

/// Delete one payment method. The current default is rejected with 400.
///
/// DELETE /api/user/payment-methods/{id}
///
/// # Errors
///
/// Returns 404 for an unknown payment method, 400 for the default one.
#[instrument(skip(state))]
pub async fn delete_payment_method(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<PaymentMethodId>,
) -> Result<Json<Vec<PaymentMethod>>> {
    let mut user = load_user(&state, current.id).await?;
    user.remove_payment_method(id)?;

    UserRepository::new(state.pool())
        .save_payment_methods(user.id, &user.payment_methods)
        .await?;

    Ok(Json(user.payment_methods))
}

/// Promote one payment method to default, demoting all others.
///
/// PUT /api/user/payment-methods/{id}/default
///
/// # Errors
///
/// Returns 404 for an unknown payment method.
#[instrument(skip(state))]
pub async fn set_default_payment_method(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<PaymentMethodId>,
) -> Result<Json<Vec<PaymentMethod>>> {
    let mut user = load_user(&state, current.id).await?;
    user.set_default_payment_method(id)?;

    UserRepository::new(state.pool())
        .save_payment_methods(user.id, &user.payment_methods)
        .await?;

    Ok(Json(user.payment_methods))
}
