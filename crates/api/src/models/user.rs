//! User domain types: profile, address book, and saved payment methods.
//!
//! Addresses and payment methods are embedded sub-documents. Both lists obey
//! the same invariant: at most one entry carries `is_default = true`, and the
//! current default cannot be deleted (callers must promote another entry
//! first via the explicit set-default operation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use threadline_core::{AddressId, Email, PaymentMethodId, UserId};

/// Errors from address-book and payment-method operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// Referenced address does not exist.
    #[error("Address not found")]
    AddressNotFound,

    /// The default address cannot be deleted.
    #[error("Cannot delete default address")]
    DefaultAddressUndeletable,

    /// Referenced payment method does not exist.
    #[error("Payment method not found")]
    PaymentMethodNotFound,

    /// The default payment method cannot be deleted.
    #[error("Cannot delete default payment method")]
    DefaultPaymentMethodUndeletable,
}

/// A saved shipping/billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    /// Label chosen by the user, e.g. "Home" or "Work".
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

/// A saved payment method.
///
/// Only display metadata is kept (brand, last four digits, expiry); the
/// actual payment credentials never touch this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    /// Payment method kind, e.g. "credit" or "paypal".
    #[serde(rename = "type")]
    pub kind: String,
    pub card_brand: Option<String>,
    pub last_four: Option<String>,
    pub expiry_month: Option<u8>,
    pub expiry_year: Option<u16>,
    pub is_default: bool,
}

/// A storefront user (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    /// Absent for accounts created through Google sign-in.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub addresses: Vec<Address>,
    pub payment_methods: Vec<PaymentMethod>,
    pub created_at: DateTime<Utc>,
}

impl User {
    // =========================================================================
    // Address book
    // =========================================================================

    /// Append an address. If the new address is flagged as default, the flag
    /// is cleared on every existing address first.
    pub fn add_address(&mut self, address: Address) {
        if address.is_default {
            self.clear_default_addresses();
        }
        self.addresses.push(address);
    }

    /// Replace all fields of an existing address.
    ///
    /// Promoting an address to default clears the flag on its siblings;
    /// demoting the current default (sending `isDefault: false`) leaves the
    /// list with no default, which is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::AddressNotFound`] if `id` is not in the list.
    pub fn update_address(&mut self, id: AddressId, updated: Address) -> Result<(), ProfileError> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(ProfileError::AddressNotFound);
        }
        if updated.is_default {
            self.clear_default_addresses();
        }
        if let Some(address) = self.addresses.iter_mut().find(|a| a.id == id) {
            *address = Address { id, ..updated };
        }
        Ok(())
    }

    /// Remove an address.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::AddressNotFound`] if `id` is not in the list,
    /// or [`ProfileError::DefaultAddressUndeletable`] if it is the current
    /// default.
    pub fn remove_address(&mut self, id: AddressId) -> Result<(), ProfileError> {
        let address = self
            .addresses
            .iter()
            .find(|a| a.id == id)
            .ok_or(ProfileError::AddressNotFound)?;
        if address.is_default {
            return Err(ProfileError::DefaultAddressUndeletable);
        }
        self.addresses.retain(|a| a.id != id);
        Ok(())
    }

    /// Mark one address as the default, clearing the flag on all others.
    ///
    /// Selecting the address that is already the default is a no-op that
    /// still clears every sibling.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::AddressNotFound`] if `id` is not in the list.
    pub fn set_default_address(&mut self, id: AddressId) -> Result<(), ProfileError> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(ProfileError::AddressNotFound);
        }
        for address in &mut self.addresses {
            address.is_default = address.id == id;
        }
        Ok(())
    }

    // =========================================================================
    // Payment methods
    // =========================================================================

    /// Append a payment method, clearing existing default flags if the new
    /// entry is flagged as default.
    pub fn add_payment_method(&mut self, method: PaymentMethod) {
        if method.is_default {
            self.clear_default_payment_methods();
        }
        self.payment_methods.push(method);
    }

    /// Remove a payment method.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::PaymentMethodNotFound`] if `id` is not in the
    /// list, or [`ProfileError::DefaultPaymentMethodUndeletable`] if it is
    /// the current default.
    pub fn remove_payment_method(&mut self, id: PaymentMethodId) -> Result<(), ProfileError> {
        let method = self
            .payment_methods
            .iter()
            .find(|m| m.id == id)
            .ok_or(ProfileError::PaymentMethodNotFound)?;
        if method.is_default {
            return Err(ProfileError::DefaultPaymentMethodUndeletable);
        }
        self.payment_methods.retain(|m| m.id != id);
        Ok(())
    }

    /// Mark one payment method as the default, clearing the flag on all
    /// others. Idempotent like [`Self::set_default_address`].
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::PaymentMethodNotFound`] if `id` is not in the
    /// list.
    pub fn set_default_payment_method(&mut self, id: PaymentMethodId) -> Result<(), ProfileError> {
        if !self.payment_methods.iter().any(|m| m.id == id) {
            return Err(ProfileError::PaymentMethodNotFound);
        }
        for method in &mut self.payment_methods {
            method.is_default = method.id == id;
        }
        Ok(())
    }

    /// Clear the default flag on every address (single linear scan).
    fn clear_default_addresses(&mut self) {
        for address in &mut self.addresses {
            address.is_default = false;
        }
    }

    /// Clear the default flag on every payment method (single linear scan).
    fn clear_default_payment_methods(&mut self) {
        for method in &mut self.payment_methods {
            method.is_default = false;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: UserId::new(1),
            name: "Test User".to_owned(),
            email: Email::parse("test@example.com").unwrap(),
            password_hash: None,
            google_id: None,
            profile_picture: None,
            phone: None,
            addresses: Vec::new(),
            payment_methods: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn address(name: &str, is_default: bool) -> Address {
        Address {
            id: AddressId::generate(),
            name: name.to_owned(),
            street_address: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            postal_code: "62701".to_owned(),
            country: "US".to_owned(),
            is_default,
        }
    }

    fn payment_method(is_default: bool) -> PaymentMethod {
        PaymentMethod {
            id: PaymentMethodId::generate(),
            kind: "credit".to_owned(),
            card_brand: Some("visa".to_owned()),
            last_four: Some("4242".to_owned()),
            expiry_month: Some(12),
            expiry_year: Some(2030),
            is_default,
        }
    }

    fn default_count(addresses: &[Address]) -> usize {
        addresses.iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_add_default_address_clears_siblings() {
        let mut user = test_user();
        user.add_address(address("Home", true));
        user.add_address(address("Work", true));

        assert_eq!(user.addresses.len(), 2);
        assert_eq!(default_count(&user.addresses), 1);
        assert!(user.addresses.last().unwrap().is_default);
    }

    #[test]
    fn test_set_default_address_is_exclusive() {
        let mut user = test_user();
        user.add_address(address("Home", true));
        user.add_address(address("Work", false));
        let work_id = user.addresses.last().unwrap().id;

        user.set_default_address(work_id).unwrap();

        assert_eq!(default_count(&user.addresses), 1);
        assert!(user.addresses.last().unwrap().is_default);
    }

    #[test]
    fn test_set_default_address_idempotent() {
        // Selecting the entry that is already default keeps exactly one default
        let mut user = test_user();
        user.add_address(address("Home", true));
        let home_id = user.addresses.first().unwrap().id;

        user.set_default_address(home_id).unwrap();

        assert_eq!(default_count(&user.addresses), 1);
        assert!(user.addresses.first().unwrap().is_default);
    }

    #[test]
    fn test_cannot_delete_default_address() {
        let mut user = test_user();
        user.add_address(address("Home", true));
        let home_id = user.addresses.first().unwrap().id;

        let result = user.remove_address(home_id);

        assert_eq!(result, Err(ProfileError::DefaultAddressUndeletable));
        // The list is unchanged after the rejected delete
        assert_eq!(user.addresses.len(), 1);
        assert!(user.addresses.first().unwrap().is_default);
    }

    #[test]
    fn test_delete_non_default_address() {
        let mut user = test_user();
        user.add_address(address("Home", true));
        user.add_address(address("Work", false));
        let work_id = user.addresses.last().unwrap().id;

        user.remove_address(work_id).unwrap();

        assert_eq!(user.addresses.len(), 1);
        assert_eq!(user.addresses.first().unwrap().name, "Home");
    }

    #[test]
    fn test_update_address_promotion_clears_others() {
        let mut user = test_user();
        user.add_address(address("Home", true));
        user.add_address(address("Work", false));
        let work_id = user.addresses.last().unwrap().id;

        let mut updated = address("Work", true);
        updated.city = "Chicago".to_owned();
        user.update_address(work_id, updated).unwrap();

        assert_eq!(default_count(&user.addresses), 1);
        let work = user.addresses.iter().find(|a| a.id == work_id).unwrap();
        assert!(work.is_default);
        assert_eq!(work.city, "Chicago");
    }

    #[test]
    fn test_update_address_keeps_stable_id() {
        let mut user = test_user();
        user.add_address(address("Home", false));
        let id = user.addresses.first().unwrap().id;

        // The replacement payload carries a fresh id; the stored one wins
        user.update_address(id, address("Renamed", false)).unwrap();

        assert_eq!(user.addresses.first().unwrap().id, id);
        assert_eq!(user.addresses.first().unwrap().name, "Renamed");
    }

    #[test]
    fn test_unknown_address_operations() {
        let mut user = test_user();
        let missing = AddressId::generate();

        assert_eq!(
            user.remove_address(missing),
            Err(ProfileError::AddressNotFound)
        );
        assert_eq!(
            user.set_default_address(missing),
            Err(ProfileError::AddressNotFound)
        );
    }

    #[test]
    fn test_payment_method_default_exclusivity() {
        let mut user = test_user();
        user.add_payment_method(payment_method(true));
        user.add_payment_method(payment_method(true));

        let defaults = user
            .payment_methods
            .iter()
            .filter(|m| m.is_default)
            .count();
        assert_eq!(defaults, 1);
        assert!(user.payment_methods.last().unwrap().is_default);
    }

    #[test]
    fn test_cannot_delete_default_payment_method() {
        let mut user = test_user();
        user.add_payment_method(payment_method(true));
        let id = user.payment_methods.first().unwrap().id;

        assert_eq!(
            user.remove_payment_method(id),
            Err(ProfileError::DefaultPaymentMethodUndeletable)
        );
        assert_eq!(user.payment_methods.len(), 1);
    }

    #[test]
    fn test_set_default_payment_method() {
        let mut user = test_user();
        user.add_payment_method(payment_method(true));
        user.add_payment_method(payment_method(false));
        let second = user.payment_methods.last().unwrap().id;

        user.set_default_payment_method(second).unwrap();

        assert!(!user.payment_methods.first().unwrap().is_default);
        assert!(user.payment_methods.last().unwrap().is_default);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let mut user = test_user();
        user.password_hash = Some("argon2-hash".to_owned());

        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("passwordHash"));
    }
}
