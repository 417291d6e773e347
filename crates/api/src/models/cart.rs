//! Cart domain types: line merging and derived totals.
//!
//! A cart line is identified by its (product, size, color) combination. The
//! unit price is captured from the product at the moment the line is
//! created and is not refreshed afterwards. Totals are derived on every
//! read and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use threadline_core::{CartId, CartItemId, Money, ProductId, UserId};

/// Errors from cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities must be positive.
    #[error("Quantity must be greater than 0")]
    InvalidQuantity,

    /// Referenced line does not exist in the cart.
    #[error("Item not found in cart")]
    ItemNotFound,
}

/// One line in a cart: a (product, size, color) combination with its own
/// quantity and captured unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    /// Unit price captured when the line was created.
    pub price: Money,
}

/// Derived cart totals, recomputed fresh on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of `price * quantity` over all lines.
    pub subtotal: Money,
    /// Number of lines, not the summed quantity.
    pub item_count: usize,
}

/// A user's shopping cart (1:1 with the user, domain type).
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: CartId,
    pub user: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Compute the derived subtotal and line count.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            subtotal: self.items.iter().map(|item| item.price * item.quantity).sum(),
            item_count: self.items.len(),
        }
    }

    /// Add a product to the cart.
    ///
    /// If a line with the same (product, size, color) already exists its
    /// quantity is incremented; otherwise a new line is appended with
    /// `unit_price` captured as the line price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero.
    pub fn add_item(
        &mut self,
        product: ProductId,
        quantity: u32,
        size: &str,
        color: &str,
        unit_price: Money,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let existing = self
            .items
            .iter_mut()
            .find(|item| item.product == product && item.size == size && item.color == color);

        if let Some(item) = existing {
            item.quantity += quantity;
        } else {
            self.items.push(CartItem {
                id: CartItemId::generate(),
                product,
                quantity,
                size: size.to_owned(),
                color: color.to_owned(),
                price: unit_price,
            });
        }
        Ok(())
    }

    /// Set the quantity of one line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity and
    /// [`CartError::ItemNotFound`] for an unknown line.
    pub fn update_quantity(&mut self, item_id: CartItemId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown line.
    pub fn remove_item(&mut self, item_id: CartItemId) -> Result<(), CartError> {
        if !self.items.iter().any(|item| item.id == item_id) {
            return Err(CartError::ItemNotFound);
        }
        self.items.retain(|item| item.id != item_id);
        Ok(())
    }

    /// Empty the cart, keeping the record itself.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    fn empty_cart() -> Cart {
        Cart {
            id: CartId::new(1),
            user: UserId::new(1),
            items: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = empty_cart();
        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_matching_line_merges() {
        // Adding the same (product, size, color) increments the existing line
        let mut cart = empty_cart();
        cart.add_item(ProductId::new(7), 2, "M", "Red", money("50"))
            .unwrap();
        cart.add_item(ProductId::new(7), 1, "M", "Red", money("50"))
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 3);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, money("150"));
        assert_eq!(totals.item_count, 1);
    }

    #[test]
    fn test_different_variant_appends_line() {
        let mut cart = empty_cart();
        cart.add_item(ProductId::new(7), 1, "M", "Red", money("50"))
            .unwrap();
        cart.add_item(ProductId::new(7), 1, "L", "Red", money("50"))
            .unwrap();
        cart.add_item(ProductId::new(7), 1, "M", "Blue", money("50"))
            .unwrap();

        assert_eq!(cart.items.len(), 3);
        assert_eq!(cart.totals().item_count, 3);
    }

    #[test]
    fn test_merge_keeps_captured_price() {
        // A later add at a new catalog price does not reprice the line
        let mut cart = empty_cart();
        cart.add_item(ProductId::new(7), 1, "M", "Red", money("50"))
            .unwrap();
        cart.add_item(ProductId::new(7), 1, "M", "Red", money("60"))
            .unwrap();

        let item = cart.items.first().unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, money("50"));
        assert_eq!(cart.totals().subtotal, money("100"));
    }

    #[test]
    fn test_subtotal_uses_line_count_not_quantity() {
        let mut cart = empty_cart();
        cart.add_item(ProductId::new(1), 3, "M", "Red", money("10"))
            .unwrap();
        cart.add_item(ProductId::new(2), 2, "S", "Blue", money("19.99"))
            .unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal, money("69.98"));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = empty_cart();
        assert_eq!(
            cart.add_item(ProductId::new(1), 0, "M", "Red", money("10")),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.items.is_empty());

        cart.add_item(ProductId::new(1), 1, "M", "Red", money("10"))
            .unwrap();
        let id = cart.items.first().unwrap().id;
        assert_eq!(
            cart.update_quantity(id, 0),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(cart.items.first().unwrap().quantity, 1);
    }

    #[test]
    fn test_update_and_remove_line() {
        let mut cart = empty_cart();
        cart.add_item(ProductId::new(1), 1, "M", "Red", money("10"))
            .unwrap();
        let id = cart.items.first().unwrap().id;

        cart.update_quantity(id, 5).unwrap();
        assert_eq!(cart.items.first().unwrap().quantity, 5);

        cart.remove_item(id).unwrap();
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_unknown_line_operations() {
        let mut cart = empty_cart();
        let missing = CartItemId::generate();
        assert_eq!(
            cart.update_quantity(missing, 2),
            Err(CartError::ItemNotFound)
        );
        assert_eq!(cart.remove_item(missing), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_clear_keeps_cart() {
        let mut cart = empty_cart();
        cart.add_item(ProductId::new(1), 2, "M", "Red", money("10"))
            .unwrap();
        cart.clear();
        assert!(cart.items.is_empty());
        assert_eq!(cart.totals().item_count, 0);
    }
}
