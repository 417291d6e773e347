//! Wishlist domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use threadline_core::{Money, ProductId, UserId, WishlistId};

use super::product::Product;

/// Errors from wishlist operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WishlistError {
    /// The product is already on the wishlist.
    #[error("Product already in wishlist")]
    Duplicate,

    /// The product is not on the wishlist.
    #[error("Product not found in wishlist")]
    NotFound,
}

/// A user's wishlist: an ordered set of product references (1:1 with the
/// user, domain type).
#[derive(Debug, Clone)]
pub struct Wishlist {
    pub id: WishlistId,
    pub user: UserId,
    pub products: Vec<ProductId>,
    pub date_added: DateTime<Utc>,
}

impl Wishlist {
    /// Whether the product is on the list.
    #[must_use]
    pub fn contains(&self, product: ProductId) -> bool {
        self.products.contains(&product)
    }

    /// Add a product to the list.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Duplicate`] if it is already present.
    pub fn add(&mut self, product: ProductId, now: DateTime<Utc>) -> Result<(), WishlistError> {
        if self.contains(product) {
            return Err(WishlistError::Duplicate);
        }
        self.products.push(product);
        self.date_added = now;
        Ok(())
    }

    /// Remove a product from the list.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::NotFound`] if it is not present.
    pub fn remove(&mut self, product: ProductId) -> Result<(), WishlistError> {
        if !self.contains(product) {
            return Err(WishlistError::NotFound);
        }
        self.products.retain(|id| *id != product);
        Ok(())
    }
}

/// Product summary projected into wishlist responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: ProductId,
    pub name: String,
    pub image_src: String,
    pub price: Money,
    pub original_price: Option<Money>,
    pub discount_percentage: Option<f64>,
    pub rating: f64,
    pub review_count: u32,
    pub in_stock: bool,
    pub category: String,
    pub date_added: DateTime<Utc>,
}

impl WishlistEntry {
    /// Project a product into the wishlist summary shape.
    #[must_use]
    pub fn from_product(product: &Product, date_added: DateTime<Utc>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            image_src: product.image_src.clone(),
            price: product.price,
            original_price: product.original_price,
            discount_percentage: product.discount_percentage,
            rating: product.rating,
            review_count: product.review_count,
            in_stock: product.in_stock,
            category: product.category.clone(),
            date_added,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn empty_wishlist() -> Wishlist {
        Wishlist {
            id: WishlistId::new(1),
            user: UserId::new(1),
            products: Vec::new(),
            date_added: Utc::now(),
        }
    }

    #[test]
    fn test_add_and_remove() {
        let mut wishlist = empty_wishlist();
        let now = Utc::now();

        wishlist.add(ProductId::new(3), now).unwrap();
        assert!(wishlist.contains(ProductId::new(3)));

        wishlist.remove(ProductId::new(3)).unwrap();
        assert!(!wishlist.contains(ProductId::new(3)));
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut wishlist = empty_wishlist();
        let now = Utc::now();
        wishlist.add(ProductId::new(3), now).unwrap();

        assert_eq!(
            wishlist.add(ProductId::new(3), now),
            Err(WishlistError::Duplicate)
        );
        assert_eq!(wishlist.products.len(), 1);
    }

    #[test]
    fn test_remove_absent_rejected() {
        let mut wishlist = empty_wishlist();
        assert_eq!(
            wishlist.remove(ProductId::new(3)),
            Err(WishlistError::NotFound)
        );
    }
}
