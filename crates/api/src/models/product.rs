//! Product domain types and review aggregation.
//!
//! Reviews are embedded in the product document. The displayed `rating` and
//! `review_count` are derived from the review list and recomputed
//! synchronously by every mutation here, so they can never be observed
//! stale. A user holds at most one review per product: resubmitting
//! overwrites rating, text, and date in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use threadline_core::{Money, ProductId, ReviewId, UserId};

/// Errors from review operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// Rating must be between 1 and 5.
    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    /// Referenced review does not exist on this product.
    #[error("Review not found")]
    NotFound,

    /// Only the author may delete a review.
    #[error("Not authorized to delete this review")]
    NotAuthor,
}

/// A color variant offered for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    pub name: String,
    pub hex: String,
}

/// A customer review, embedded in the product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    /// Author.
    pub user: UserId,
    /// Author display name, snapshotted at review time.
    pub user_name: String,
    pub rating: u8,
    pub text: String,
    pub date: DateTime<Utc>,
    /// Whether the author had a delivered order containing this product when
    /// the review was created. Set once, never recomputed.
    pub verified: bool,
}

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub original_price: Option<Money>,
    pub discount_percentage: Option<f64>,
    pub image_src: String,
    pub images: Vec<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    /// Derived: arithmetic mean of review ratings, 0 when there are none.
    pub rating: f64,
    /// Derived: number of reviews.
    pub review_count: u32,
    pub in_stock: bool,
    pub sizes: Vec<String>,
    pub colors: Vec<ColorOption>,
    pub sku: String,
    pub material: Option<String>,
    pub trending: bool,
    pub best_rated: bool,
    pub most_popular: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub reviews: Vec<Review>,
}

impl Product {
    /// Arithmetic mean of all review ratings, 0.0 for an unreviewed product.
    #[must_use]
    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
        {
            f64::from(total) / self.reviews.len() as f64
        }
    }

    /// Recompute the derived `rating` and `review_count` from the review
    /// list. Must be called after any review mutation, before persisting.
    pub fn sync_review_stats(&mut self) {
        self.rating = self.average_rating();
        self.review_count = u32::try_from(self.reviews.len()).unwrap_or(u32::MAX);
    }

    /// Add the caller's review, or overwrite their existing one.
    ///
    /// A second submission by the same user replaces rating, text, and date
    /// in place; the review id and the `verified` flag computed at creation
    /// are kept. Derived stats are recomputed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidRating`] if `rating` is outside 1..=5.
    pub fn upsert_review(
        &mut self,
        user: UserId,
        user_name: &str,
        rating: u8,
        text: &str,
        verified: bool,
        now: DateTime<Utc>,
    ) -> Result<(), ReviewError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::InvalidRating);
        }

        if let Some(existing) = self.reviews.iter_mut().find(|r| r.user == user) {
            existing.rating = rating;
            existing.text = text.to_owned();
            existing.date = now;
        } else {
            self.reviews.push(Review {
                id: ReviewId::generate(),
                user,
                user_name: user_name.to_owned(),
                rating,
                text: text.to_owned(),
                date: now,
                verified,
            });
        }

        self.sync_review_stats();
        Ok(())
    }

    /// Remove a review on behalf of `requester`.
    ///
    /// Derived stats are recomputed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::NotFound`] if the review does not exist, or
    /// [`ReviewError::NotAuthor`] if `requester` did not write it.
    pub fn remove_review(
        &mut self,
        review_id: ReviewId,
        requester: UserId,
    ) -> Result<(), ReviewError> {
        let review = self
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .ok_or(ReviewError::NotFound)?;
        if review.user != requester {
            return Err(ReviewError::NotAuthor);
        }
        self.reviews.retain(|r| r.id != review_id);
        self.sync_review_stats();
        Ok(())
    }

    /// The review written by `user`, if any.
    #[must_use]
    pub fn review_by(&self, user: UserId) -> Option<&Review> {
        self.reviews.iter().find(|r| r.user == user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Slim Fit Tee".to_owned(),
            description: "A tee".to_owned(),
            price: Money::new("19.99".parse().unwrap()),
            original_price: None,
            discount_percentage: None,
            image_src: "/img/tee.jpg".to_owned(),
            images: Vec::new(),
            category: "t-shirts".to_owned(),
            subcategory: None,
            tags: Vec::new(),
            rating: 0.0,
            review_count: 0,
            in_stock: true,
            sizes: vec!["M".to_owned(), "L".to_owned()],
            colors: Vec::new(),
            sku: "TEE-001".to_owned(),
            material: None,
            trending: false,
            best_rated: false,
            most_popular: false,
            featured: false,
            created_at: Utc::now(),
            reviews: Vec::new(),
        }
    }

    #[test]
    fn test_rating_is_zero_without_reviews() {
        let product = test_product();
        assert!((product.average_rating() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rating_is_mean_of_reviews() {
        let mut product = test_product();
        let now = Utc::now();
        product
            .upsert_review(UserId::new(1), "Ana", 4, "Good", false, now)
            .unwrap();
        product
            .upsert_review(UserId::new(2), "Ben", 2, "Meh", false, now)
            .unwrap();

        assert!((product.rating - 3.0).abs() < f64::EPSILON);
        assert_eq!(product.review_count, 2);
    }

    #[test]
    fn test_resubmission_overwrites_in_place() {
        let mut product = test_product();
        let now = Utc::now();
        product
            .upsert_review(UserId::new(1), "Ana", 2, "Meh", true, now)
            .unwrap();
        let original_id = product.reviews.first().unwrap().id;

        let later = now + chrono::Duration::hours(1);
        product
            .upsert_review(UserId::new(1), "Ana", 5, "Grew on me", false, later)
            .unwrap();

        assert_eq!(product.review_count, 1);
        let review = product.reviews.first().unwrap();
        assert_eq!(review.id, original_id);
        assert_eq!(review.rating, 5);
        assert_eq!(review.text, "Grew on me");
        assert_eq!(review.date, later);
        // verified was decided at creation and is kept on overwrite
        assert!(review.verified);
        assert!((product.rating - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_review_recomputes_stats() {
        let mut product = test_product();
        let now = Utc::now();
        product
            .upsert_review(UserId::new(1), "Ana", 4, "Good", false, now)
            .unwrap();
        product
            .upsert_review(UserId::new(2), "Ben", 2, "Meh", false, now)
            .unwrap();
        let ben_review = product.review_by(UserId::new(2)).unwrap().id;

        product.remove_review(ben_review, UserId::new(2)).unwrap();

        assert_eq!(product.review_count, 1);
        assert!((product.rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_requires_author() {
        let mut product = test_product();
        product
            .upsert_review(UserId::new(1), "Ana", 4, "Good", false, Utc::now())
            .unwrap();
        let review_id = product.reviews.first().unwrap().id;

        assert_eq!(
            product.remove_review(review_id, UserId::new(2)),
            Err(ReviewError::NotAuthor)
        );
        assert_eq!(product.review_count, 1);
    }

    #[test]
    fn test_delete_unknown_review() {
        let mut product = test_product();
        assert_eq!(
            product.remove_review(ReviewId::generate(), UserId::new(1)),
            Err(ReviewError::NotFound)
        );
    }

    #[test]
    fn test_rating_bounds() {
        let mut product = test_product();
        let now = Utc::now();
        assert_eq!(
            product.upsert_review(UserId::new(1), "Ana", 0, "!", false, now),
            Err(ReviewError::InvalidRating)
        );
        assert_eq!(
            product.upsert_review(UserId::new(1), "Ana", 6, "!", false, now),
            Err(ReviewError::InvalidRating)
        );
        assert!(product.reviews.is_empty());
    }
}
