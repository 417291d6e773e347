//! Wishlist repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use threadline_core::{ProductId, UserId, WishlistId};

use super::RepositoryError;
use crate::models::wishlist::Wishlist;

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    id: i32,
    user_id: i32,
    product_ids: Json<Vec<ProductId>>,
    date_added: DateTime<Utc>,
}

impl From<WishlistRow> for Wishlist {
    fn from(row: WishlistRow) -> Self {
        Self {
            id: WishlistId::new(row.id),
            user: UserId::new(row.user_id),
            products: row.product_ids.0,
            date_added: row.date_added,
        }
    }
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's wishlist, creating an empty one on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user: UserId) -> Result<Wishlist, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(
            "INSERT INTO wishlists (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING *",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok(Wishlist::from(row))
    }

    /// Persist the product list after a domain mutation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wishlist doesn't exist.
    pub async fn save(&self, wishlist: &Wishlist) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE wishlists SET product_ids = $2, date_added = $3 WHERE id = $1")
                .bind(wishlist.id)
                .bind(Json(&wishlist.products))
                .bind(wishlist.date_added)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
