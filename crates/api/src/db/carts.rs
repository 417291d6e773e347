//! Cart repository.
//!
//! Carts are 1:1 with users and created lazily: the first read upserts an
//! empty cart. Items are a JSONB sub-document written back whole.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use threadline_core::{CartId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user: UserId::new(row.user_id),
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart, creating an empty one on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user: UserId) -> Result<Cart, RepositoryError> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on conflict
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING *",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok(Cart::from(row))
    }

    /// Persist the item list after a domain mutation, refreshing the
    /// updated-at timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart doesn't exist.
    pub async fn save_items(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE carts SET items = $2, updated_at = now() WHERE id = $1")
                .bind(cart.id)
                .bind(Json(&cart.items))
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
