//! Database operations for the storefront `PostgreSQL`.
//!
//! # Data model
//!
//! One table per aggregate, document style: sub-documents (addresses,
//! payment methods, cart lines, reviews, order items) live in JSONB columns
//! and are decoded through `sqlx::types::Json`. Repositories load the whole
//! aggregate, domain methods mutate it, and the repository writes it back.
//!
//! ## Tables
//!
//! - `users` - Accounts, embedded address book and payment methods
//! - `products` - Catalog, embedded reviews plus derived rating columns
//! - `categories` - Browse categories
//! - `carts` - One cart per user, embedded line items
//! - `orders` - Immutable item snapshots plus fulfillment state
//! - `wishlists` - One wishlist per user, product id list
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p threadline-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::{ProductFilter, ProductRepository, ProductSort, TopSellingFilter};
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
