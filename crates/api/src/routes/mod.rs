//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (pings the database)
//!
//! # Auth (rate limited)
//! POST /api/auth/register                       - Email/password registration
//! POST /api/auth/login                          - Email/password login
//! POST /api/auth/google                         - Google ID-token sign-in
//!
//! # Account (requires x-auth-token)
//! GET  /api/user/profile                        - Full profile
//! PUT  /api/user/profile                        - Update name/phone
//! PUT  /api/user/email                          - Change email (reissues token)
//! PUT  /api/user/password                       - Change password
//! DELETE /api/user                              - Delete account
//! GET/POST /api/user/addresses                  - Address book
//! PUT/DELETE /api/user/addresses/{id}           - Update/remove one address
//! PUT  /api/user/addresses/{id}/default         - Promote to default
//! GET/POST /api/user/payment-methods            - Saved payment methods
//! DELETE /api/user/payment-methods/{id}         - Remove one payment method
//! PUT  /api/user/payment-methods/{id}/default   - Promote to default
//!
//! # Catalog (public)
//! GET  /api/products                            - Filter/sort/paginate listing
//! GET  /api/products/search?q=                  - Free-text search
//! GET  /api/products/new-arrivals               - Featured, newest first
//! GET  /api/products/top-selling                - Merchandising shelves
//! GET  /api/products/{id}                       - Product detail
//! GET  /api/categories                          - Category list
//! GET  /api/categories/{name}/products          - Listing scoped to a category
//!
//! # Reviews
//! GET  /api/products/{id}/reviews               - Public review list
//! POST /api/products/{id}/reviews               - Add or overwrite own review
//! DELETE /api/products/{id}/reviews/{reviewId}  - Delete own review
//!
//! # Cart (requires x-auth-token)
//! GET  /api/cart                                - Cart with derived totals
//! POST /api/cart                                - Add item (merges matching lines)
//! PUT  /api/cart/{itemId}                       - Set line quantity
//! DELETE /api/cart/{itemId}                     - Remove line
//! DELETE /api/cart                              - Clear cart
//!
//! # Orders (requires x-auth-token)
//! GET  /api/orders                              - Paginated history
//! POST /api/orders                              - Checkout (clears cart)
//! GET  /api/orders/{id}                         - Order detail
//! POST /api/orders/{id}/cancel                  - Cancel (validated transition)
//!
//! # Wishlist (requires x-auth-token)
//! GET  /api/wishlist                            - Wishlist with product summaries
//! POST /api/wishlist                            - Add product
//! DELETE /api/wishlist/{productId}              - Remove product
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Plain confirmation body, e.g. `{"message": "Account deleted successfully"}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Create the auth routes router (rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
        .layer(auth_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", delete(account::delete_account))
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/email", put(account::update_email))
        .route("/password", put(account::update_password))
        .route(
            "/addresses",
            get(account::addresses).post(account::add_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route("/addresses/{id}/default", put(account::set_default_address))
        .route(
            "/payment-methods",
            get(account::payment_methods).post(account::add_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            delete(account::delete_payment_method),
        )
        .route(
            "/payment-methods/{id}/default",
            put(account::set_default_payment_method),
        )
}

/// Create the product routes router (catalog + reviews).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/search", get(products::search))
        .route("/new-arrivals", get(products::new_arrivals))
        .route("/top-selling", get(products::top_selling))
        .route("/{id}", get(products::show))
        .route(
            "/{id}/reviews",
            get(reviews::index).post(reviews::upsert),
        )
        .route("/{id}/reviews/{review_id}", delete(reviews::remove))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{name}/products", get(categories::products))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route(
            "/{item_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).post(wishlist::add))
        .route("/{product_id}", delete(wishlist::remove))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/user", account_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/wishlist", wishlist_routes())
}
