//! Wishlist route handlers.
//!
//! Responses project each saved product into a summary (price, rating,
//! stock) so the client can render the list without extra catalog calls.

use std::collections::HashMap;

use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadline_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::wishlists::WishlistRepository;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::models::product::Product;
use crate::models::wishlist::{Wishlist, WishlistEntry};
use crate::state::AppState;

/// Wishlist response: product summaries in list order.
#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub items: Vec<WishlistEntry>,
    pub count: usize,
}

/// Add-to-wishlist request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// Project the wishlist into response entries, preserving list order and
/// skipping products that have disappeared from the catalog.
async fn build_response(state: &AppState, wishlist: &Wishlist) -> Result<WishlistResponse> {
    if wishlist.products.is_empty() {
        return Ok(WishlistResponse {
            items: Vec::new(),
            count: 0,
        });
    }

    let products = ProductRepository::new(state.pool())
        .get_many(&wishlist.products)
        .await?;
    let by_id: HashMap<ProductId, Product> =
        products.into_iter().map(|p| (p.id, p)).collect();

    let items: Vec<WishlistEntry> = wishlist
        .products
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|product| WishlistEntry::from_product(product, wishlist.date_added))
        .collect();

    Ok(WishlistResponse {
        count: items.len(),
        items,
    })
}

/// Get the wishlist, creating an empty one on first access.
///
/// GET /api/wishlist
///
/// # Errors
///
/// Returns 500 only for store failures.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<WishlistResponse>> {
    let wishlist = WishlistRepository::new(state.pool())
        .get_or_create(current.id)
        .await?;

    Ok(Json(build_response(&state, &wishlist).await?))
}

/// Add a product to the wishlist.
///
/// POST /api/wishlist
///
/// # Errors
///
/// Returns 404 for unknown products, 400 for duplicates.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<AddToWishlistRequest>,
) -> Result<Json<WishlistResponse>> {
    // The product must still exist in the catalog
    ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let wishlists = WishlistRepository::new(state.pool());
    let mut wishlist = wishlists.get_or_create(current.id).await?;

    wishlist.add(body.product_id, Utc::now())?;
    wishlists.save(&wishlist).await?;

    Ok(Json(build_response(&state, &wishlist).await?))
}

/// Remove a product from the wishlist.
///
/// DELETE /api/wishlist/{productId}
///
/// # Errors
///
/// Returns 404 when the product is not on the list.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<WishlistResponse>> {
    let wishlists = WishlistRepository::new(state.pool());
    let mut wishlist = wishlists.get_or_create(current.id).await?;

    wishlist.remove(product_id)?;
    wishlists.save(&wishlist).await?;

    Ok(Json(build_response(&state, &wishlist).await?))
}
