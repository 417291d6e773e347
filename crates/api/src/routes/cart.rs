//! Cart route handlers.
//!
//! Every response carries the full item list plus totals derived fresh from
//! it (subtotal and line count are never stored). The cart itself is
//! created lazily on first access and survives checkout empty.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadline_core::{CartItemId, Money, ProductId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::models::cart::{Cart, CartItem};
use crate::state::AppState;

/// Cart response: items plus derived totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub item_count: usize,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.items.clone(),
            subtotal: totals.subtotal,
            item_count: totals.item_count,
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// Get the cart, creating an empty one on first access.
///
/// GET /api/cart
///
/// # Errors
///
/// Returns 500 only for store failures.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CartResponse>> {
    let cart = CartRepository::new(state.pool())
        .get_or_create(current.id)
        .await?;

    Ok(Json(CartResponse::from(&cart)))
}

/// Add a product to the cart, merging into an existing (product, size,
/// color) line or appending a new one at the product's current price.
///
/// POST /api/cart
///
/// # Errors
///
/// Returns 400 for a non-positive quantity or an out-of-stock product, 404
/// for unknown products.
#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    let product = ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    if !product.in_stock {
        return Err(AppError::BadRequest("Product is out of stock".to_owned()));
    }

    let carts = CartRepository::new(state.pool());
    let mut cart = carts.get_or_create(current.id).await?;

    cart.add_item(
        product.id,
        body.quantity,
        &body.size,
        &body.color,
        product.price,
    )?;
    carts.save_items(&cart).await?;

    Ok(Json(CartResponse::from(&cart)))
}

/// Set the quantity of one line.
///
/// PUT /api/cart/{itemId}
///
/// # Errors
///
/// Returns 400 for a non-positive quantity, 404 for an unknown line.
#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(item_id): Path<CartItemId>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());
    let mut cart = carts.get_or_create(current.id).await?;

    cart.update_quantity(item_id, body.quantity)?;
    carts.save_items(&cart).await?;

    Ok(Json(CartResponse::from(&cart)))
}

/// Remove one line.
///
/// DELETE /api/cart/{itemId}
///
/// # Errors
///
/// Returns 404 for an unknown line.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());
    let mut cart = carts.get_or_create(current.id).await?;

    cart.remove_item(item_id)?;
    carts.save_items(&cart).await?;

    Ok(Json(CartResponse::from(&cart)))
}

/// Empty the cart, keeping the record.
///
/// DELETE /api/cart
///
/// # Errors
///
/// Returns 500 only for store failures.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());
    let mut cart = carts.get_or_create(current.id).await?;

    cart.clear();
    carts.save_items(&cart).await?;

    Ok(Json(CartResponse::from(&cart)))
}
