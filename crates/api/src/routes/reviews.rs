//! Review route handlers.
//!
//! Reviews live inside the product document. Every mutation recomputes the
//! product's derived rating and review count before the response is sent,
//! so clients never observe stale aggregates.

use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use threadline_core::{ProductId, ReviewId};

use super::MessageResponse;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::models::product::{Product, Review};
use crate::state::AppState;

/// Review submission body.
#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub rating: u8,
    pub text: String,
}

async fn load_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// List a product's reviews.
///
/// GET /api/products/{id}/reviews
///
/// # Errors
///
/// Returns 404 for an unknown product.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let product = load_product(&state, id).await?;
    Ok(Json(product.reviews))
}

/// Add the caller's review, or overwrite their existing one.
///
/// POST /api/products/{id}/reviews
///
/// A brand-new review checks the caller's delivered orders to set the
/// verified-purchase flag; an overwrite keeps the flag decided at creation.
///
/// # Errors
///
/// Returns 400 for blank text or an out-of-range rating, 404 for unknown
/// products.
#[instrument(skip(state, body))]
pub async fn upsert(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ProductId>,
    Json(body): Json<AddReviewRequest>,
) -> Result<Json<Vec<Review>>> {
    if body.text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Rating and review text are required".to_owned(),
        ));
    }

    let mut product = load_product(&state, id).await?;

    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    // Only a brand-new review needs the purchase check; overwrites keep the
    // flag decided at creation
    let verified = if product.review_by(current.id).is_some() {
        false
    } else {
        OrderRepository::new(state.pool())
            .has_delivered_product(current.id, id)
            .await?
    };

    product.upsert_review(
        current.id,
        &user.name,
        body.rating,
        &body.text,
        verified,
        Utc::now(),
    )?;

    ProductRepository::new(state.pool())
        .save_review_state(&product)
        .await?;

    Ok(Json(product.reviews))
}

/// Delete the caller's review.
///
/// DELETE /api/products/{id}/reviews/{reviewId}
///
/// # Errors
///
/// Returns 404 for unknown products or reviews, 403 when the caller is not
/// the author.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path((id, review_id)): Path<(ProductId, ReviewId)>,
) -> Result<Json<MessageResponse>> {
    let mut product = load_product(&state, id).await?;

    product.remove_review(review_id, current.id)?;

    ProductRepository::new(state.pool())
        .save_review_state(&product)
        .await?;

    Ok(Json(MessageResponse::new("Review deleted successfully")))
}
