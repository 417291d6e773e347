//! Category route handlers.

use axum::extract::{Path, Query, State};
use tracing::instrument;

use super::products::{ListQuery, ProductListResponse, ProductPagination};
use crate::db::categories::CategoryRepository;
use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::extract::Json;
use crate::models::category::Category;
use crate::state::AppState;

/// List all categories, sorted by name.
///
/// GET /api/categories
///
/// # Errors
///
/// Returns 500 only for store failures.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// List one category's products with the standard filter/sort/paginate
/// parameters. The path segment wins over any `category` query parameter.
///
/// GET /api/categories/{name}/products
///
/// # Errors
///
/// Returns 400 for malformed price filters.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let mut filter = query.to_filter()?;
    filter.category = Some(name);

    let (page, limit) = (query.page(), query.limit());

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, query.sort(), page, limit)
        .await?;

    Ok(Json(ProductListResponse {
        products,
        pagination: ProductPagination::new(total, page, limit),
    }))
}
