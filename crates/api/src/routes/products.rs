//! Catalog route handlers: listing, search, and merchandising shelves.

use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadline_core::ProductId;

use crate::db::products::{ProductFilter, ProductRepository, ProductSort, TopSellingFilter};
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::models::product::Product;
use crate::state::AppState;

/// Default page size for catalog listings.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default shelf size for new-arrivals and top-selling.
const DEFAULT_SHELF_SIZE: u32 = 4;

/// Cap on free-text search results.
const SEARCH_LIMIT: u32 = 20;

/// Catalog listing query parameters. Sizes and colors are comma-separated
/// lists; prices are decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sizes: Option<String>,
    pub colors: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Parse the raw query into a repository filter.
    ///
    /// # Errors
    ///
    /// Returns 400 for unparseable price bounds.
    pub(crate) fn to_filter(&self) -> Result<ProductFilter> {
        Ok(ProductFilter {
            category: self.category.clone(),
            min_price: parse_price(self.min_price.as_deref(), "minPrice")?,
            max_price: parse_price(self.max_price.as_deref(), "maxPrice")?,
            sizes: split_csv(self.sizes.as_deref()),
            colors: split_csv(self.colors.as_deref()),
            search: self.search.clone(),
        })
    }

    pub(crate) fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub(crate) fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    pub(crate) fn sort(&self) -> ProductSort {
        ProductSort::parse(self.sort.as_deref())
    }
}

fn parse_price(value: Option<&str>, param: &str) -> Result<Option<Decimal>> {
    value
        .map(|raw| {
            raw.parse::<Decimal>()
                .map_err(|_| AppError::BadRequest(format!("Invalid {param} value")))
        })
        .transpose()
}

fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Pagination metadata for catalog listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPagination {
    pub total_products: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

impl ProductPagination {
    pub(crate) fn new(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = total.div_ceil(u64::from(limit));
        Self {
            total_products: total,
            total_pages,
            current_page: page,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
            limit,
        }
    }
}

/// Paginated catalog listing.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: ProductPagination,
}

/// Shelf query parameters for new-arrivals and top-selling.
#[derive(Debug, Deserialize)]
pub struct ShelfQuery {
    pub limit: Option<u32>,
    pub filter: Option<String>,
    pub featured: Option<bool>,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// List products with filtering, sorting, and pagination.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 400 for malformed price filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let filter = query.to_filter()?;
    let (page, limit) = (query.page(), query.limit());

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, query.sort(), page, limit)
        .await?;

    Ok(Json(ProductListResponse {
        products,
        pagination: ProductPagination::new(total, page, limit),
    }))
}

/// Get a single product.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 for an unknown product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// Free-text search across name, description, and tags.
///
/// GET /api/products/search?q=
///
/// # Errors
///
/// Returns 400 when `q` is missing or blank.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_owned()))?;

    let products = ProductRepository::new(state.pool())
        .search(term, SEARCH_LIMIT)
        .await?;

    Ok(Json(products))
}

/// Newest featured products.
///
/// GET /api/products/new-arrivals
///
/// # Errors
///
/// Returns 500 only for store failures.
#[instrument(skip(state))]
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(query): Query<ShelfQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .new_arrivals(
            query.featured.unwrap_or(true),
            query.limit.unwrap_or(DEFAULT_SHELF_SIZE),
        )
        .await?;

    Ok(Json(products))
}

/// Best-rated products from a merchandising shelf (trending by default,
/// `filter=best-rated` / `filter=most-popular` for the others).
///
/// GET /api/products/top-selling
///
/// # Errors
///
/// Returns 500 only for store failures.
#[instrument(skip(state))]
pub async fn top_selling(
    State(state): State<AppState>,
    Query(query): Query<ShelfQuery>,
) -> Result<Json<Vec<Product>>> {
    let shelf = TopSellingFilter::parse(query.filter.as_deref());
    let products = ProductRepository::new(state.pool())
        .top_selling(shelf, query.limit.unwrap_or(DEFAULT_SHELF_SIZE))
        .await?;

    Ok(Json(products))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_splitting() {
        assert_eq!(
            split_csv(Some("S,M, L ,")),
            vec!["S".to_owned(), "M".to_owned(), "L".to_owned()]
        );
        assert!(split_csv(None).is_empty());
        assert!(split_csv(Some("")).is_empty());
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(
            parse_price(Some("19.99"), "minPrice").unwrap(),
            Some("19.99".parse().unwrap())
        );
        assert_eq!(parse_price(None, "minPrice").unwrap(), None);
        assert!(parse_price(Some("cheap"), "minPrice").is_err());
    }

    #[test]
    fn test_pagination_math() {
        let pagination = ProductPagination::new(25, 2, 10);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next_page);
        assert!(pagination.has_prev_page);

        let last = ProductPagination::new(25, 3, 10);
        assert!(!last.has_next_page);

        let empty = ProductPagination::new(0, 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);
    }

    #[test]
    fn test_sort_parsing_defaults_to_newest() {
        assert_eq!(ProductSort::parse(Some("price-asc")), ProductSort::PriceAsc);
        assert_eq!(ProductSort::parse(Some("rating")), ProductSort::Rating);
        assert_eq!(ProductSort::parse(Some("garbage")), ProductSort::Newest);
        assert_eq!(ProductSort::parse(None), ProductSort::Newest);
    }
}
