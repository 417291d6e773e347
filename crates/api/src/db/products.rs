//! Product repository: catalog reads with filtering, sorting, and
//! pagination, plus review-state persistence.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use threadline_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::product::{ColorOption, Product, Review};

/// Database row for a product aggregate.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Money,
    original_price: Option<Money>,
    discount_percentage: Option<f64>,
    image_src: String,
    images: Json<Vec<String>>,
    category: String,
    subcategory: Option<String>,
    tags: Json<Vec<String>>,
    rating: f64,
    review_count: i32,
    in_stock: bool,
    sizes: Json<Vec<String>>,
    colors: Json<Vec<ColorOption>>,
    sku: String,
    material: Option<String>,
    trending: bool,
    best_rated: bool,
    most_popular: bool,
    featured: bool,
    reviews: Json<Vec<Review>>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            discount_percentage: row.discount_percentage,
            image_src: row.image_src,
            images: row.images.0,
            category: row.category,
            subcategory: row.subcategory,
            tags: row.tags.0,
            rating: row.rating,
            review_count: u32::try_from(row.review_count).unwrap_or_default(),
            in_stock: row.in_stock,
            sizes: row.sizes.0,
            colors: row.colors.0,
            sku: row.sku,
            material: row.material,
            trending: row.trending,
            best_rated: row.best_rated,
            most_popular: row.most_popular,
            featured: row.featured,
            reviews: row.reviews.0,
            created_at: row.created_at,
        }
    }
}

/// Catalog listing filters. All fields are optional and combine with AND.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Match products offering any of these sizes.
    pub sizes: Vec<String>,
    /// Match products offering any of these color names.
    pub colors: Vec<String>,
    /// Case-insensitive match against name, description, or tags.
    pub search: Option<String>,
}

/// Catalog sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
    Rating,
}

impl ProductSort {
    /// Parse the wire value (`price-asc`, `price-desc`, `newest`, `rating`),
    /// defaulting to newest-first for anything else.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("rating") => Self::Rating,
            _ => Self::Newest,
        }
    }

    const fn order_clause(self) -> &'static str {
        match self {
            Self::PriceAsc => " ORDER BY price ASC",
            Self::PriceDesc => " ORDER BY price DESC",
            Self::Newest => " ORDER BY created_at DESC",
            Self::Rating => " ORDER BY rating DESC",
        }
    }
}

/// Merchandising shelf selected by the top-selling endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopSellingFilter {
    #[default]
    Trending,
    BestRated,
    MostPopular,
}

impl TopSellingFilter {
    /// Parse the wire value, defaulting to trending.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("best-rated") => Self::BestRated,
            Some("most-popular") => Self::MostPopular,
            _ => Self::Trending,
        }
    }

    const fn flag_column(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::BestRated => "best_rated",
            Self::MostPopular => "most_popular",
        }
    }
}

/// Append the filter's WHERE clauses to a query.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    query.push(" WHERE TRUE");

    if let Some(category) = &filter.category {
        query.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(min_price) = filter.min_price {
        query.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query.push(" AND price <= ").push_bind(max_price);
    }
    if !filter.sizes.is_empty() {
        // sizes is a JSONB string array; ?| matches any of the given keys
        query.push(" AND sizes ?| ").push_bind(filter.sizes.clone());
    }
    if !filter.colors.is_empty() {
        query
            .push(" AND EXISTS (SELECT 1 FROM jsonb_array_elements(colors) AS color")
            .push(" WHERE color->>'name' = ANY(")
            .push_bind(filter.colors.clone())
            .push("))");
    }
    if let Some(term) = &filter.search {
        let pattern = format!("%{term}%");
        query
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM jsonb_array_elements_text(tags) AS tag")
            .push(" WHERE tag ILIKE ")
            .push_bind(pattern)
            .push("))");
    }
}

/// A product as supplied by the seed catalog file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub original_price: Option<Money>,
    pub discount_percentage: Option<f64>,
    pub image_src: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    pub sku: String,
    pub material: Option<String>,
    #[serde(default)]
    pub trending: bool,
    #[serde(default)]
    pub best_rated: bool,
    #[serde(default)]
    pub most_popular: bool,
    #[serde(default)]
    pub featured: bool,
}

const fn default_in_stock() -> bool {
    true
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, returning the requested page and
    /// the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let mut query = QueryBuilder::new("SELECT * FROM products");
        push_filters(&mut query, filter);
        query.push(sort.order_clause());
        query.push(" LIMIT ").push_bind(i64::from(limit));
        query.push(" OFFSET ").push_bind(offset);

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(self.pool).await?;

        Ok((
            rows.into_iter().map(Product::from).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Get several products by ID. Order of the result is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(raw_ids)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Case-insensitive search across name, description, and tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        let filter = ProductFilter {
            search: Some(term.to_owned()),
            ..ProductFilter::default()
        };

        let mut query = QueryBuilder::new("SELECT * FROM products");
        push_filters(&mut query, &filter);
        query.push(" LIMIT ").push_bind(i64::from(limit));

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Newest products, filtered on the featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn new_arrivals(
        &self,
        featured: bool,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE featured = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(featured)
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Best-rated products from one of the merchandising shelves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_selling(
        &self,
        shelf: TopSellingFilter,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT * FROM products WHERE {} = TRUE ORDER BY rating DESC LIMIT $1",
            shelf.flag_column()
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Persist the review list and derived rating columns after a review
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn save_review_state(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET reviews = $2, rating = $3, review_count = $4 WHERE id = $1",
        )
        .bind(product.id)
        .bind(Json(&product.reviews))
        .bind(product.rating)
        .bind(i32::try_from(product.review_count).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Insert a product from the seed catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO products (name, description, price, original_price,
                                   discount_percentage, image_src, images, category,
                                   subcategory, tags, in_stock, sizes, colors, sku,
                                   material, trending, best_rated, most_popular, featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                     $16, $17, $18, $19)
             RETURNING id",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.discount_percentage)
        .bind(&product.image_src)
        .bind(Json(&product.images))
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(Json(&product.tags))
        .bind(product.in_stock)
        .bind(Json(&product.sizes))
        .bind(Json(&product.colors))
        .bind(&product.sku)
        .bind(&product.material)
        .bind(product.trending)
        .bind(product.best_rated)
        .bind(product.most_popular)
        .bind(product.featured)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }
}
