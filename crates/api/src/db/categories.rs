//! Category repository.

use serde::Deserialize;
use sqlx::PgPool;

use threadline_core::CategoryId;

use super::RepositoryError;
use crate::models::category::Category;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    image_src: Option<String>,
    kind: Option<String>,
    product_count: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            image_src: row.image_src,
            kind: row.kind,
            product_count: u32::try_from(row.product_count).unwrap_or_default(),
        }
    }
}

/// A category as supplied by the seed catalog file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_src: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Insert a category from the seed catalog, ignoring duplicates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, category: &NewCategory) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO categories (name, description, image_src, kind)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image_src)
        .bind(&category.kind)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Refresh the denormalized product counts from the products table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn refresh_product_counts(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE categories c
             SET product_count = (SELECT COUNT(*) FROM products p WHERE p.category = c.name)",
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
