//! Seed the catalog from a JSON file.
//!
//! The file carries categories and products in the API's own wire format
//! (camelCase field names). The file is validated in full before anything
//! touches the database, and category product counts are refreshed after
//! the inserts.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info};

use threadline_api::db;
use threadline_api::db::categories::{CategoryRepository, NewCategory};
use threadline_api::db::products::{NewProduct, ProductRepository};

/// Parsed catalog seed file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<NewCategory>,
    #[serde(default)]
    products: Vec<NewProduct>,
}

/// Validate the catalog, returning every problem found.
fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut skus = HashSet::new();

    for (index, product) in catalog.products.iter().enumerate() {
        if product.name.trim().is_empty() {
            errors.push(format!("product #{index}: name is empty"));
        }
        if product.sku.trim().is_empty() {
            errors.push(format!("product #{index}: sku is empty"));
        } else if !skus.insert(product.sku.clone()) {
            errors.push(format!("product #{index}: duplicate sku '{}'", product.sku));
        }
        if product.price.amount() <= Decimal::ZERO {
            errors.push(format!("product #{index}: price must be positive"));
        }
        if product.category.trim().is_empty() {
            errors.push(format!("product #{index}: category is empty"));
        }
    }

    for (index, category) in catalog.categories.iter().enumerate() {
        if category.name.trim().is_empty() {
            errors.push(format!("category #{index}: name is empty"));
        }
    }

    errors
}

/// Seed categories and products from a JSON catalog file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or fails validation, or database operations fail.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("THREADLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "THREADLINE_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate the file before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_json::from_str(&content)?;

    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Parsed catalog"
    );

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Catalog validated successfully");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let categories = CategoryRepository::new(&pool);
    for category in &catalog.categories {
        categories.insert(category).await?;
    }
    info!(count = catalog.categories.len(), "Categories seeded");

    let products = ProductRepository::new(&pool);
    for product in &catalog.products {
        let id = products.insert(product).await?;
        tracing::debug!(product_id = %id, sku = %product.sku, "Product inserted");
    }
    info!(count = catalog.products.len(), "Products seeded");

    categories.refresh_product_counts().await?;
    info!("Category product counts refreshed");

    Ok(())
}
