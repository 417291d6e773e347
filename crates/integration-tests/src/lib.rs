//! Integration tests for Threadline.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p threadline-cli -- migrate
//!
//! # Start the API
//! cargo run -p threadline-api
//!
//! # Run the suite (tests are ignored by default)
//! cargo test -p threadline-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, login, token handling
//! - `cart_flow` - Add/merge/update/remove lines, derived totals
//! - `account_defaults` - Address book default-flag invariants

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_owned())
}

/// A unique throwaway email for one test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}+{}@test.threadline.shop", uuid::Uuid::new_v4())
}
