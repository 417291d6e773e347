//! Integration tests for cart mutation and derived totals.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied and a seeded
//!   catalog (tl-cli seed)
//! - The API server running (cargo run -p threadline-api)
//!
//! Run with: cargo test -p threadline-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use threadline_integration_tests::{api_base_url, unique_email};

/// Register a throwaway account and return its token.
async fn session_token(client: &Client) -> String {
    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&json!({
            "name": "Cart Tester",
            "email": unique_email("cart"),
            "password": "integration-pass-1",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("register body not json");
    body["token"].as_str().expect("token missing").to_owned()
}

/// First product id in the seeded catalog.
async fn any_product(client: &Client) -> Value {
    let body: Value = client
        .get(format!("{}/api/products?limit=1", api_base_url()))
        .send()
        .await
        .expect("products request failed")
        .json()
        .await
        .expect("products body not json");

    body["products"]
        .as_array()
        .and_then(|products| products.first())
        .cloned()
        .expect("catalog is empty; run tl-cli seed first")
}

async fn add_to_cart(client: &Client, token: &str, product_id: i64, quantity: u32) -> Value {
    let resp = client
        .post(format!("{}/api/cart", api_base_url()))
        .header("x-auth-token", token)
        .json(&json!({
            "productId": product_id,
            "quantity": quantity,
            "size": "M",
            "color": "Black",
        }))
        .send()
        .await
        .expect("add to cart request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("cart body not json")
}

#[tokio::test]
#[ignore = "Requires running API server, database, and seeded catalog"]
async fn matching_lines_merge_and_totals_derive() {
    let client = Client::new();
    let token = session_token(&client).await;
    let product = any_product(&client).await;
    let product_id = product["id"].as_i64().expect("product id missing");
    let unit_price = product["price"].as_f64().expect("product price missing");

    let cart = add_to_cart(&client, &token, product_id, 2).await;
    assert_eq!(cart["itemCount"].as_u64(), Some(1));

    // Same (product, size, color) merges instead of appending
    let cart = add_to_cart(&client, &token, product_id, 1).await;
    assert_eq!(cart["itemCount"].as_u64(), Some(1));
    assert_eq!(cart["items"][0]["quantity"].as_u64(), Some(3));

    let subtotal = cart["subtotal"].as_f64().expect("subtotal missing");
    assert!((subtotal - unit_price * 3.0).abs() < 0.001);
}

#[tokio::test]
#[ignore = "Requires running API server, database, and seeded catalog"]
async fn zero_quantity_rejected() {
    let client = Client::new();
    let token = session_token(&client).await;
    let product = any_product(&client).await;
    let product_id = product["id"].as_i64().expect("product id missing");

    let resp = client
        .post(format!("{}/api/cart", api_base_url()))
        .header("x-auth-token", &token)
        .json(&json!({
            "productId": product_id,
            "quantity": 0,
            "size": "M",
            "color": "Black",
        }))
        .send()
        .await
        .expect("add to cart request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body not json");
    assert_eq!(
        body["message"].as_str(),
        Some("Quantity must be greater than 0")
    );
}

#[tokio::test]
#[ignore = "Requires running API server, database, and seeded catalog"]
async fn update_remove_and_clear_lines() {
    let client = Client::new();
    let token = session_token(&client).await;
    let product = any_product(&client).await;
    let product_id = product["id"].as_i64().expect("product id missing");

    let cart = add_to_cart(&client, &token, product_id, 1).await;
    let item_id = cart["items"][0]["id"].as_str().expect("item id missing").to_owned();

    // Bump the quantity
    let resp = client
        .put(format!("{}/api/cart/{item_id}", api_base_url()))
        .header("x-auth-token", &token)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("cart body not json");
    assert_eq!(cart["items"][0]["quantity"].as_u64(), Some(5));

    // Remove the line
    let resp = client
        .delete(format!("{}/api/cart/{item_id}", api_base_url()))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("remove request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("cart body not json");
    assert_eq!(cart["itemCount"].as_u64(), Some(0));

    // Removing again is a 404
    let resp = client
        .delete(format!("{}/api/cart/{item_id}", api_base_url()))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("second remove request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server, database, and seeded catalog"]
async fn checkout_snapshots_items_and_clears_cart() {
    let client = Client::new();
    let token = session_token(&client).await;
    let product = any_product(&client).await;
    let product_id = product["id"].as_i64().expect("product id missing");

    add_to_cart(&client, &token, product_id, 2).await;

    let address = json!({
        "name": "Home",
        "streetAddress": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postalCode": "62701",
        "country": "US",
    });
    let resp = client
        .post(format!("{}/api/orders", api_base_url()))
        .header("x-auth-token", &token)
        .json(&json!({
            "items": [{
                "product": product_id,
                "name": "Snapshot Name",
                "imageSrc": "/img/snapshot.jpg",
                "price": 50.0,
                "quantity": 2,
                "size": "M",
                "color": "Black",
            }],
            "shippingAddress": address,
            "billingAddress": address,
            "paymentMethod": "visa-4242",
            "subtotal": 100.0,
            "shippingCost": 5.0,
            "tax": 8.0,
            "total": 113.0,
        }))
        .send()
        .await
        .expect("checkout request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("order body not json");
    assert_eq!(order["status"].as_str(), Some("processing"));
    assert_eq!(order["paymentStatus"].as_str(), Some("paid"));
    // The snapshot is stored verbatim, not re-derived from the catalog
    assert_eq!(order["items"][0]["name"].as_str(), Some("Snapshot Name"));
    assert_eq!(order["items"][0]["price"].as_f64(), Some(50.0));

    // The cart was cleared in the same transaction
    let cart: Value = client
        .get(format!("{}/api/cart", api_base_url()))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("cart request failed")
        .json()
        .await
        .expect("cart body not json");
    assert_eq!(cart["itemCount"].as_u64(), Some(0));
}
