//! Integration tests for the address-book default-flag invariants.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p threadline-api)
//!
//! Run with: cargo test -p threadline-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use threadline_integration_tests::{api_base_url, unique_email};

async fn session_token(client: &Client) -> String {
    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&json!({
            "name": "Address Tester",
            "email": unique_email("addr"),
            "password": "integration-pass-1",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("register body not json");
    body["token"].as_str().expect("token missing").to_owned()
}

fn address_payload(name: &str, is_default: bool) -> Value {
    json!({
        "name": name,
        "streetAddress": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postalCode": "62701",
        "country": "US",
        "isDefault": is_default,
    })
}

async fn add_address(client: &Client, token: &str, name: &str, is_default: bool) -> Value {
    let resp = client
        .post(format!("{}/api/user/addresses", api_base_url()))
        .header("x-auth-token", token)
        .json(&address_payload(name, is_default))
        .send()
        .await
        .expect("add address request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("address list not json")
}

fn default_count(addresses: &Value) -> usize {
    addresses
        .as_array()
        .expect("address list not an array")
        .iter()
        .filter(|address| address["isDefault"].as_bool() == Some(true))
        .count()
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn at_most_one_default_after_any_sequence() {
    let client = Client::new();
    let token = session_token(&client).await;

    let addresses = add_address(&client, &token, "Home", true).await;
    assert_eq!(default_count(&addresses), 1);

    // A second default demotes the first
    let addresses = add_address(&client, &token, "Work", true).await;
    assert_eq!(default_count(&addresses), 1);

    let work_id = addresses
        .as_array()
        .and_then(|list| list.iter().find(|a| a["name"] == "Work"))
        .and_then(|a| a["id"].as_str())
        .expect("work address id missing")
        .to_owned();

    // Set-default is idempotent and still leaves exactly one default
    let resp = client
        .put(format!(
            "{}/api/user/addresses/{work_id}/default",
            api_base_url()
        ))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("set default request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let addresses: Value = resp.json().await.expect("address list not json");
    assert_eq!(default_count(&addresses), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn default_address_cannot_be_deleted() {
    let client = Client::new();
    let token = session_token(&client).await;

    let addresses = add_address(&client, &token, "Home", true).await;
    let home_id = addresses[0]["id"].as_str().expect("address id missing").to_owned();

    let resp = client
        .delete(format!("{}/api/user/addresses/{home_id}", api_base_url()))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("delete request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body not json");
    assert_eq!(
        body["message"].as_str(),
        Some("Cannot delete default address")
    );

    // The list is unchanged afterwards
    let addresses: Value = client
        .get(format!("{}/api/user/addresses", api_base_url()))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("list request failed")
        .json()
        .await
        .expect("address list not json");
    assert_eq!(addresses.as_array().map(Vec::len), Some(1));
    assert_eq!(default_count(&addresses), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn payment_method_defaults_follow_same_rule() {
    let client = Client::new();
    let token = session_token(&client).await;

    let resp = client
        .post(format!("{}/api/user/payment-methods", api_base_url()))
        .header("x-auth-token", &token)
        .json(&json!({
            "type": "credit",
            "cardBrand": "visa",
            "lastFour": "4242",
            "expiryMonth": 12,
            "expiryYear": 2030,
            "isDefault": true,
        }))
        .send()
        .await
        .expect("add payment method request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let methods: Value = resp.json().await.expect("method list not json");
    let method_id = methods[0]["id"].as_str().expect("method id missing").to_owned();

    let resp = client
        .delete(format!(
            "{}/api/user/payment-methods/{method_id}",
            api_base_url()
        ))
        .header("x-auth-token", &token)
        .send()
        .await
        .expect("delete request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body not json");
    assert_eq!(
        body["message"].as_str(),
        Some("Cannot delete default payment method")
    );
}
