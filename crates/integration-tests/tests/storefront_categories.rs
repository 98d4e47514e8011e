//! Integration tests for the public storefront.
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::Value;

use atelier_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(format!("{}/health", ctx.storefront_url))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_landing_and_category_listing_are_public() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(format!("{}/", ctx.storefront_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["categories"].is_array());

    let resp = ctx
        .client
        .get(format!("{}/categories", ctx.storefront_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_category_lookup_by_slug() {
    let ctx = TestContext::new().await;

    // Seeded category
    let resp = ctx
        .client
        .get(format!("{}/categories/shoes", ctx.storefront_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["slug"], Value::String("shoes".to_owned()));
    assert!(body["products"].is_array());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_slug_is_404() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(format!("{}/categories/no-such-slug", ctx.storefront_url))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
