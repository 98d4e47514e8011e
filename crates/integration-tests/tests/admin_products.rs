//! Integration tests for admin product and image management.
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use atelier_integration_tests::TestContext;

async fn create_category(ctx: &TestContext, admin_id: i32, suffix: u32) -> i64 {
    let resp = ctx
        .admin_post("/admin/categories", admin_id)
        .json(&json!({"name": format!("Gear {suffix}"), "slug": format!("gear-{suffix}")}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    body["data"]["id"].as_i64().unwrap()
}

async fn product_images(ctx: &TestContext, admin_id: i32, product_id: i64) -> Vec<Value> {
    let resp = ctx
        .admin_get("/admin/products", admin_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid json");
    body.as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .map(|p| p["images"].as_array().unwrap().clone())
        .unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_invalid_fields_are_all_reported() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();
    let category_id = create_category(&ctx, admin_id, suffix).await;

    let resp = ctx
        .admin_post("/admin/products", admin_id)
        .json(&json!({
            "name": "Bad Product",
            "slug": format!("bad-product-{suffix}"),
            "price": "-1",
            "stock": -5,
            "description": "Broken numbers.",
            "category_id": category_id,
            "is_active": true
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["errors"]["price"].is_array());
    assert!(body["errors"]["stock"].is_array());
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_unknown_category_is_rejected() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();

    let resp = ctx
        .admin_post("/admin/products", admin_id)
        .json(&json!({
            "name": "Orphan",
            "slug": format!("orphan-{suffix}"),
            "price": "10.00",
            "stock": 1,
            "description": "No home.",
            "category_id": 999_999,
            "is_active": true
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["errors"]["category_id"].is_array());
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_main_image_swap_is_exclusive() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();
    let category_id = create_category(&ctx, admin_id, suffix).await;

    let resp = ctx
        .admin_post("/admin/products", admin_id)
        .json(&json!({
            "name": "Camera Bag",
            "slug": format!("camera-bag-{suffix}"),
            "price": "49.00",
            "stock": 10,
            "description": "Padded camera bag.",
            "category_id": category_id,
            "is_active": true
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    let product_id = body["data"]["id"].as_i64().unwrap();

    // One main image, two gallery images
    for (n, is_main) in [(1, true), (2, false), (3, false)] {
        let resp = ctx
            .admin_post(&format!("/admin/products/{product_id}/images"), admin_id)
            .json(&json!({
                "image": format!("https://img.example/bag-{n}.jpg"),
                "is_main": is_main
            }))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let images = product_images(&ctx, admin_id, product_id).await;
    assert_eq!(images.len(), 3);
    let mains: Vec<_> = images
        .iter()
        .filter(|i| i["is_main"] == json!(true))
        .collect();
    assert_eq!(mains.len(), 1);
    let old_main = mains.first().unwrap()["id"].as_i64().unwrap();

    // Promote a gallery image: exactly one main afterwards, and it's the new one
    let new_main = images
        .iter()
        .find(|i| i["is_main"] == json!(false))
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let resp = ctx
        .admin_patch(
            &format!("/admin/products/{product_id}/images/{new_main}/main"),
            admin_id,
        )
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let images = product_images(&ctx, admin_id, product_id).await;
    let mains: Vec<i64> = images
        .iter()
        .filter(|i| i["is_main"] == json!(true))
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(mains, vec![new_main]);
    assert_ne!(old_main, new_main);
}
