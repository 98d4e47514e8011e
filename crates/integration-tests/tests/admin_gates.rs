//! Integration tests for the permission gate chain.
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use atelier_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_gate_denial_is_idempotent_until_granted() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();

    // A role with no permissions, held by a fresh user
    let resp = ctx
        .admin_post("/admin/roles", admin_id)
        .json(&json!({"name": format!("trainee-{suffix}"), "permissions": []}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    let role_id = body["data"]["id"].as_i64().unwrap();

    // Assign via direct role sync on a new user: create with no role, then
    // put them in the trainee role through the user_roles sync
    let user_id = ctx.create_verified_user("trainee", "user").await;
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&ctx.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(i32::try_from(role_id).unwrap())
        .execute(&ctx.pool)
        .await
        .unwrap();

    // N identical calls, N identical denials
    for _ in 0..3 {
        let resp = ctx
            .admin_get("/admin/categories", user_id)
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    // Grant the permission mid-sequence
    let resp = ctx
        .admin_patch(&format!("/admin/roles/{role_id}"), admin_id)
        .json(&json!({"name": format!("trainee-{suffix}"), "permissions": ["categories.view"]}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // The very next call succeeds: the principal is loaded fresh per request
    let resp = ctx
        .admin_get("/admin/categories", user_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_unverified_user_is_forbidden() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;

    // A user with full permissions but no verified email
    let user_id = ctx.create_verified_user("unverified", "admin").await;
    sqlx::query("UPDATE users SET email_verified_at = NULL WHERE id = $1")
        .bind(user_id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let resp = ctx
        .admin_get("/admin/categories", user_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Sanity: a verified admin passes
    let resp = ctx
        .admin_get("/admin/categories", admin_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_unauthorized_mutation_has_no_side_effects() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_verified_user("plain", "user").await;

    let count_before = ctx.count_categories().await;

    // The gate runs before validation and persistence
    let resp = ctx
        .admin_post("/admin/categories", user_id)
        .json(&json!({"name": "Sneaky", "slug": "sneaky"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert_eq!(ctx.count_categories().await, count_before);
}
