//! Integration tests for admin user management.
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use atelier_integration_tests::TestContext;

async fn user_roles(ctx: &TestContext, admin_id: i32, user_id: i64) -> Vec<String> {
    let resp = ctx
        .admin_get("/admin/users", admin_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid json");
    body.as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"].as_i64() == Some(user_id))
        .map(|u| {
            u["roles"]
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r.as_str().unwrap().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_role_assignment_is_full_replace() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let email = TestContext::unique_email("member");

    // Create with role "user"
    let resp = ctx
        .admin_post("/admin/users", admin_id)
        .json(&json!({
            "name": "Member",
            "email": email,
            "password": "secret1",
            "role": "user"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    let user_id = body["data"]["id"].as_i64().unwrap();

    assert_eq!(
        user_roles(&ctx, admin_id, user_id).await,
        vec!["user".to_owned()]
    );

    // Update to role "admin": the prior role is revoked, not merged
    let resp = ctx
        .admin_patch(&format!("/admin/users/{user_id}"), admin_id)
        .json(&json!({
            "name": "Member",
            "email": email,
            "role": "admin"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(
        user_roles(&ctx, admin_id, user_id).await,
        vec!["admin".to_owned()]
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_empty_password_keeps_stored_digest() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let email = TestContext::unique_email("digest");

    let resp = ctx
        .admin_post("/admin/users", admin_id)
        .json(&json!({
            "name": "Digest Keeper",
            "email": email,
            "password": "secret1",
            "role": "user"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    let user_id = body["data"]["id"].as_i64().unwrap();

    let digest_before = ctx.password_digest(i32::try_from(user_id).unwrap()).await;

    // Empty password on update
    let resp = ctx
        .admin_patch(&format!("/admin/users/{user_id}"), admin_id)
        .json(&json!({
            "name": "Digest Keeper",
            "email": email,
            "password": "",
            "role": "user"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let digest_after = ctx.password_digest(i32::try_from(user_id).unwrap()).await;
    assert_eq!(digest_before, digest_after);

    // A real password replaces the digest
    let resp = ctx
        .admin_patch(&format!("/admin/users/{user_id}"), admin_id)
        .json(&json!({
            "name": "Digest Keeper",
            "email": email,
            "password": "new-secret",
            "role": "user"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let digest_replaced = ctx.password_digest(i32::try_from(user_id).unwrap()).await;
    assert_ne!(digest_before, digest_replaced);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_password_is_never_serialized() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;

    let resp = ctx
        .admin_get("/admin/users", admin_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let raw = resp.text().await.expect("response body");
    assert!(!raw.contains("password"));
    assert!(!raw.contains("$argon2"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_invalid_role_is_rejected() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;

    let resp = ctx
        .admin_post("/admin/users", admin_id)
        .json(&json!({
            "name": "Bad Role",
            "email": TestContext::unique_email("bad-role"),
            "password": "secret1",
            "role": "superuser"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["errors"]["role"].is_array());
}
