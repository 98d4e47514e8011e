//! Integration tests for admin role management and permission sync.
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use atelier_integration_tests::TestContext;

async fn role_permissions(ctx: &TestContext, admin_id: i32, role_id: i64) -> Vec<String> {
    let resp = ctx
        .admin_get("/admin/roles", admin_id)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid json");
    body["roles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"].as_i64() == Some(role_id))
        .map(|r| {
            r["permissions"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p.as_str().unwrap().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_system_roles_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;

    let resp = ctx
        .admin_get("/admin/roles", admin_id)
        .send()
        .await
        .expect("request failed");
    let body: Value = resp.json().await.expect("invalid json");
    let roles = body["roles"].as_array().unwrap().clone();

    for system in ["admin", "user"] {
        let role = roles
            .iter()
            .find(|r| r["name"].as_str() == Some(system))
            .unwrap_or_else(|| panic!("seeded role {system} missing"));
        let id = role["id"].as_i64().unwrap();

        let resp = ctx
            .admin_delete(&format!("/admin/roles/{id}"), admin_id)
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // The role is still persisted
        let resp = ctx
            .admin_get("/admin/roles", admin_id)
            .send()
            .await
            .expect("request failed");
        let body: Value = resp.json().await.expect("invalid json");
        assert!(
            body["roles"]
                .as_array()
                .unwrap()
                .iter()
                .any(|r| r["name"].as_str() == Some(system)),
            "system role {system} must survive the delete attempt"
        );
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_permission_sync_is_full_replace() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();
    let name = format!("editor-{suffix}");

    // Create with one permission
    let resp = ctx
        .admin_post("/admin/roles", admin_id)
        .json(&json!({"name": name, "permissions": ["categories.view"]}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    let role_id = body["data"]["id"].as_i64().unwrap();

    assert_eq!(
        role_permissions(&ctx, admin_id, role_id).await,
        vec!["categories.view".to_owned()]
    );

    // Replace with a different set: no residual members, no missing ones
    let resp = ctx
        .admin_patch(&format!("/admin/roles/{role_id}"), admin_id)
        .json(&json!({"name": name, "permissions": ["products.view", "products.edit"]}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let mut permissions = role_permissions(&ctx, admin_id, role_id).await;
    permissions.sort();
    assert_eq!(permissions, vec!["products.edit", "products.view"]);

    // An empty list revokes everything
    let resp = ctx
        .admin_patch(&format!("/admin/roles/{role_id}"), admin_id)
        .json(&json!({"name": name, "permissions": []}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(role_permissions(&ctx, admin_id, role_id).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_omitted_permissions_leave_associations_untouched() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();

    let resp = ctx
        .admin_post("/admin/roles", admin_id)
        .json(&json!({"name": format!("keeper-{suffix}"), "permissions": ["categories.view"]}))
        .send()
        .await
        .expect("request failed");
    let body: Value = resp.json().await.expect("invalid json");
    let role_id = body["data"]["id"].as_i64().unwrap();

    // Rename without a permissions key
    let resp = ctx
        .admin_patch(&format!("/admin/roles/{role_id}"), admin_id)
        .json(&json!({"name": format!("keeper-renamed-{suffix}")}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(
        role_permissions(&ctx, admin_id, role_id).await,
        vec!["categories.view".to_owned()]
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_unknown_permission_is_a_validation_error() {
    let ctx = TestContext::new().await;
    let admin_id = ctx.create_verified_user("admin", "admin").await;
    let suffix: u32 = rand::random();

    let resp = ctx
        .admin_post("/admin/roles", admin_id)
        .json(&json!({"name": format!("bogus-{suffix}"), "permissions": ["widgets.fly"]}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["errors"]["permissions"].is_array());
}
