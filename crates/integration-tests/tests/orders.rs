//! Integration tests for the derived order total.
//!
//! These drive the repositories directly against the database; no server is
//! required, only `ADMIN_DATABASE_URL`.
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rust_decimal::Decimal;

use atelier_admin::db::{CartRepository, OrderRepository};
use atelier_core::{Price, ProductId};
use atelier_integration_tests::TestContext;

/// Any product id from the demo seed.
async fn any_product_id(ctx: &TestContext) -> ProductId {
    let id = sqlx::query_scalar::<_, i32>("SELECT id FROM products ORDER BY id LIMIT 1")
        .fetch_one(&ctx.pool)
        .await
        .expect("demo products must be seeded");
    ProductId::new(id)
}

#[tokio::test]
#[ignore = "Requires database with migrations and demo seed applied"]
async fn test_total_tracks_item_changes_exactly() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_verified_user("buyer", "user").await;
    let product_id = any_product_id(&ctx).await;

    let repo = OrderRepository::new(&ctx.pool);
    let order = repo
        .create(atelier_core::UserId::new(user_id))
        .await
        .expect("create order");
    assert_eq!(order.total_price, Decimal::ZERO);

    // 2 x 10.50 + 1 x 3.25 = 24.25
    let first = repo
        .add_item(order.id, product_id, 2, Price::new(Decimal::new(1050, 2)).unwrap())
        .await
        .expect("add first item");
    repo.add_item(order.id, product_id, 1, Price::new(Decimal::new(325, 2)).unwrap())
        .await
        .expect("add second item");

    let loaded = repo
        .get_with_items(order.id)
        .await
        .expect("load order")
        .expect("order exists");
    assert_eq!(loaded.order.total_price, Decimal::new(2425, 2));
    assert_eq!(loaded.items.len(), 2);

    // Removing an item recomputes the total in the same transaction
    repo.remove_item(order.id, first.id)
        .await
        .expect("remove item");

    let loaded = repo
        .get_with_items(order.id)
        .await
        .expect("load order")
        .expect("order exists");
    assert_eq!(loaded.order.total_price, Decimal::new(325, 2));
    assert_eq!(loaded.items.len(), 1);
}

#[tokio::test]
#[ignore = "Requires database with migrations and demo seed applied"]
async fn test_cart_lines_round_trip() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_verified_user("shopper", "user").await;
    let product_id = any_product_id(&ctx).await;

    let repo = CartRepository::new(&ctx.pool);
    let user = atelier_core::UserId::new(user_id);

    let line = repo.add(user, product_id, 2).await.expect("add to cart");

    let lines = repo.list_for_user(user).await.expect("list cart");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().unwrap().quantity, 2);

    repo.remove(line.id).await.expect("remove line");
    assert!(repo.list_for_user(user).await.expect("list cart").is_empty());
}
