//! Cart and order domain types.
//!
//! These entities are seed-only: there is no admin route surface for them,
//! but the repositories keep the derived order total consistent whenever
//! items change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use atelier_core::{CartItemId, OrderId, OrderItemId, Price, ProductId, UserId};

/// A line in a user's cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A placed order.
///
/// `total_price` is derived: the sum of item price x quantity, recomputed in
/// the same transaction as any item change.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A line item on an order, carrying the price at time of purchase.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Price,
}

/// An order together with its items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
