//! Order repository for database operations.
//!
//! `orders.total_price` is derived from the order's items. Every item
//! mutation recomputes the total inside the same transaction, so the stored
//! total can never drift from the line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use atelier_core::{OrderId, OrderItemId, Price, ProductId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{Order, OrderItem, OrderWithItems};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty order for a user. The total starts at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user_id: UserId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, total_price)
            VALUES ($1, 0)
            RETURNING id, user_id, total_price, created_at
            ",
        )
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "user does not exist"))?;

        Ok(row.into())
    }

    /// Add a line item, capturing the price at time of purchase, and
    /// recompute the order total in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order or product is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        price: Price,
    ) -> Result<OrderItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderItemRow>(
            r"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, price
            ",
        )
        .bind(order_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .bind(price.amount())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, "order or product does not exist"))?;

        recompute_total(&mut tx, order_id).await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Remove a line item and recompute the order total in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist on the
    /// order.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove_item(
        &self,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            DELETE FROM order_items
            WHERE id = $1 AND order_id = $2
            ",
        )
        .bind(item_id.as_i32())
        .bind(order_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        recompute_total(&mut tx, order_id).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_price, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, quantity, price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order: row.into(),
            items: items
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
        }))
    }
}

/// Recompute an order's derived total within an open transaction.
async fn recompute_total(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: OrderId,
) -> Result<(), RepositoryError> {
    let conn: &mut PgConnection = &mut *tx;

    sqlx::query(
        r"
        UPDATE orders
        SET total_price = (
            SELECT COALESCE(SUM(price * quantity), 0)
            FROM order_items
            WHERE order_id = $1
        )
        WHERE id = $1
        ",
    )
    .bind(order_id.as_i32())
    .execute(conn)
    .await?;

    Ok(())
}
