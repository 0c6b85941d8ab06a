//! # Order Repository
//!
//! Database operations for orders and their items.
//!
//! Order rows and items are only ever written inside the order creation
//! transaction (see the order service); after that, the single mutable
//! field is `status`, changed through [`OrderRepository::transition_status`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use truebite_core::{CoreError, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_id, chef_id, delivery_person_id, status, \
                             subtotal_cents, discount_cents, delivery_fee_cents, \
                             total_cents, order_time, delivery_time";
const ITEM_COLUMNS: &str = "id, order_id, dish_id, quantity, price_cents, line_no, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its items (in cart order).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.items = self.get_items(id).await?;
        Ok(Some(order))
    }

    /// Gets all items for an order, in cart order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY line_no"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a customer's orders, newest first, items included.
    pub async fn list_for_customer(&self, customer_id: &str, limit: i64) -> DbResult<Vec<Order>> {
        let mut orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_id = ?1 ORDER BY order_time DESC LIMIT ?2"
        ))
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        for order in &mut orders {
            order.items = self.get_items(&order.id).await?;
        }

        Ok(orders)
    }

    /// Counts all order rows. Used by tests asserting atomicity.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Moves an order to a new lifecycle status.
    ///
    /// One conditional UPDATE guards against racing transitions: the row
    /// only changes if it is still in a non-terminal state, so a concurrent
    /// transition is never silently overwritten after the fact (last writer
    /// wins, but never past DELIVERED or CANCELLED). Reaching DELIVERED
    /// stamps the delivery time.
    pub async fn transition_status(&self, order_id: &str, status: OrderStatus) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                delivery_time = CASE WHEN ?2 = 'DELIVERED' THEN ?3 ELSE delivery_time END
            WHERE id = ?1 AND status NOT IN ('DELIVERED', 'CANCELLED')
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Missing order or terminal state; look to tell which.
            let current: Option<OrderStatus> =
                sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                    .bind(order_id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match current {
                None => Err(DbError::not_found("Order", order_id)),
                Some(from) => Err(CoreError::InvalidTransition { from, to: status }.into()),
            };
        }

        debug!(order_id = %order_id, status = %status, "Order status updated");

        Ok(())
    }

    /// Inserts an order row inside the creation transaction.
    pub async fn insert_tx(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = order.total_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, chef_id, delivery_person_id, status,
                subtotal_cents, discount_cents, delivery_fee_cents, total_cents,
                order_time, delivery_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(&order.chef_id)
        .bind(&order.delivery_person_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.delivery_fee_cents)
        .bind(order.total_cents)
        .bind(order.order_time)
        .bind(order.delivery_time)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one order item inside the creation transaction.
    ///
    /// ## Snapshot Pattern
    /// The dish price is copied onto the item. Catalog price changes must
    /// never retroactively reprice an existing order.
    pub async fn insert_item_tx(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, dish_id, quantity, price_cents, line_no, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.dish_id)
        .bind(item.quantity)
        .bind(item.price_cents)
        .bind(item.line_no)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
