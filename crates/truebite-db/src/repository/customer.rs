//! # Customer Repository
//!
//! Profile lookups and the post-order counter update. The order workflow
//! reads the VIP flag, blacklist flag and order count, and bumps the
//! counters inside the same transaction that creates the order.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use truebite_core::Customer;

const SELECT_COLUMNS: &str = "id, name, is_vip, is_blacklisted, order_count, \
                              total_spent_cents, created_at";

/// Repository for customer profile operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a customer profile.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, is_vip, is_blacklisted,
                order_count, total_spent_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.is_vip)
        .bind(customer.is_blacklisted)
        .bind(customer.order_count)
        .bind(customer.total_spent_cents)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer within an open transaction.
    pub async fn get_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }

    /// Records a completed order against the profile: increments the order
    /// count and adds the charged total to cumulative spend. Runs inside
    /// the order creation transaction.
    pub async fn record_order(
        conn: &mut SqliteConnection,
        id: &str,
        spent_cents: i64,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE customers SET
                order_count = order_count + 1,
                total_spent_cents = total_spent_cents + ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(spent_cents)
        .execute(conn)
        .await?;

        Ok(())
    }
}
