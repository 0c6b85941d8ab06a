//! # Dish Repository
//!
//! Catalog lookup. The order workflow only reads price, availability and
//! the VIP-exclusivity flag; writes exist for seeding and administration.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use truebite_core::Dish;

const SELECT_COLUMNS: &str = "id, chef_id, name, price_cents, is_available, \
                              is_vip_only, created_at";

/// Repository for dish catalog operations.
#[derive(Debug, Clone)]
pub struct DishRepository {
    pool: SqlitePool,
}

impl DishRepository {
    /// Creates a new DishRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DishRepository { pool }
    }

    /// Gets a dish by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Dish>> {
        let dish = sqlx::query_as::<_, Dish>(&format!(
            "SELECT {SELECT_COLUMNS} FROM dishes WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dish)
    }

    /// Inserts a dish.
    pub async fn insert(&self, dish: &Dish) -> DbResult<()> {
        debug!(id = %dish.id, name = %dish.name, "Inserting dish");

        sqlx::query(
            r#"
            INSERT INTO dishes (
                id, chef_id, name, price_cents,
                is_available, is_vip_only, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&dish.id)
        .bind(&dish.chef_id)
        .bind(&dish.name)
        .bind(dish.price_cents)
        .bind(dish.is_available)
        .bind(dish.is_vip_only)
        .bind(dish.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the menu price of a dish. Existing orders keep their
    /// snapshot prices untouched.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE dishes SET price_cents = ?2 WHERE id = ?1")
            .bind(id)
            .bind(price_cents)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Dish", id));
        }

        Ok(())
    }

    /// Gets a dish within an open transaction.
    pub async fn get_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Dish>> {
        let dish = sqlx::query_as::<_, Dish>(&format!(
            "SELECT {SELECT_COLUMNS} FROM dishes WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(dish)
    }
}
