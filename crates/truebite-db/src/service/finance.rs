//! # Finance Service
//!
//! The wallet surface exposed to the routing layer: wallet creation and
//! lookup, deposits, refunds, and the transaction history. Order payments
//! go through the order workflow, never through this service.
//!
//! Refunds are deliberately decoupled from order status: crediting money
//! back does not cancel or otherwise transition the order. That is a
//! caller decision.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::wallet::WalletRepository;
use truebite_core::{LedgerEntry, LedgerEntryKind, Money, Wallet, DEFAULT_HISTORY_LIMIT};

/// The wallet finance service.
#[derive(Debug, Clone)]
pub struct FinanceService {
    pool: SqlitePool,
}

impl FinanceService {
    /// Creates a new FinanceService.
    pub fn new(pool: SqlitePool) -> Self {
        FinanceService { pool }
    }

    fn wallets(&self) -> WalletRepository {
        WalletRepository::new(self.pool.clone())
    }

    /// Creates a zero-balance wallet for a customer (at account creation).
    pub async fn create_wallet(&self, customer_id: &str) -> DbResult<Wallet> {
        self.wallets().create(customer_id).await
    }

    /// Gets a customer's wallet.
    pub async fn get_wallet(&self, customer_id: &str) -> DbResult<Wallet> {
        self.wallets()
            .get_by_customer(customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Wallet", customer_id))
    }

    /// Adds funds to a customer's wallet.
    ///
    /// Returns the updated wallet and the deposit ledger entry.
    pub async fn deposit(
        &self,
        customer_id: &str,
        amount: Money,
    ) -> DbResult<(Wallet, LedgerEntry)> {
        debug!(customer_id = %customer_id, amount = %amount, "deposit");

        let mut tx = self.pool.begin().await?;

        let wallet = WalletRepository::get_by_customer_tx(&mut tx, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Wallet", customer_id))?;

        let entry = WalletRepository::credit(
            &mut tx,
            &wallet.id,
            amount,
            LedgerEntryKind::Deposit,
            None,
            "Deposit",
        )
        .await?;

        tx.commit().await?;

        info!(customer_id = %customer_id, amount = %amount, "Funds deposited");

        let wallet = self.get_wallet(customer_id).await?;
        Ok((wallet, entry))
    }

    /// Refunds money to a customer's wallet for an order.
    ///
    /// The order must exist; its status is left untouched.
    pub async fn refund(
        &self,
        customer_id: &str,
        order_id: &str,
        amount: Money,
    ) -> DbResult<(Wallet, LedgerEntry)> {
        debug!(customer_id = %customer_id, order_id = %order_id, amount = %amount, "refund");

        let mut tx = self.pool.begin().await?;

        let order_exists: Option<String> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order_exists.is_none() {
            return Err(DbError::not_found("Order", order_id));
        }

        let wallet = WalletRepository::get_by_customer_tx(&mut tx, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Wallet", customer_id))?;

        let entry = WalletRepository::credit(
            &mut tx,
            &wallet.id,
            amount,
            LedgerEntryKind::Refund,
            Some(order_id),
            "Refund",
        )
        .await?;

        tx.commit().await?;

        info!(customer_id = %customer_id, order_id = %order_id, amount = %amount, "Refund issued");

        let wallet = self.get_wallet(customer_id).await?;
        Ok((wallet, entry))
    }

    /// Lists a customer's ledger entries, newest first.
    ///
    /// A non-positive `limit` falls back to [`DEFAULT_HISTORY_LIMIT`].
    pub async fn list_transactions(
        &self,
        customer_id: &str,
        limit: i64,
    ) -> DbResult<Vec<LedgerEntry>> {
        let limit = if limit > 0 { limit } else { DEFAULT_HISTORY_LIMIT };
        let wallet = self.get_wallet(customer_id).await?;
        self.wallets().list_entries(&wallet.id, limit).await
    }
}

// =============================================================================
// Tests
// =============================================================================
