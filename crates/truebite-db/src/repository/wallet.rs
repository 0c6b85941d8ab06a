//! # Wallet Repository
//!
//! The wallet ledger: all balance mutation happens here, and every
//! mutation appends an immutable ledger entry in the same transaction.
//!
//! ## Conservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balance_cents == Σ ledger_entries.amount_cents   (per wallet, always) │
//! │                                                                         │
//! │  credit: +amount, kind deposit/refund                                  │
//! │  debit:  −amount, kind payment, guarded by a conditional UPDATE        │
//! │                                                                         │
//! │  The debit's sufficiency check and balance update are ONE statement:   │
//! │                                                                         │
//! │    UPDATE wallets SET balance_cents = balance_cents - ?1               │
//! │    WHERE id = ?3 AND balance_cents >= ?1                               │
//! │                                                                         │
//! │  Zero rows affected means another debit won, or funds are short.      │
//! │  Two concurrent debits can never both pass the check.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The live balance is denormalized for fast reads; replaying a wallet's
//! entries in creation order must always reconstruct it.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use truebite_core::{CoreError, LedgerEntry, LedgerEntryKind, Money, Wallet};

const WALLET_COLUMNS: &str = "id, customer_id, balance_cents, created_at, updated_at";
const ENTRY_COLUMNS: &str = "id, wallet_id, order_id, amount_cents, kind, description, created_at";

/// Repository for wallet balances and ledger entries.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    pool: SqlitePool,
}

impl WalletRepository {
    /// Creates a new WalletRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WalletRepository { pool }
    }

    /// Gets the wallet owned by a customer.
    pub async fn get_by_customer(&self, customer_id: &str) -> DbResult<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE customer_id = ?1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(wallet)
    }

    /// Creates a zero-balance wallet for a customer. The UNIQUE constraint
    /// on customer_id rejects a second wallet for the same owner.
    pub async fn create(&self, customer_id: &str) -> DbResult<Wallet> {
        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            balance_cents: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(wallet_id = %wallet.id, customer_id = %customer_id, "Creating wallet");

        sqlx::query(
            r#"
            INSERT INTO wallets (id, customer_id, balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&wallet.id)
        .bind(&wallet.customer_id)
        .bind(wallet.balance_cents)
        .bind(wallet.created_at)
        .bind(wallet.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(wallet)
    }

    /// Lists a wallet's ledger entries, newest first.
    pub async fn list_entries(&self, wallet_id: &str, limit: i64) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries \
             WHERE wallet_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(wallet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Gets a wallet within an open transaction.
    pub async fn get_by_customer_tx(
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> DbResult<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE customer_id = ?1"
        ))
        .bind(customer_id)
        .fetch_optional(conn)
        .await?;

        Ok(wallet)
    }

    /// Credits a wallet and appends the documenting ledger entry.
    ///
    /// Used for deposits and refunds; `kind` must be a credit kind.
    /// Fails with `InvalidAmount` if the amount is not positive.
    pub async fn credit(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        amount: Money,
        kind: LedgerEntryKind,
        order_id: Option<&str>,
        description: &str,
    ) -> DbResult<LedgerEntry> {
        debug_assert!(kind.is_credit());

        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                amount_cents: amount.cents(),
            }
            .into());
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE wallets SET
                balance_cents = balance_cents + ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(amount.cents())
        .bind(now)
        .bind(wallet_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Wallet", wallet_id));
        }

        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            wallet_id: wallet_id.to_string(),
            order_id: order_id.map(str::to_string),
            amount_cents: amount.cents(),
            kind,
            description: description.to_string(),
            created_at: now,
        };
        insert_entry(conn, &entry).await?;

        debug!(wallet_id = %wallet_id, amount = %amount, kind = ?kind, "Wallet credited");

        Ok(entry)
    }

    /// Debits a wallet for an order payment and appends the ledger entry
    /// (kind payment, negative signed amount).
    ///
    /// The sufficiency check and the balance update are a single
    /// conditional UPDATE, so concurrent debits against the same wallet
    /// serialize at the storage layer; zero rows affected means the
    /// balance no longer covers the amount.
    pub async fn debit(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        amount: Money,
        order_id: Option<&str>,
        description: &str,
    ) -> DbResult<LedgerEntry> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                amount_cents: amount.cents(),
            }
            .into());
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE wallets SET
                balance_cents = balance_cents - ?1,
                updated_at = ?2
            WHERE id = ?3 AND balance_cents >= ?1
            "#,
        )
        .bind(amount.cents())
        .bind(now)
        .bind(wallet_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            // Either the wallet is gone or the balance is short.
            let balance: Option<i64> =
                sqlx::query_scalar("SELECT balance_cents FROM wallets WHERE id = ?1")
                    .bind(wallet_id)
                    .fetch_optional(&mut *conn)
                    .await?;

            return match balance {
                None => Err(DbError::not_found("Wallet", wallet_id)),
                Some(balance_cents) => Err(CoreError::InsufficientFunds {
                    balance_cents,
                    required_cents: amount.cents(),
                }
                .into()),
            };
        }

        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            wallet_id: wallet_id.to_string(),
            order_id: order_id.map(str::to_string),
            amount_cents: -amount.cents(),
            kind: LedgerEntryKind::Payment,
            description: description.to_string(),
            created_at: now,
        };
        insert_entry(conn, &entry).await?;

        debug!(wallet_id = %wallet_id, amount = %amount, "Wallet debited");

        Ok(entry)
    }
}

/// Appends one immutable ledger entry. Entries are never updated or
/// deleted after this insert.
async fn insert_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, wallet_id, order_id, amount_cents, kind, description, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.wallet_id)
    .bind(&entry.order_id)
    .bind(entry.amount_cents)
    .bind(entry.kind)
    .bind(&entry.description)
    .bind(entry.created_at)
    .execute(conn)
    .await?;

    Ok(())
}
