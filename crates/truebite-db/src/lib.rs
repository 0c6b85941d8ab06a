//! # truebite-db: Persistence and Transactional Workflows for TrueBite
//!
//! This crate provides database access for the TrueBite ordering platform.
//! It uses SQLite for storage with sqlx for async operations, and hosts the
//! two transactional services the routing layer talks to.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       TrueBite Data Flow                                │
//! │                                                                         │
//! │  Routing layer (CreateOrder, Deposit, ...)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   truebite-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌────────────────┐  │   │
//! │  │   │   Database   │   │    Services    │   │  Repositories  │  │   │
//! │  │   │   (pool.rs)  │   │ OrderService   │   │ wallet, order, │  │   │
//! │  │   │              │◄──│ FinanceService │◄──│ customer, dish │  │   │
//! │  │   └──────────────┘   └────────────────┘   └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) - customers, dishes, wallets, ledger_entries,            │
//! │                 orders, order_items                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Row-level operations (wallet ledger, orders, catalog)
//! - [`service`] - Transactional workflows (order creation, deposits, refunds)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use truebite_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/truebite.db")).await?;
//!
//! let order = db.order_service().create_order(&customer_id, &cart).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::dish::DishRepository;
pub use repository::order::OrderRepository;
pub use repository::wallet::WalletRepository;
pub use service::finance::FinanceService;
pub use service::order::OrderService;
