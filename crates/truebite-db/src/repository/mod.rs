//! # Repository Module
//!
//! Row-level database operations, one repository per aggregate.
//!
//! Pool-level reads are `&self` methods. Operations that must participate
//! in a larger transaction (the order creation unit, wallet mutations) are
//! associated functions taking `&mut SqliteConnection`, so the service
//! layer decides the transaction boundary and the repository never commits
//! on its own.
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - profiles and post-order counters
//! - [`dish::DishRepository`] - read-only catalog lookup (+ admin writes)
//! - [`wallet::WalletRepository`] - balances and the immutable ledger
//! - [`order::OrderRepository`] - orders, items, status transitions

pub mod customer;
pub mod dish;
pub mod order;
pub mod wallet;
