//! # Error Types
//!
//! Domain-specific error types for truebite-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  truebite-core errors (this file)                                      │
//! │  └── CoreError   - cart validation, policy and pricing failures        │
//! │                                                                         │
//! │  truebite-db errors (separate crate)                                   │
//! │  └── DbError     - storage failures, not-found, wraps CoreError        │
//! │                                                                         │
//! │  Flow: CoreError → DbError → routing layer → client                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (dish id, amounts, statuses)
//! 3. Errors are enum variants, never String
//! 4. Policy rejections (blacklist, insufficient funds) are never retried

use thiserror::Error;

use crate::types::OrderStatus;

/// Business rule violations and validation failures.
///
/// Three caller-facing categories share this enum:
/// - validation errors: the caller can fix the request and resubmit
/// - policy errors: business-rule rejections, surfaced verbatim
/// - state errors: the order is not in a state that allows the operation
#[derive(Debug, Error)]
pub enum CoreError {
    /// The submitted cart has zero lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line requested a non-positive quantity.
    #[error("Invalid quantity {quantity} for dish {dish_id}")]
    InvalidQuantity { dish_id: String, quantity: i64 },

    /// A cart line referenced a dish that does not exist.
    #[error("Dish not found: {0}")]
    DishNotFound(String),

    /// The dish exists but is currently not orderable.
    #[error("Dish '{name}' is not available")]
    DishUnavailable { name: String },

    /// The dish is VIP-exclusive and the customer is not VIP.
    #[error("Dish '{name}' is VIP-only")]
    VipOnlyDish { name: String },

    /// The requested status name is not part of the delivery lifecycle.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// The order is in a terminal state and cannot transition further.
    #[error("Order is {from}, cannot transition to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A deposit, refund or payment amount was zero or negative.
    #[error("Amount must be positive, got {amount_cents} cents")]
    InvalidAmount { amount_cents: i64 },

    /// The customer account is restricted and may not place orders.
    #[error("Customer account is restricted: {0}")]
    CustomerBlacklisted(String),

    /// The wallet balance does not cover the requested debit.
    ///
    /// ## When This Occurs
    /// - Order total exceeds the wallet balance at authorization time
    /// - A concurrent debit on the same wallet won the conditional update
    #[error("Insufficient funds: balance {balance_cents} cents, required {required_cents} cents")]
    InsufficientFunds {
        balance_cents: i64,
        required_cents: i64,
    },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
