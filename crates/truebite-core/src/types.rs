//! # Domain Types
//!
//! Core domain types for the order-placement workflow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Order      │   │     Wallet      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  is_vip         │   │  status         │   │  balance_cents  │       │
//! │  │  is_blacklisted │   │  subtotal/total │   │  (≥ 0 always)   │       │
//! │  │  order_count    │   │  items[]        │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Dish       │   │   OrderItem     │   │  LedgerEntry    │       │
//! │  │  price_cents    │   │  price snapshot │   │  signed amount, │       │
//! │  │  is_vip_only    │   │  quantity       │   │  immutable      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities are plain data. Invariant-enforcing logic (sufficiency checks,
//! signed-amount rules, transition validation) lives in the wallet ledger
//! and order workflow, not on the records themselves.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer profile. Read-only to the order workflow, except for the
/// order_count / total_spent counters which are bumped inside the order
/// creation transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// VIP tier: discounts, exclusive dishes, loyalty fee waivers.
    pub is_vip: bool,

    /// Restricted accounts may not place orders.
    pub is_blacklisted: bool,

    /// Number of completed orders, counted before the current one.
    pub order_count: i64,

    /// Cumulative spend in cents across all orders.
    pub total_spent_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Dish
// =============================================================================

/// A catalog dish. The workflow only consumes a read-only lookup:
/// price, availability, and the VIP-exclusivity flag.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Dish {
    pub id: String,

    /// Chef who owns this dish, if any.
    pub chef_id: Option<String>,

    pub name: String,

    /// Current menu price in cents. Orders snapshot this value; later
    /// price changes never touch existing orders.
    pub price_cents: i64,

    pub is_available: bool,

    pub is_vip_only: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Dish {
    /// Returns the current menu price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Wallet
// =============================================================================

/// A prepaid wallet, one per customer.
///
/// ## Invariants
/// - balance is never negative
/// - balance equals the sum of all signed ledger entries for this wallet
/// - mutated only through the wallet ledger, never directly
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Wallet {
    pub id: String,

    pub customer_id: String,

    pub balance_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Returns the live balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// The kind of balance change a ledger entry documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LedgerEntryKind {
    /// Funds added to the wallet.
    Deposit,
    /// Order payment, debited from the wallet.
    Payment,
    /// Money returned for an order.
    Refund,
}

impl LedgerEntryKind {
    /// Whether entries of this kind carry a positive signed amount.
    /// Payments are negative; deposits and refunds positive.
    #[inline]
    pub const fn is_credit(&self) -> bool {
        matches!(self, LedgerEntryKind::Deposit | LedgerEntryKind::Refund)
    }
}

/// An immutable record of one balance-changing event.
///
/// Once written, a ledger entry is never mutated or deleted. Replaying a
/// wallet's entries in creation order reconstructs its balance history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,

    pub wallet_id: String,

    /// The order this entry pays for or refunds, if any.
    pub order_id: Option<String>,

    /// Signed amount in cents. Sign matches kind: deposits and refunds
    /// positive, payments negative.
    pub amount_cents: i64,

    pub kind: LedgerEntryKind,

    pub description: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Delivery lifecycle of an order.
///
/// ```text
/// CREATED → IN_KITCHEN → READY_FOR_DELIVERY → ASSIGNED → OUT_FOR_DELIVERY → DELIVERED
///     └──────────┴──────────────┴───────────────┴──────────────┴──→ CANCELLED
/// ```
///
/// `DELIVERED` and `CANCELLED` are terminal; `CANCELLED` is reachable from
/// any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderStatus {
    Created,
    InKitchen,
    ReadyForDelivery,
    Assigned,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The canonical storage/wire name of this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::InKitchen => "IN_KITCHEN",
            OrderStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal statuses admit no further transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Created
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "IN_KITCHEN" => Ok(OrderStatus::InKitchen),
            "READY_FOR_DELIVERY" => Ok(OrderStatus::ReadyForDelivery),
            "ASSIGNED" => Ok(OrderStatus::Assigned),
            "OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// One purchase transaction, created atomically with its items and the
/// wallet debit that pays for it. Never deleted (financial record).
///
/// Invariant: `total = subtotal − discount + delivery_fee`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub chef_id: Option<String>,
    pub delivery_person_id: Option<String>,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub order_time: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub delivery_time: Option<DateTime<Utc>>,

    /// Line items in cart order. Loaded separately from the order row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Returns the charged total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One priced line of an order. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub dish_id: String,
    pub quantity: i64,

    /// Snapshot of the dish price at order creation. Never recomputed
    /// from the current catalog price.
    pub price_cents: i64,

    /// Position within the cart, preserving submission order.
    pub line_no: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Line total: snapshot price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line of a submitted cart, as received from the routing layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub dish_id: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Created,
            OrderStatus::InKitchen,
            OrderStatus::ReadyForDelivery,
            OrderStatus::Assigned,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = "BOGUS".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus(s) if s == "BOGUS"));

        // Case-sensitive: lifecycle names are canonical uppercase
        assert!("delivered".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Created.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());
    }

    #[test]
    fn test_ledger_kind_sign_rule() {
        assert!(LedgerEntryKind::Deposit.is_credit());
        assert!(LedgerEntryKind::Refund.is_credit());
        assert!(!LedgerEntryKind::Payment.is_credit());
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            dish_id: "d1".to_string(),
            quantity: 3,
            price_cents: 1050,
            line_no: 0,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().cents(), 3150);
    }
}
