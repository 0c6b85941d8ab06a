//! # Pricing Engine
//!
//! Pure computation of an order quote: subtotal, VIP discount, delivery
//! fee and total. No side effects, no I/O - identical inputs always yield
//! an identical quote.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal  = Σ (snapshot price × quantity)                              │
//! │  discount  = 5% of subtotal (round half-up)    if VIP, else $0          │
//! │  fee       = $5.00 flat                                                 │
//! │              waived if VIP AND count > 0 AND count % 3 == 0             │
//! │              (count = completed orders BEFORE this one)                 │
//! │  total     = subtotal − discount + fee                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The every-third-order fee waiver is VIP-gated. Whether it should apply
//! to all customers is a product decision; until it is made, only VIPs get
//! the waiver.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{BASE_DELIVERY_FEE_CENTS, FREE_DELIVERY_EVERY, VIP_DISCOUNT_BPS};

/// The priced breakdown of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub subtotal: Money,
    pub discount: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// Prices a cart of (snapshot price, quantity) pairs.
///
/// `prior_order_count` is the customer's completed-order count *before*
/// this order is recorded; the loyalty waiver keys off that value.
/// Quantities are validated upstream (≥ 1), so the subtotal is never
/// negative and the total never goes below zero by construction.
///
/// ## Example
/// ```rust
/// use truebite_core::money::Money;
/// use truebite_core::pricing::price_cart;
///
/// // Non-VIP: 2 × $10.00 + $5.00 fee
/// let quote = price_cart(&[(Money::from_cents(1000), 2)], false, 0);
/// assert_eq!(quote.total.cents(), 2500);
/// ```
pub fn price_cart(lines: &[(Money, i64)], is_vip: bool, prior_order_count: i64) -> Quote {
    let mut subtotal = Money::zero();
    for (price, quantity) in lines {
        subtotal += price.multiply_quantity(*quantity);
    }

    let discount = if is_vip {
        subtotal.percentage(VIP_DISCOUNT_BPS)
    } else {
        Money::zero()
    };

    let waived = is_vip && prior_order_count > 0 && prior_order_count % FREE_DELIVERY_EVERY == 0;
    let delivery_fee = if waived {
        Money::zero()
    } else {
        Money::from_cents(BASE_DELIVERY_FEE_CENTS)
    };

    Quote {
        subtotal,
        discount,
        delivery_fee,
        total: subtotal - discount + delivery_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    #[test]
    fn test_regular_customer_pays_full_fee() {
        // Scenario: 2 × $10.00, non-VIP
        let quote = price_cart(&[(cents(1000), 2)], false, 0);
        assert_eq!(quote.subtotal.cents(), 2000);
        assert_eq!(quote.discount.cents(), 0);
        assert_eq!(quote.delivery_fee.cents(), 500);
        assert_eq!(quote.total.cents(), 2500);
    }

    #[test]
    fn test_vip_third_order_waives_fee() {
        // Scenario: VIP with 2 prior orders placing their 3rd...
        let quote = price_cart(&[(cents(2000), 2)], true, 2);
        assert_eq!(quote.subtotal.cents(), 4000);
        assert_eq!(quote.discount.cents(), 200); // 5% of $40.00
        assert_eq!(quote.delivery_fee.cents(), 500); // count 2 pays the fee
        assert_eq!(quote.total.cents(), 4300);

        // ...and with 3 prior orders the fee is waived
        let quote = price_cart(&[(cents(2000), 2)], true, 3);
        assert_eq!(quote.discount.cents(), 200);
        assert_eq!(quote.delivery_fee.cents(), 0);
        assert_eq!(quote.total.cents(), 3800);
    }

    #[test]
    fn test_waiver_is_vip_gated() {
        // A non-VIP on their "third" order still pays the fee
        let quote = price_cart(&[(cents(2000), 2)], false, 3);
        assert_eq!(quote.delivery_fee.cents(), 500);
        assert_eq!(quote.discount.cents(), 0);
    }

    #[test]
    fn test_vip_first_order_pays_fee() {
        // count 0 is a VIP's first order: 0 % 3 == 0, but no waiver yet
        let quote = price_cart(&[(cents(1000), 1)], true, 0);
        assert_eq!(quote.delivery_fee.cents(), 500);
    }

    #[test]
    fn test_discount_rounds_half_up() {
        // $10.50 subtotal: 5% = $0.525 → $0.53
        let quote = price_cart(&[(cents(1050), 1)], true, 1);
        assert_eq!(quote.discount.cents(), 53);
        assert_eq!(quote.total.cents(), 1050 - 53 + 500);
    }

    #[test]
    fn test_empty_cart_prices_to_fee_only() {
        // The workflow rejects empty carts before pricing; the engine
        // itself still behaves sanely on no lines.
        let quote = price_cart(&[], false, 0);
        assert_eq!(quote.subtotal.cents(), 0);
        assert_eq!(quote.total.cents(), 500);
    }

    #[test]
    fn test_extreme_quantity_saturates_instead_of_wrapping() {
        // The workflow bounds quantities upstream; if an absurd line ever
        // reaches the engine anyway, the total saturates high. It can only
        // fail a sufficiency check, never wrap into an undercharge.
        let quote = price_cart(&[(cents(1000), i64::MAX)], false, 0);
        assert_eq!(quote.subtotal.cents(), i64::MAX);
        assert_eq!(quote.total.cents(), i64::MAX);
        assert!(quote.total.cents() > 0);
    }

    #[test]
    fn test_determinism() {
        let lines = [(cents(1299), 2), (cents(450), 1)];
        let a = price_cart(&lines, true, 6);
        let b = price_cart(&lines, true, 6);
        assert_eq!(a, b);
    }
}
