//! # Money Module
//!
//! Monetary values as integer cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A wallet that drifts by a cent per order is a wallet nobody trusts.   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every balance, price, discount and fee is an i64 cent count.        │
//! │    Percentage math rounds half-up, explicitly, in one place.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: ledger entries carry negative amounts for payments
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use truebite_core::money::Money;
    ///
    /// let price = Money::from_cents(1050); // $10.50
    /// assert_eq!(price.cents(), 1050);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// Saturation instead of wrapping: an absurd line can only inflate a
    /// total (and fail the sufficiency check), never shrink it.
    ///
    /// ## Example
    /// ```rust
    /// use truebite_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000); // $10.00
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 2000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns a percentage share of this amount, in basis points,
    /// rounded half-up to whole cents.
    ///
    /// ## Why Basis Points?
    /// 1 bps = 0.01%, so 500 bps = 5%. Integer math with a +5000 rounding
    /// term gives round-half-up without ever touching floats. i128 keeps
    /// the intermediate product from overflowing on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use truebite_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(4000); // $40.00
    /// let discount = subtotal.percentage(500); // 5% = $2.00
    /// assert_eq!(discount.cents(), 200);
    ///
    /// // $10.50 × 5% = $0.525 → rounds up to $0.53
    /// assert_eq!(Money::from_cents(1050).percentage(500).cents(), 53);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let share = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(share as i64)
    }
}

/// Display implementation for logging and debugging.
/// The frontend formats for display; this is not localized.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// All arithmetic saturates at the i64 bounds. A Money value never wraps:
// overflow pushes a total toward the extreme, where sufficiency checks
// reject it, instead of wrapping into a small undercharge.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1050);
        assert_eq!(money.cents(), 1050);
        assert!(money.is_positive());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "$10.50");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-2500)), "-$25.00");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(2000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 2500);
        assert_eq!((a - b).cents(), 1500);
        assert_eq!((b * 4).cents(), 2000);
        assert_eq!(b.multiply_quantity(3).cents(), 1500);
    }

    #[test]
    fn test_percentage_exact() {
        // $40.00 × 5% = $2.00, no rounding needed
        let subtotal = Money::from_cents(4000);
        assert_eq!(subtotal.percentage(500).cents(), 200);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // $10.50 × 5% = $0.525 → $0.53
        assert_eq!(Money::from_cents(1050).percentage(500).cents(), 53);
        // $10.30 × 5% = $0.515 → $0.52
        assert_eq!(Money::from_cents(1030).percentage(500).cents(), 52);
        // $10.20 × 5% = $0.51, exact
        assert_eq!(Money::from_cents(1020).percentage(500).cents(), 51);
    }

    #[test]
    fn test_percentage_of_zero() {
        assert_eq!(Money::zero().percentage(500).cents(), 0);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_wrapping() {
        // A runaway quantity saturates to i64::MAX; it never wraps into a
        // small positive value that would undercharge a wallet.
        let price = Money::from_cents(1000);
        assert_eq!(price.multiply_quantity(i64::MAX).cents(), i64::MAX);
        assert_eq!((price * i64::MAX).cents(), i64::MAX);
        assert_eq!(
            (Money::from_cents(i64::MAX) + Money::from_cents(500)).cents(),
            i64::MAX
        );
        assert_eq!(
            (Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(),
            i64::MIN
        );
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-250).abs().cents(), 250);
    }
}
