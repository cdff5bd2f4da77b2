//! # Money
//!
//! Amounts are whole centavos in an `i64`. Refund bookkeeping compares sums
//! for exact equality (`Σ refunds == total` flips a sale to refunded), which
//! floating point cannot promise:
//!
//! ```text
//! f64:  200.10 + 299.90  →  499.99999999999994   never "refunded"
//! i64:  20010  + 29990   →  50000                refunded
//! ```
//!
//! ```rust
//! use kahera_core::money::Money;
//!
//! let kape = Money::from_cents(12_550);
//! let line = kape.multiply_quantity(4);
//! assert_eq!(line.cents(), 50_200);
//! assert_eq!(line.to_string(), "502.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

/// Centavos. Serialized as a bare integer (`50000`, not `"500.00"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole pesos, no centavos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Line amount for `qty` units at this unit price.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`Money::multiply_quantity`], but `None` instead of overflowing.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// `self - other`, never below zero. Remaining refundable balances and
    /// change due are both floored this way.
    #[inline]
    pub fn saturating_sub_to_zero(&self, other: Money) -> Self {
        Money((self.0 - other.0).max(0))
    }
}

/// `1234.50`, for logs and error messages. No currency symbol: the code is
/// tenant configuration (`SalesReport::currency`), not part of the amount.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_pesos(500).to_string(), "500.00");
        assert_eq!(Money::from_cents(505).to_string(), "5.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_split_refunds_sum_exactly() {
        let first = Money::from_cents(20_010);
        let second = Money::from_cents(29_990);
        assert_eq!(first + second, Money::from_pesos(500));
        assert_eq!(second - first, Money::from_cents(9_980));

        let total: Money = [first, second, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), 50_001);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            Money::from_cents(299).checked_multiply_quantity(3),
            Some(Money::from_cents(897))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_saturating_sub_to_zero() {
        let total = Money::from_cents(500);
        assert_eq!(total.saturating_sub_to_zero(Money::from_cents(200)).cents(), 300);
        assert!(total.saturating_sub_to_zero(Money::from_cents(900)).is_zero());
    }

    #[test]
    fn test_wire_format_is_an_integer() {
        assert_eq!(serde_json::to_string(&Money::from_cents(50_000)).unwrap(), "50000");
        let back: Money = serde_json::from_str("1250").unwrap();
        assert_eq!(back.cents(), 1250);
    }
}
