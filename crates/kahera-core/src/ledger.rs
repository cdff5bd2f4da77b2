//! # Ledger Rules
//!
//! Pure arithmetic behind sales and refunds.
//!
//! ## Refund Bookkeeping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Transaction total: PHP 500.00                                          │
//! │                                                                         │
//! │  refunded      status               remaining                          │
//! │  ────────────  ───────────────────  ─────────                          │
//! │  PHP   0.00    active               PHP 500.00                         │
//! │  PHP 200.00    partially_refunded   PHP 300.00                         │
//! │  PHP 500.00    refunded             PHP   0.00                         │
//! │                                                                         │
//! │  Σ refunds ≤ total, always. Status is never stored independently of    │
//! │  the refund rows: it is recomputed from them on every refund.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::TransactionStatus;

// =============================================================================
// Status Derivation
// =============================================================================

/// Derives a transaction's status from its total and the sum of its refunds.
///
/// ## Example
/// ```rust
/// use kahera_core::ledger::derive_status;
/// use kahera_core::{Money, TransactionStatus};
///
/// let total = Money::from_cents(50_000);
/// assert_eq!(derive_status(total, Money::from_cents(1)), TransactionStatus::PartiallyRefunded);
/// ```
pub fn derive_status(total: Money, refunded: Money) -> TransactionStatus {
    if !refunded.is_positive() {
        TransactionStatus::Active
    } else if refunded >= total {
        TransactionStatus::Refunded
    } else {
        TransactionStatus::PartiallyRefunded
    }
}

/// What is still refundable on a transaction. Never negative.
#[inline]
pub fn remaining_refundable(total: Money, refunded: Money) -> Money {
    total.saturating_sub_to_zero(refunded)
}

/// The state of a transaction after a refund has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundCheck {
    pub total_refunded: Money,
    pub remaining: Money,
    pub status: TransactionStatus,
}

/// Checks a refund request against the refund bound and computes the
/// resulting state.
///
/// ## Errors
/// - `Validation` if `requested` is not positive
/// - `InvalidRefundAmount` if `requested` exceeds what is still refundable
pub fn check_refund(total: Money, already_refunded: Money, requested: Money) -> CoreResult<RefundCheck> {
    if !requested.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    let remaining = remaining_refundable(total, already_refunded);
    if requested > remaining {
        return Err(CoreError::InvalidRefundAmount {
            remaining,
            requested,
        });
    }

    let total_refunded = already_refunded + requested;
    Ok(RefundCheck {
        total_refunded,
        remaining: remaining - requested,
        status: derive_status(total, total_refunded),
    })
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Sums `unit price × quantity` over snapshot lines.
///
/// Overflow is reported as a validation failure rather than wrapping.
pub fn sale_total<I>(lines: I) -> CoreResult<Money>
where
    I: IntoIterator<Item = (Money, i64)>,
{
    let overflow = || ValidationError::OutOfRange {
        field: "total_price".to_string(),
        min: 0,
        max: i64::MAX,
    };

    lines.into_iter().try_fold(Money::zero(), |acc, (unit, qty)| {
        let line = unit.checked_multiply_quantity(qty).ok_or_else(overflow)?;
        acc.checked_add(line).ok_or_else(|| overflow().into())
    })
}

/// Rejects a caller-declared total that disagrees with the computed one.
pub fn verify_declared_total(declared: Money, computed: Money) -> Result<(), ValidationError> {
    if declared != computed {
        return Err(ValidationError::Mismatch {
            field: "total_price".to_string(),
            declared: declared.cents(),
            computed: computed.cents(),
        });
    }
    Ok(())
}

/// Change owed for a cash payment, floored at zero.
pub fn change_due(cash_received: Option<Money>, total: Money) -> Option<Money> {
    cash_received.map(|cash| cash.saturating_sub_to_zero(total))
}

/// Merges repeated products into one requested quantity each, keeping the
/// order in which products first appear.
///
/// ## Example
/// ```rust
/// use kahera_core::ledger::merge_quantities;
///
/// let merged = merge_quantities([("a", 2), ("b", 1), ("a", 3)]);
/// assert_eq!(merged, vec![("a".to_string(), 5), ("b".to_string(), 1)]);
/// ```
pub fn merge_quantities<'a, I>(items: I) -> Vec<(String, i64)>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut merged: Vec<(String, i64)> = Vec::new();
    for (product_id, qty) in items {
        match merged.iter_mut().find(|(id, _)| id == product_id) {
            Some((_, total)) => *total = total.saturating_add(qty),
            None => merged.push((product_id.to_string(), qty)),
        }
    }
    merged
}

// =============================================================================
// Unit Tests
// =============================================================================
