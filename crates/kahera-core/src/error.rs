//! # Errors
//!
//! Rule violations raised by the pure ledger code. Storage failures live in
//! `kahera-db`; `kahera-ledger` folds both into the error clients see.
//!
//! ```text
//! ValidationError ──► CoreError ──┐
//!                                 ├──► LedgerError ──► ErrorCode
//!                       DbError ──┘
//! ```

use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A sale asked for more units than the product has.
    ///
    /// `available` is the stock seen when the conditional decrement was
    /// refused, so the cashier can offer what is left.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Refund larger than what is still refundable on the transaction.
    #[error("Refund of {requested} exceeds remaining refundable amount {remaining}")]
    InvalidRefundAmount { remaining: Money, requested: Money },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Malformed input. Checked before storage is touched, apart from the
/// declared-total comparison which needs the price snapshots.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Unparseable UUID, timestamp, date or request body.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The client's figure disagrees with the one computed here.
    #[error("{field} mismatch: declared {declared}, computed {computed}")]
    Mismatch {
        field: String,
        declared: i64,
        computed: i64,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violation_messages() {
        let oversell = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 6,
            requested: 10,
        };
        assert_eq!(
            oversell.to_string(),
            "Insufficient stock for product p-1: available 6, requested 10"
        );

        let over_refund = CoreError::InvalidRefundAmount {
            remaining: Money::zero(),
            requested: Money::from_cents(100),
        };
        assert_eq!(
            over_refund.to_string(),
            "Refund of 1.00 exceeds remaining refundable amount 0.00"
        );
    }

    #[test]
    fn test_validation_messages() {
        let missing = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(missing.to_string(), "items is required");

        let mismatch = ValidationError::Mismatch {
            field: "total_price".to_string(),
            declared: 100,
            computed: 120,
        };
        assert_eq!(mismatch.to_string(), "total_price mismatch: declared 100, computed 120");

        let wrapped: CoreError = missing.into();
        assert!(matches!(wrapped, CoreError::Validation(ValidationError::Required { .. })));
    }
}
