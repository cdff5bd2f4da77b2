//! # Ledger Error Type
//!
//! The single error type every ledger operation returns.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Kahera Ledger                      │
//! │                                                                         │
//! │  request.validate() ─── ValidationError ──────────────┐                 │
//! │         │                                             │                 │
//! │         ▼                                             │                 │
//! │  ledger rules ───────── CoreError ────────────────────┤                 │
//! │         │               (InsufficientStock, ...)      ▼                 │
//! │         ▼                                       LedgerError ──► code()  │
//! │  TenantStore ────────── DbError ──────────────────────┘       │         │
//! │                         (NotFound → NotFound,                 ▼         │
//! │                          everything else → Storage)     ErrorBody       │
//! │                                                         { code, msg }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! The HTTP boundary receives an [`ErrorBody`]:
//! ```json
//! {
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for product 5f0c…: available 6, requested 10"
//! }
//! ```
//! Infrastructure failures are logged in full and reported with a generic
//! message.

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use kahera_core::{CoreError, Money, ValidationError};
use kahera_db::DbError;

/// Errors surfaced by the sales ledger, refund, stock and catalog services.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Missing, deleted or cross-tenant entity.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Refund of {requested} exceeds remaining refundable amount {remaining}")]
    InvalidRefundAmount { remaining: Money, requested: Money },

    /// Persistence failure, surfaced as-is and never retried here.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::Validation(_) => ErrorCode::ValidationError,
            LedgerError::NotFound { .. } => ErrorCode::NotFound,
            LedgerError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            LedgerError::InvalidRefundAmount { .. } => ErrorCode::InvalidRefundAmount,
            LedgerError::Storage(DbError::UniqueViolation { .. }) => ErrorCode::Duplicate,
            LedgerError::Storage(DbError::ForeignKeyViolation { .. }) => ErrorCode::InvalidReference,
            LedgerError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// The body handed to the HTTP boundary.
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            LedgerError::Storage(
                e @ (DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. }),
            ) => e.to_string(),
            LedgerError::Storage(_) => "Database operation failed".to_string(),
            other => other.to_string(),
        };

        ErrorBody {
            code: self.code(),
            message,
        }
    }
}

/// Error codes for API responses.
///
/// ## Suggested HTTP mapping
/// | Code                    | Status |
/// |-------------------------|--------|
/// | `VALIDATION_ERROR`      | 400    |
/// | `NOT_FOUND`             | 404    |
/// | `DUPLICATE`             | 409    |
/// | `INSUFFICIENT_STOCK`    | 422    |
/// | `INVALID_REFUND_AMOUNT` | 422    |
/// | `INVALID_REFERENCE`     | 422    |
/// | `STORAGE_ERROR`         | 500    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InsufficientStock,
    InvalidRefundAmount,
    Duplicate,
    InvalidReference,
    StorageError,
}

/// What the caller receives when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// Converts database errors to ledger errors.
impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LedgerError::NotFound { entity, id },
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                LedgerError::Storage(err)
            }
            other => {
                // Log the actual error; callers only see a generic message
                tracing::error!(error = %other, "Storage failure");
                LedgerError::Storage(other)
            }
        }
    }
}

/// Converts core errors to ledger errors.
impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => LedgerError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            CoreError::InvalidRefundAmount {
                remaining,
                requested,
            } => LedgerError::InvalidRefundAmount {
                remaining,
                requested,
            },
            CoreError::Validation(e) => LedgerError::Validation(e),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
