//! # Storage Errors
//!
//! `sqlx::Error` is sorted into the handful of cases callers branch on.
//! Constraint failures keep their own variants so `kahera-ledger` can tell
//! a duplicate product code apart from a broken disk.
//!
//! ```text
//! sqlx::Error::RowNotFound        → NotFound
//! sqlx::Error::Database(UNIQUE)   → UniqueViolation
//!                      (FOREIGN)  → ForeignKeyViolation
//!                      (CHECK)    → CheckViolation
//!                      (other)    → QueryFailed
//! sqlx::Error::PoolTimedOut       → PoolExhausted
//! sqlx::Error::PoolClosed         → ConnectionFailed
//! anything else                   → Internal
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row for this tenant: unknown id, another tenant's id, a deleted
    /// product, or an update/delete that matched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Product code or payment method name already taken by the tenant.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Typically a payment method that transactions still point at.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A schema CHECK (such as `stock >= 0`) refused a write. The services
    /// guard every such write, so this points at a bug.
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    /// Sorts a SQLite error message by the constraint it names.
    fn from_sqlite_message(message: &str) -> Self {
        if let Some(columns) = message.strip_prefix("UNIQUE constraint failed: ") {
            // Callers that know the offending value re-raise via `duplicate`
            return DbError::duplicate(columns, "unknown");
        }
        if message.starts_with("FOREIGN KEY constraint failed") {
            return DbError::ForeignKeyViolation {
                message: message.to_string(),
            };
        }
        if message.starts_with("CHECK constraint failed") {
            return DbError::CheckViolation {
                message: message.to_string(),
            };
        }
        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_messages_are_sorted_by_constraint() {
        assert!(matches!(
            DbError::from_sqlite_message("UNIQUE constraint failed: products.tenant_id, products.code"),
            DbError::UniqueViolation { field, .. } if field == "products.tenant_id, products.code"
        ));
        assert!(matches!(
            DbError::from_sqlite_message("FOREIGN KEY constraint failed"),
            DbError::ForeignKeyViolation { .. }
        ));
        assert!(matches!(
            DbError::from_sqlite_message("CHECK constraint failed: stock >= 0"),
            DbError::CheckViolation { .. }
        ));
        assert!(matches!(
            DbError::from_sqlite_message("database disk image is malformed"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::PoolExhausted));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(DbError::from(sqlx::Error::RowNotFound).is_not_found());
    }
}
