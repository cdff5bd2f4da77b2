//! # Validation
//!
//! Field-level checks shared by every request type.
//!
//! Requests pass three gates before anything is persisted:
//!
//! 1. serde rejects unknown fields and wrong JSON types,
//! 2. `validate()` on the request runs the functions here,
//! 3. SQLite CHECK, UNIQUE and foreign key constraints catch the rest.
//!
//! Only the first two run before storage is touched.
//!
//! ## Usage
//! ```rust
//! use kahera_core::validation::{validate_code, validate_quantity};
//!
//! validate_code("KAPE-250").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, MAX_REASON_LENGTH, MAX_RESTOCK_QUANTITY};

pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CODE_LENGTH: usize = 50;
const MAX_NAME_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 1000;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_REFERENCE_LENGTH: usize = 100;
const MAX_PAYMENT_METHOD_LENGTH: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code (SKU).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use kahera_core::validation::validate_code;
///
/// assert!(validate_code("KAPE-250").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a payment method name such as "Cash" or "GCash".
pub fn validate_payment_method_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_max_length("name", name, MAX_PAYMENT_METHOD_LENGTH)
}

pub fn validate_description(description: &str) -> ValidationResult<()> {
    validate_max_length("description", description, MAX_DESCRIPTION_LENGTH)
}

/// Validates an optional free-text reason (refunds, stock adjustments).
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    validate_max_length("reason", reason, MAX_REASON_LENGTH)
}

pub fn validate_reference_number(reference: &str) -> ValidationResult<()> {
    if reference.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "reference_number".to_string(),
        });
    }
    validate_max_length("reference_number", reference, MAX_REFERENCE_LENGTH)
}

/// Validates a receipt recipient email address.
///
/// Only the shape is checked (`local@domain.tld`, no whitespace); delivery
/// is the mailer's business.
///
/// ## Example
/// ```rust
/// use kahera_core::validation::validate_email;
///
/// assert!(validate_email("juan@example.ph").is_ok());
/// assert!(validate_email("juan@localhost").is_err());
/// assert!(validate_email("not an email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email_to".to_string(),
        reason: reason.to_string(),
    };

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email_to".to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing @"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be of the form name@domain"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

fn validate_max_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// A line item quantity: 1 through [`MAX_ITEM_QUANTITY`]. Checked before
/// the conditional stock decrement so a bad line never reaches storage.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// A price in centavos. Zero is accepted for giveaways; negatives are not.
///
/// ## Example
/// ```rust
/// use kahera_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sell_price", 1099).is_ok());
/// assert!(validate_price_cents("sell_price", 0).is_ok());
/// assert!(validate_price_cents("sell_price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (sale total, refund).
pub fn validate_positive_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock figure that may be zero but never negative
/// (initial stock, low-stock threshold).
pub fn validate_stock_level(field: &str, level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a restock delta.
///
/// `adjust_stock` only ever adds stock; sales are the sole path that
/// removes it.
pub fn validate_restock_delta(delta: i64) -> ValidationResult<()> {
    if delta <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "delta".to_string(),
        });
    }

    if delta > MAX_RESTOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: 1,
            max: MAX_RESTOCK_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items in a sale (1..=MAX_LINE_ITEMS).
pub fn validate_line_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use kahera_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("KAPE-250").is_ok());
        assert!(validate_code("ABC123").is_ok());
        assert!(validate_code("pandesal_6").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Kape Barako 250g").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_payment_method_name() {
        assert!(validate_payment_method_name("GCash").is_ok());
        assert!(matches!(
            validate_payment_method_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_payment_method_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("juan@example.ph").is_ok());
        assert!(validate_email("a.b+c@mail.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("juan").is_err());
        assert!(validate_email("@example.ph").is_err());
        assert!(validate_email("juan@example").is_err());
        assert!(validate_email("juan@@example.ph").is_err());
        assert!(validate_email("juan@example..ph").is_err());
        assert!(validate_email("juan dela@example.ph").is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("damaged packaging").is_ok());
        assert!(validate_reason(&"x".repeat(MAX_REASON_LENGTH)).is_ok());
        assert!(matches!(
            validate_reason(&"x".repeat(MAX_REASON_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_price_cents("sell_price", 0).is_ok());
        assert!(validate_price_cents("sell_price", -1).is_err());
        assert!(validate_positive_amount("amount", 1).is_ok());
        assert!(validate_positive_amount("amount", 0).is_err());
        assert!(validate_stock_level("stock", 0).is_ok());
        assert!(validate_stock_level("stock", -5).is_err());
    }

    #[test]
    fn test_validate_restock_delta() {
        assert!(validate_restock_delta(1).is_ok());
        assert!(validate_restock_delta(MAX_RESTOCK_QUANTITY).is_ok());
        assert!(validate_restock_delta(0).is_err());
        assert!(validate_restock_delta(-3).is_err());
        assert!(validate_restock_delta(MAX_RESTOCK_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_line_item_count() {
        assert!(matches!(
            validate_line_item_count(0),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_line_item_count(1).is_ok());
        assert!(validate_line_item_count(MAX_LINE_ITEMS).is_ok());
        assert!(validate_line_item_count(MAX_LINE_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}
