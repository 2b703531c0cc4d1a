//! # Validation Module
//!
//! Input validation utilities for RepairHub.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API boundary (out of scope here)                              │
//! │  ├── Shape checks (deserialization)                                     │
//! │  └── Immediate client feedback                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                        │
//! │  ├── Runs before any pricing or persistence work                        │
//! │  └── Names the offending field in every error                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints                                                 │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_DISCOUNT_BPS, MAX_ORDER_ITEMS, ORDER_NUMBER_HEX_LEN, ORDER_NUMBER_PREFIX};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Customer Field Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with a dot somewhere after it
/// - Must be at most 254 characters
///
/// Deliberately loose: the definitive check is the confirmation mail the
/// shop sends, not a regex.
pub fn validate_customer_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "customer_email".to_string(),
            max: 254,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "customer_email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 20 characters
/// - Digits, spaces, and `+ - ( )` only
pub fn validate_customer_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_phone".to_string(),
        });
    }

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "customer_phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
    {
        return Err(ValidationError::InvalidFormat {
            field: "customer_phone".to_string(),
            reason: "must contain only digits, spaces, and + - ( )".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free diagnostics)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0.00% to 100.00%)
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount_rate".to_string(),
            min: 0,
            max: MAX_DISCOUNT_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a warranty length in days.
///
/// ## Rules
/// - Must be non-negative (zero = no warranty)
pub fn validate_warranty_days(days: i64) -> ValidationResult<()> {
    if days < 0 {
        return Err(ValidationError::OutOfRange {
            field: "warranty_days".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an estimated repair duration in minutes.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_estimated_minutes(minutes: i64) -> ValidationResult<()> {
    if minutes <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "estimated_minutes".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of repair items in one order.
///
/// ## Rules
/// - Must not be empty (the order aggregate rejects empty selections
///   separately with a dedicated error; this guard is the upper bound)
/// - Must not exceed MAX_ORDER_ITEMS
pub fn validate_selection_size(count: usize) -> ValidationResult<()> {
    if count > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use repairhub_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates an order number: `ORD-` followed by 8 uppercase hex characters.
///
/// ## Example
/// ```rust
/// use repairhub_core::validation::validate_order_number;
///
/// assert!(validate_order_number("ORD-1A2B3C4D").is_ok());
/// assert!(validate_order_number("ORD-1a2b3c4d").is_err()); // lowercase
/// assert!(validate_order_number("1A2B3C4D").is_err());     // missing prefix
/// ```
pub fn validate_order_number(number: &str) -> ValidationResult<()> {
    let suffix = match number.strip_prefix(ORDER_NUMBER_PREFIX) {
        Some(s) => s,
        None => {
            return Err(ValidationError::InvalidFormat {
                field: "order_number".to_string(),
                reason: format!("must start with {ORDER_NUMBER_PREFIX}"),
            })
        }
    };

    if suffix.len() != ORDER_NUMBER_HEX_LEN
        || !suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    {
        return Err(ValidationError::InvalidFormat {
            field: "order_number".to_string(),
            reason: format!("must be {ORDER_NUMBER_PREFIX} plus {ORDER_NUMBER_HEX_LEN} uppercase hex characters"),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
