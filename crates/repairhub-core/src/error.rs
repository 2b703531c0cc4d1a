//! # Error Types
//!
//! Domain-specific error types for repairhub-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  repairhub-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  repairhub-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  repairhub-service errors (separate crate)                              │
//! │  └── ApiError         - What API consumers see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → API consumer            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (problem id, part type, status)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::{OrderStatus, PartType};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are detected before any write occurs and surface synchronously to
/// the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Phone model cannot be found or is inactive.
    #[error("Phone model not found: {0}")]
    ModelNotFound(String),

    /// Repair problem cannot be found or is inactive.
    #[error("Problem not found: {0}")]
    ProblemNotFound(String),

    /// No active priced option exists for the requested selection.
    ///
    /// ## When This Occurs
    /// - The (model, problem, part type) triple has no catalog entry
    /// - The entry exists but was deactivated
    ///
    /// The offending selection is named so the caller can point at the
    /// exact item in a multi-item request.
    #[error("No active repair option for problem {problem_id} with part type {part_type}")]
    PriceNotFound {
        problem_id: String,
        part_type: PartType,
    },

    /// A matching option exists but the part is not in stock.
    ///
    /// Order creation treats this as fatal; price preview reports it
    /// without failing so the client can offer the other part tier.
    #[error("Repair option for problem {problem_id} ({part_type}) is out of stock")]
    OutOfStock {
        problem_id: String,
        part_type: PartType,
    },

    /// An order must contain at least one repair item.
    #[error("Order must contain at least one repair item")]
    EmptySelection,

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Requested lifecycle transition violates the state machine.
    ///
    /// ## When This Occurs
    /// - Confirming an order that is not pending
    /// - Cancelling a completed/cancelled/refunded order
    /// - Refunding an unpaid order
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate brand name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PriceNotFound {
            problem_id: "battery".to_string(),
            part_type: PartType::Duplicate,
        };
        assert_eq!(
            err.to_string(),
            "No active repair option for problem battery with part type duplicate"
        );

        let err = CoreError::InvalidTransition {
            order_id: "order-1".to_string(),
            from: OrderStatus::Cancelled,
            to: OrderStatus::Confirmed,
        };
        assert_eq!(
            err.to_string(),
            "Order order-1 cannot move from cancelled to confirmed"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        assert_eq!(err.to_string(), "customer_name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "customer_email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
