//! # API Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in RepairHub                              │
//! │                                                                         │
//! │  API consumer                  Service layer                            │
//! │  ────────────                  ─────────────                            │
//! │                                                                         │
//! │  createOrder(...)                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Database error?  ── DbError ───────────┐                        │  │
//! │  │         │                               ▼                        │  │
//! │  │  Domain error?   ── CoreError ───► ApiError { code, message } ──►│  │
//! │  │         │                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The consumer branches on `code` (machine-readable) and shows           │
//! │  `message` (human-readable, names the offending field/selection).      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why these codes
//! "Nothing matched the filter", "the request was malformed", and "the
//! option is currently unavailable" warrant different client handling
//! (empty state vs. validation message vs. offer the other part tier), so
//! they are distinct codes rather than one 4xx blob.

use serde::Serialize;

use repairhub_core::CoreError;
use repairhub_db::DbError;

/// API error returned from service operations.
///
/// ## Serialization
/// This is what the API consumer receives when an operation fails:
/// ```json
/// {
///   "code": "OUT_OF_STOCK",
///   "message": "Repair option for problem battery (duplicate) is out of stock"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity absent or inactive (404)
    NotFound,

    /// Malformed/missing input, including invalid selections (400)
    ValidationError,

    /// Matched option exists but is unavailable (409-ish, retryable with
    /// the other part tier)
    OutOfStock,

    /// Lifecycle rule violation (422)
    InvalidTransition,

    /// Order-number collision exhausted its retries (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts domain errors to API errors, preserving the taxonomy.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ModelNotFound(_)
            | CoreError::ProblemNotFound(_)
            | CoreError::OrderNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),

            // An unresolvable selection is malformed input: the message
            // names the offending problem id + part type
            CoreError::PriceNotFound { .. } | CoreError::EmptySelection => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }

            CoreError::OutOfStock { .. } => ApiError::new(ErrorCode::OutOfStock, err.to_string()),

            CoreError::InvalidTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, err.to_string())
            }

            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use repairhub_core::{OrderStatus, PartType};

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::OutOfStock {
            problem_id: "battery".to_string(),
            part_type: PartType::Duplicate,
        }
        .into();
        assert_eq!(err.code, ErrorCode::OutOfStock);

        let err: ApiError = CoreError::EmptySelection.into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = CoreError::InvalidTransition {
            order_id: "order-1".to_string(),
            from: OrderStatus::Cancelled,
            to: OrderStatus::Confirmed,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_found("Order", "order-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = DbError::duplicate("order_number", "ORD-1A2B3C4D").into();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Order", "order-1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: order-1");
    }
}
