//! # repairhub-core: Pure Business Logic for RepairHub
//!
//! This crate is the **heart** of RepairHub. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RepairHub Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   API layer (out of scope)                      │   │
//! │  │    list brands/models ──► preview price ──► place order         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  repairhub-service                              │   │
//! │  │    CatalogService, OrderService, typed DTOs                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ repairhub-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  catalog  │  │   Money   │  │  engine   │  │   rules   │  │   │
//! │  │   │  + orders │  │   rates   │  │  grouping │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 repairhub-db (Database Layer)                   │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (catalog entities, Order, OrderItem, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The pricing engine: one formula, every call site
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use repairhub_core::money::{DiscountRate, Money};
//! use repairhub_core::pricing::final_price;
//!
//! // Create money from cents (never from floats!)
//! let base = Money::from_cents(10_000); // $100.00
//!
//! // $100.00 − 10% − $5.00 = $85.00, clamped at zero if discounts overshoot
//! let price = final_price(base, DiscountRate::from_bps(1000), Money::from_cents(500));
//! assert_eq!(price.cents(), 8_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use repairhub_core::Money` instead of
// `use repairhub_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use pricing::{compute_order_totals, final_price, LineQuote, OrderTotals, ProblemGroup};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix for customer-facing order numbers.
///
/// Order numbers follow the pattern `ORD-` + 8 uppercase hex characters,
/// allocated with a collision check and retried until unique.
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Number of hex characters after the order number prefix.
pub const ORDER_NUMBER_HEX_LEN: usize = 8;

/// Maximum discount rate in basis points (100.00%).
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

/// Maximum repair items allowed in a single order.
///
/// ## Business Reason
/// A phone has only so many repairable parts; anything past this is a
/// malformed request, not a real order.
pub const MAX_ORDER_ITEMS: usize = 20;

/// Default warranty length in days for new catalog entries.
pub const DEFAULT_WARRANTY_DAYS: i64 = 90;
