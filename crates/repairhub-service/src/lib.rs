//! # repairhub-service: Service Facade for RepairHub
//!
//! The upward-facing layer a thin API adapter consumes. Orchestrates
//! repairhub-core (pricing engine, lifecycle rules) and repairhub-db
//! (persistence) behind typed DTOs.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       repairhub-service                                 │
//! │                                                                         │
//! │  CatalogService (read-only)          OrderService (aggregate)           │
//! │  ├── list_brands                     ├── create_order (atomic)          │
//! │  ├── list_models                     ├── confirm / start / complete     │
//! │  ├── list_problems                   ├── cancel / refund                │
//! │  ├── repair_options_for_model        ├── track_order (by number)        │
//! │  ├── repair_options_for_brand        ├── list_orders (filtered)         │
//! │  └── preview_price                   └── recalculate_totals (explicit)  │
//! │                                                                         │
//! │  Both go through the SAME pricing engine in repairhub-core, so a        │
//! │  previewed total and a created order's total can never disagree.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repairhub_db::{Database, DbConfig};
//! use repairhub_service::{CatalogService, OrderService};
//!
//! let db = Database::new(DbConfig::new("./repairhub.db")).await?;
//! let catalog = CatalogService::new(db.clone());
//! let orders = OrderService::new(db);
//!
//! let preview = catalog.preview_price(&model_id, &selections, None).await?;
//! let order = orders.create_order(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod dto;
pub mod error;
pub mod orders;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogService;
pub use error::{ApiError, ErrorCode};
pub use orders::OrderService;
