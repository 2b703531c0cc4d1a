//! # Domain Types
//!
//! Core domain types used throughout RepairHub.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read model)                Orders (aggregate)                 │
//! │  ┌─────────────────┐                 ┌─────────────────┐                │
//! │  │     Brand       │                 │     Order       │                │
//! │  │       │         │                 │  ─────────────  │                │
//! │  │  PhoneModel     │◄── protected ───│  order_number   │                │
//! │  │       │         │                 │  status         │                │
//! │  │  RepairPrice    │                 │  totals (frozen)│                │
//! │  │   (per problem, │                 └───────┬─────────┘                │
//! │  │    per part)    │                         │ owns (cascade)           │
//! │  └───────┬─────────┘                 ┌───────┴─────────┐                │
//! │          │                           │   OrderItem     │                │
//! │      Problem  ◄───── protected ──────│  (snapshot of a │                │
//! │                                      │   RepairPrice)  │                │
//! │  SiteDiscount (single active row)    └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (order_number, brand/problem name)
//!
//! ## Snapshot Pattern
//! An `OrderItem` copies every monetary field of its `RepairPrice` at order
//! creation. Catalog edits after that instant never change an existing order.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::{DiscountRate, Money};
use crate::pricing;

// =============================================================================
// Part Type
// =============================================================================

/// Quality/sourcing tier of a replacement part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    /// Manufacturer-original replacement part.
    Original,
    /// Third-party (aftermarket) replacement part.
    Duplicate,
}

impl PartType {
    /// Stable lowercase name, as stored in the database and used in APIs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PartType::Original => "original",
            PartType::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Catalog Entities
// =============================================================================

/// A phone brand (e.g. Apple, Samsung).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Brand {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, globally unique.
    pub name: String,

    /// Logo asset reference (path or icon key), if any.
    pub logo: Option<String>,

    /// Whether the brand is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A phone model (e.g. iPhone 15 Pro Max). Belongs to exactly one brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PhoneModel {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning brand.
    pub brand_id: String,

    /// Display name, unique within its brand (active or not).
    pub name: String,

    /// Product image reference, if any.
    pub image: Option<String>,

    /// Release year, when known.
    pub release_year: Option<i64>,

    /// Whether the model is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named repair problem (e.g. "Battery Replacement"). Globally unique
/// by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Problem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, globally unique.
    pub name: String,

    /// Customer-facing description.
    pub description: String,

    /// Icon class or name for the frontend.
    pub icon: String,

    /// Estimated repair time in minutes (positive).
    pub estimated_minutes: i64,

    /// Whether the problem is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The priceable unit: one (model, problem, part type) triple.
///
/// ## Invariants
/// - Unique per (model, problem, part_type)
/// - `base_price_cents >= 0`, `discount_amount_cents >= 0`
/// - `discount_rate_bps <= 10_000` (100.00%)
///
/// Once an order line item references these numbers they are snapshotted
/// into the order; editing a `RepairPrice` never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RepairPrice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Phone model this price applies to.
    pub model_id: String,

    /// Repair problem this price applies to.
    pub problem_id: String,

    /// Part tier: original or duplicate.
    pub part_type: PartType,

    /// Base price in cents before any discount.
    pub base_price_cents: i64,

    /// Percentage discount in basis points (1000 = 10.00%).
    pub discount_rate_bps: u32,

    /// Fixed discount amount in cents, applied after the percentage.
    pub discount_amount_cents: i64,

    /// Whether the part is currently in stock.
    pub in_stock: bool,

    /// Warranty length in days.
    pub warranty_days: i64,

    /// Whether this price is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairPrice {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }

    /// Returns the percentage discount.
    #[inline]
    pub fn discount_rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_rate_bps)
    }

    /// Returns the fixed discount amount as Money.
    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_cents(self.discount_amount_cents)
    }

    /// Final price after both discounts, floored at zero.
    ///
    /// Delegates to the pricing engine so the formula exists exactly once.
    pub fn final_price(&self) -> Money {
        pricing::final_price(self.base_price(), self.discount_rate(), self.discount_amount())
    }

    /// Total discount for this price (base − final).
    pub fn total_discount(&self) -> Money {
        self.base_price() - self.final_price()
    }
}

/// Site-wide discount applied after all per-item discounts.
///
/// At most one active row is honored at a time; no active row means zero
/// site-wide discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SiteDiscount {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Percentage discount in basis points (500 = 5.00%).
    pub rate_bps: u32,

    /// Fixed discount amount in cents.
    pub amount_cents: i64,

    /// Whether this discount is active.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteDiscount {
    /// Returns the percentage discount.
    #[inline]
    pub fn rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.rate_bps)
    }

    /// Returns the fixed discount amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// ```text
/// pending ──► confirmed ──► in_progress ──► completed
///    │            │              │
///    └────────────┴──────────────┴──► cancelled
///
/// any paid order ──► refunded
/// ```
/// Terminal states: completed, cancelled, refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting staff confirmation.
    Pending,
    /// Confirmed by staff; warranty clocks are armed.
    Confirmed,
    /// Repair work has started.
    InProgress,
    /// All work done and handed back.
    Completed,
    /// Abandoned before completion.
    Cancelled,
    /// Paid order reimbursed.
    Refunded,
}

impl OrderStatus {
    /// Stable snake_case name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Terminal states admit no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// The forward-progress and cancellation edges of the state machine.
    ///
    /// Refunds are excluded here: they additionally require a paid order,
    /// which only the aggregate can check (see [`Order::refund`]).
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// Payment status of an order. Mutated by the payment collaborator only;
/// the order lifecycle never touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Stable snake_case name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer repair order: the aggregate root.
///
/// Monetary fields are captured at creation from the pricing engine and are
/// frozen; only an explicit recalculation may rewrite them. Lifecycle
/// transitions mutate `status` and timestamps, never prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier: `ORD-` + 8 uppercase hex chars, globally unique.
    pub order_number: String,

    /// Registered user who placed the order, if authenticated.
    pub user_id: Option<String>,

    /// Customer contact details (guest orders carry these without a user).
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,

    /// Phone model being repaired. Protected reference: the model cannot
    /// be deleted while orders point at it, only deactivated.
    pub model_id: String,

    /// Lifecycle status.
    pub status: OrderStatus,

    /// Payment status (owned by the payment collaborator).
    pub payment_status: PaymentStatus,

    /// External payment reference (e.g. a payment-intent id).
    pub payment_reference: Option<String>,

    /// Sum of line-item base prices, in cents.
    pub subtotal_cents: i64,

    /// Sum of per-line discounts, in cents.
    pub item_discount_cents: i64,

    /// Site-wide percentage discount applied at creation, in basis points.
    pub site_discount_bps: u32,

    /// Site-wide fixed discount applied at creation, in cents.
    pub site_discount_amount_cents: i64,

    /// Final amount payable, in cents. Floored at zero.
    pub total_cents: i64,

    /// Customer notes or special instructions.
    pub notes: String,

    /// Internal notes for staff.
    pub admin_notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the accumulated per-item discount as Money.
    #[inline]
    pub fn item_discount(&self) -> Money {
        Money::from_cents(self.item_discount_cents)
    }

    /// Returns the site-wide percentage discount.
    #[inline]
    pub fn site_discount_rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.site_discount_bps)
    }

    /// Returns the site-wide fixed discount as Money.
    #[inline]
    pub fn site_discount_amount(&self) -> Money {
        Money::from_cents(self.site_discount_amount_cents)
    }

    /// Returns the total payable as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total discount across all levels (subtotal − total).
    pub fn total_discount(&self) -> Money {
        self.subtotal() - self.total()
    }

    /// Confirms a pending order, stamping the confirmation time.
    ///
    /// Callers must also arm the warranty expiry on every line item using
    /// [`OrderItem::warranty_expiry`] with the same timestamp.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(OrderStatus::Confirmed)?;
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Moves a confirmed order into active repair.
    pub fn start(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(OrderStatus::InProgress)?;
        self.updated_at = now;
        Ok(())
    }

    /// Completes an in-progress order, stamping the completion time.
    pub fn complete(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(OrderStatus::Completed)?;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Cancels any non-terminal order.
    ///
    /// Does not touch `payment_status`: reversing a captured payment is the
    /// payment collaborator's job.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status.is_terminal() {
            return Err(self.invalid_transition(OrderStatus::Cancelled));
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Marks a paid order as refunded.
    pub fn refund(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status.is_terminal() && self.status != OrderStatus::Completed {
            return Err(self.invalid_transition(OrderStatus::Refunded));
        }
        if self.payment_status != PaymentStatus::Paid {
            return Err(self.invalid_transition(OrderStatus::Refunded));
        }
        self.status = OrderStatus::Refunded;
        self.updated_at = now;
        Ok(())
    }

    fn transition(&mut self, next: OrderStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(self.invalid_transition(next));
        }
        self.status = next;
        Ok(())
    }

    fn invalid_transition(&self, to: OrderStatus) -> CoreError {
        CoreError::InvalidTransition {
            order_id: self.id.clone(),
            from: self.status,
            to,
        }
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// One repaired problem within an order.
/// Uses the snapshot pattern to freeze catalog pricing at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning order (cascade-deleted with it).
    pub order_id: String,

    /// Repaired problem. Protected reference, like Order → PhoneModel.
    pub problem_id: String,

    /// Part tier chosen for this repair.
    pub part_type: PartType,

    /// Base price in cents at order time (frozen).
    pub base_price_cents: i64,

    /// Percentage discount in basis points at order time (frozen).
    pub discount_rate_bps: u32,

    /// Fixed discount in cents at order time (frozen).
    pub discount_amount_cents: i64,

    /// Final line price in cents at order time (frozen).
    pub final_price_cents: i64,

    /// Warranty length in days at order time (frozen).
    pub warranty_days: i64,

    /// Warranty expiry date; set once when the order is confirmed.
    pub warranty_expires_at: Option<NaiveDate>,

    /// Whether this individual repair is done.
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,

    /// Technician notes for this line.
    pub notes: String,

    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the frozen base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }

    /// Returns the frozen final price as Money.
    #[inline]
    pub fn final_price(&self) -> Money {
        Money::from_cents(self.final_price_cents)
    }

    /// Discount captured for this line (base − final).
    pub fn item_discount(&self) -> Money {
        self.base_price() - self.final_price()
    }

    /// Warranty expiry date for a given confirmation time.
    ///
    /// ## Example
    /// Confirmed 2026-01-01 with 90 warranty days → expires 2026-04-01.
    pub fn warranty_expiry(&self, confirmed_at: DateTime<Utc>) -> NaiveDate {
        (confirmed_at + Duration::days(self.warranty_days)).date_naive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
