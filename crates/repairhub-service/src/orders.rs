//! # Order Service
//!
//! The order aggregate's public face: atomic creation from a priced
//! selection, guarded lifecycle transitions, tracking, and explicit
//! recalculation.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      createOrder(request)                               │
//! │                                                                         │
//! │  1. Validate customer fields + selection shape   (no writes yet)        │
//! │  2. Resolve active model                         (NotFound otherwise)   │
//! │  3. Resolve every selection to an active,                               │
//! │     in-stock price                               (ValidationError /     │
//! │                                                   OutOfStock otherwise) │
//! │  4. Resolve site terms: override > active row > zero                    │
//! │  5. compute_order_totals() - the same engine preview uses               │
//! │  6. Allocate ORD-XXXXXXXX number (retry on collision)                   │
//! │  7. ONE transaction: order row + every line item, or nothing            │
//! │                                                                         │
//! │  Every failure happens before step 7; there is no partial order.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::resolve_site_terms;
use crate::dto::{CreateOrderRequest, OrderDto, OrderSummaryDto};
use crate::error::ApiError;
use repairhub_core::{
    compute_order_totals, validation, CoreError, DiscountRate, LineQuote, Money, Order, OrderItem,
    OrderStatus, OrderTotals, PaymentStatus, Problem, ORDER_NUMBER_HEX_LEN, ORDER_NUMBER_PREFIX,
};
use repairhub_db::Database;

/// How many order-number candidates to try before giving up with Conflict.
///
/// With 8 hex chars (4 billion values) a second collision in a row is
/// effectively unreachable; the bound exists so the contract is "retry
/// until unique", never "assume uniqueness".
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Write-side facade over the order aggregate.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Creates a new OrderService over a database handle.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates an order from a priced selection.
    ///
    /// Snapshots every selected price into line items, computes totals
    /// through the pricing engine, and persists order + items atomically.
    ///
    /// ## Errors
    /// - `ValidationError` - bad customer fields, empty selection, or a
    ///   selection with no active price
    /// - `NotFound` - model absent or inactive
    /// - `OutOfStock` - a selected option exists but isn't in stock
    ///   (fatal here, unlike preview)
    /// - `Conflict` - order-number allocation exhausted its retries
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderDto, ApiError> {
        // --- 1. Validate input shape before touching the catalog ---
        validation::validate_customer_name(&request.customer.name).map_err(CoreError::from)?;
        validation::validate_customer_email(&request.customer.email).map_err(CoreError::from)?;
        validation::validate_customer_phone(&request.customer.phone).map_err(CoreError::from)?;

        if request.items.is_empty() {
            return Err(CoreError::EmptySelection.into());
        }
        validation::validate_selection_size(request.items.len()).map_err(CoreError::from)?;

        // --- 2. Model must exist and be active ---
        let model = self
            .db
            .catalog()
            .get_active_model(&request.model_id)
            .await?
            .ok_or_else(|| CoreError::ModelNotFound(request.model_id.clone()))?;

        // --- 3. Resolve every selection; stock-outs are fatal for orders ---
        let mut quotes = Vec::with_capacity(request.items.len());
        for selection in &request.items {
            let price = self
                .db
                .catalog()
                .find_active_price(&model.id, &selection.problem_id, selection.part_type)
                .await?
                .ok_or_else(|| CoreError::PriceNotFound {
                    problem_id: selection.problem_id.clone(),
                    part_type: selection.part_type,
                })?;

            if !price.in_stock {
                return Err(CoreError::OutOfStock {
                    problem_id: selection.problem_id.clone(),
                    part_type: selection.part_type,
                }
                .into());
            }

            quotes.push(LineQuote::from_price(&price));
        }

        // --- 4 + 5. Site terms, then the one true totals computation ---
        let terms = resolve_site_terms(&self.db, request.site_discount_override).await?;
        let totals = compute_order_totals(
            &quotes,
            DiscountRate::from_bps(terms.rate_bps),
            Money::from_cents(terms.amount_cents),
        );

        // --- 6 + 7. Allocate a number and persist atomically ---
        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let items: Vec<OrderItem> = quotes
            .iter()
            .map(|quote| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                problem_id: quote.problem_id.clone(),
                part_type: quote.part_type,
                base_price_cents: quote.base_price_cents,
                discount_rate_bps: quote.discount_rate_bps,
                discount_amount_cents: quote.discount_amount_cents,
                final_price_cents: quote.final_price_cents,
                warranty_days: quote.warranty_days,
                warranty_expires_at: None,
                is_completed: false,
                completed_at: None,
                notes: String::new(),
                created_at: now,
            })
            .collect();

        let mut order = Order {
            id: order_id.clone(),
            order_number: String::new(),
            user_id: request.user_id,
            customer_name: request.customer.name.trim().to_string(),
            customer_email: request.customer.email.trim().to_string(),
            customer_phone: request.customer.phone.trim().to_string(),
            model_id: model.id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            subtotal_cents: totals.subtotal_cents,
            item_discount_cents: totals.item_discount_cents,
            site_discount_bps: totals.site_discount_bps,
            site_discount_amount_cents: totals.site_discount_amount_cents,
            total_cents: totals.total_cents,
            notes: request.notes.unwrap_or_default(),
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            completed_at: None,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let candidate = generate_order_number();

            // Check-then-insert; the UNIQUE index catches the race between
            // the check and the write, surfacing as a retryable collision
            if self.db.orders().order_number_exists(&candidate).await? {
                debug!(candidate = %candidate, attempt, "Order number collision");
                if attempt >= MAX_ORDER_NUMBER_ATTEMPTS {
                    return Err(ApiError::conflict(
                        "Could not allocate a unique order number",
                    ));
                }
                continue;
            }

            order.order_number = candidate;
            match self.db.orders().create(&order, &items).await {
                Ok(()) => break,
                Err(e) if e.is_unique_violation() && attempt < MAX_ORDER_NUMBER_ATTEMPTS => {
                    debug!(order_number = %order.order_number, attempt, "Lost order number race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            items = items.len(),
            total_cents = order.total_cents,
            "Order created"
        );

        self.order_detail(&order.id).await
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Full order detail by internal id.
    pub async fn get_order(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        self.order_detail(order_id).await
    }

    /// Tracks an order by its customer-facing number.
    ///
    /// Returns full order + line-item detail; `NotFound` if the number
    /// doesn't exist, `ValidationError` if it isn't even shaped like one.
    pub async fn track_order(&self, order_number: &str) -> Result<OrderDto, ApiError> {
        validation::validate_order_number(order_number).map_err(CoreError::from)?;

        let order = self
            .db
            .orders()
            .get_by_number(order_number)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_number.to_string()))?;

        self.order_detail(&order.id).await
    }

    /// Lists orders, newest first, with optional status filters.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Vec<OrderSummaryDto>, ApiError> {
        let orders = self.db.orders().list(status, payment_status).await?;
        Ok(orders.into_iter().map(OrderSummaryDto::from).collect())
    }

    /// Lists the orders placed under a customer email, newest first.
    pub async fn list_customer_orders(
        &self,
        email: &str,
    ) -> Result<Vec<OrderSummaryDto>, ApiError> {
        let orders = self.db.orders().list_for_customer_email(email).await?;
        Ok(orders.into_iter().map(OrderSummaryDto::from).collect())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Confirms a pending order and arms every line item's warranty clock.
    ///
    /// ## Errors
    /// `InvalidTransition` unless the order is currently pending.
    pub async fn confirm_order(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        let mut order = self.require_order(order_id).await?;
        let now = Utc::now();

        // The aggregate's rules gate the transition with a precise error...
        order.confirm(now)?;

        // ...and the guarded UPDATE makes it race-proof at the database
        if !self.db.orders().confirm_order(order_id, now).await? {
            return Err(self.raced_transition(order_id, OrderStatus::Confirmed).await?);
        }

        info!(order_id = %order_id, "Order confirmed");
        self.order_detail(order_id).await
    }

    /// Moves a confirmed order into active repair.
    pub async fn start_order(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        let mut order = self.require_order(order_id).await?;
        let now = Utc::now();

        order.start(now)?;

        if !self.db.orders().start_order(order_id, now).await? {
            return Err(self.raced_transition(order_id, OrderStatus::InProgress).await?);
        }

        info!(order_id = %order_id, "Order started");
        self.order_detail(order_id).await
    }

    /// Completes an in-progress order.
    pub async fn complete_order(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        let mut order = self.require_order(order_id).await?;
        let now = Utc::now();

        order.complete(now)?;

        if !self.db.orders().complete_order(order_id, now).await? {
            return Err(self.raced_transition(order_id, OrderStatus::Completed).await?);
        }

        info!(order_id = %order_id, "Order completed");
        self.order_detail(order_id).await
    }

    /// Cancels any non-terminal order. Payment status is untouched.
    pub async fn cancel_order(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        let mut order = self.require_order(order_id).await?;
        let now = Utc::now();

        order.cancel(now)?;

        if !self.db.orders().cancel_order(order_id, now).await? {
            return Err(self.raced_transition(order_id, OrderStatus::Cancelled).await?);
        }

        info!(order_id = %order_id, "Order cancelled");
        self.order_detail(order_id).await
    }

    /// Marks a paid order as refunded.
    pub async fn refund_order(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        let mut order = self.require_order(order_id).await?;
        let now = Utc::now();

        order.refund(now)?;

        if !self.db.orders().refund_order(order_id, now).await? {
            return Err(self.raced_transition(order_id, OrderStatus::Refunded).await?);
        }

        info!(order_id = %order_id, "Order refunded");
        self.order_detail(order_id).await
    }

    /// Records the payment collaborator's verdict for an order.
    pub async fn set_payment_status(
        &self,
        order_id: &str,
        payment_status: PaymentStatus,
        payment_reference: Option<&str>,
    ) -> Result<OrderDto, ApiError> {
        self.db
            .orders()
            .set_payment_status(order_id, payment_status, payment_reference)
            .await?;

        info!(order_id = %order_id, payment_status = %payment_status, "Payment status recorded");
        self.order_detail(order_id).await
    }

    /// Marks one line item of an order as completed.
    pub async fn complete_order_item(
        &self,
        order_id: &str,
        item_id: &str,
    ) -> Result<OrderDto, ApiError> {
        let items = self.db.orders().get_items(order_id).await?;
        if !items.iter().any(|i| i.id == item_id) {
            return Err(ApiError::not_found("OrderItem", item_id));
        }

        if !self.db.orders().complete_item(item_id, Utc::now()).await? {
            return Err(ApiError::validation(format!(
                "Order item {item_id} is already completed"
            )));
        }

        self.order_detail(order_id).await
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Re-derives an order's totals from its current line items and
    /// persists them.
    ///
    /// Uses the stored site-discount terms and the same engine steps as
    /// creation. This is the ONLY path that rewrites an order's monetary
    /// snapshot; it runs when explicitly asked (e.g. after an
    /// administrative line-item edit), never as a side effect of a
    /// lifecycle transition.
    pub async fn recalculate_totals(&self, order_id: &str) -> Result<OrderTotals, ApiError> {
        let order = self.require_order(order_id).await?;
        let items = self.db.orders().get_items(order_id).await?;

        let quotes: Vec<LineQuote> = items
            .iter()
            .map(|item| LineQuote {
                problem_id: item.problem_id.clone(),
                part_type: item.part_type,
                base_price_cents: item.base_price_cents,
                discount_rate_bps: item.discount_rate_bps,
                discount_amount_cents: item.discount_amount_cents,
                final_price_cents: item.final_price_cents,
                warranty_days: item.warranty_days,
                in_stock: true,
            })
            .collect();

        let totals = compute_order_totals(
            &quotes,
            order.site_discount_rate(),
            order.site_discount_amount(),
        );

        self.db
            .orders()
            .update_totals(order_id, &totals, Utc::now())
            .await?;

        info!(
            order_id = %order_id,
            total_cents = totals.total_cents,
            "Order totals recalculated"
        );

        Ok(totals)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn require_order(&self, order_id: &str) -> Result<Order, ApiError> {
        Ok(self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?)
    }

    /// Builds the precise InvalidTransition error after a guarded update
    /// matched no row: reload to report the status that actually won.
    async fn raced_transition(
        &self,
        order_id: &str,
        to: OrderStatus,
    ) -> Result<ApiError, ApiError> {
        let current = self.require_order(order_id).await?;
        Ok(CoreError::InvalidTransition {
            order_id: order_id.to_string(),
            from: current.status,
            to,
        }
        .into())
    }

    async fn order_detail(&self, order_id: &str) -> Result<OrderDto, ApiError> {
        let order = self.require_order(order_id).await?;
        let items = self.db.orders().get_items(order_id).await?;

        let mut problems: HashMap<String, Problem> = HashMap::new();
        for item in &items {
            if !problems.contains_key(&item.problem_id) {
                if let Some(problem) = self.db.catalog().get_problem(&item.problem_id).await? {
                    problems.insert(item.problem_id.clone(), problem);
                }
            }
        }

        Ok(OrderDto::from_parts(order, items, &problems))
    }
}

// =============================================================================
// Order Number Allocation
// =============================================================================

/// Generates an order number candidate: `ORD-` + 8 uppercase hex chars
/// drawn from a v4 UUID.
///
/// ## Example
/// `ORD-9F2C51AB`
fn generate_order_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        ORDER_NUMBER_PREFIX,
        hex[..ORDER_NUMBER_HEX_LEN].to_uppercase()
    )
}
