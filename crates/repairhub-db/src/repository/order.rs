//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create(order, items) → one transaction, all rows or none        │
//! │                                                                         │
//! │  2. CONFIRM                                                             │
//! │     └── confirm_order() → status=confirmed, warranty clocks armed       │
//! │         (guarded: WHERE status = 'pending')                             │
//! │                                                                         │
//! │  3. WORK                                                                │
//! │     └── start_order() → in_progress                                     │
//! │     └── complete_item() per line, complete_order() at the end           │
//! │                                                                         │
//! │  4. (SIDE BRANCHES)                                                     │
//! │     └── cancel_order() from any non-terminal state                      │
//! │     └── refund_order() for paid orders                                  │
//! │                                                                         │
//! │  Every status update carries its expected-state guard in the WHERE      │
//! │  clause, so a racing transition loses cleanly (0 rows affected)         │
//! │  instead of corrupting state. Monetary columns are never touched by     │
//! │  lifecycle updates - only update_totals() rewrites them, explicitly.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use repairhub_core::{Order, OrderItem, OrderStatus, OrderTotals, PaymentStatus};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Persists an order and all of its line items atomically.
    ///
    /// ## Atomicity
    /// Runs inside one transaction: either the order row and every item row
    /// commit together, or the transaction rolls back on drop and nothing
    /// is written. There is no partially created order.
    ///
    /// A duplicate order number surfaces as `DbError::UniqueViolation`
    /// (the allocator treats that as a retryable collision).
    pub async fn create(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(
            id = %order.id,
            order_number = %order.order_number,
            items = items.len(),
            "Creating order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, user_id,
                customer_name, customer_email, customer_phone,
                model_id, status, payment_status, payment_reference,
                subtotal_cents, item_discount_cents,
                site_discount_bps, site_discount_amount_cents, total_cents,
                notes, admin_notes,
                created_at, updated_at, confirmed_at, completed_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12,
                ?13, ?14, ?15,
                ?16, ?17,
                ?18, ?19, ?20, ?21
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.user_id)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(&order.model_id)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.payment_reference)
        .bind(order.subtotal_cents)
        .bind(order.item_discount_cents)
        .bind(order.site_discount_bps)
        .bind(order.site_discount_amount_cents)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(&order.admin_notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.confirmed_at)
        .bind(order.completed_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, problem_id, part_type,
                    base_price_cents, discount_rate_bps, discount_amount_cents,
                    final_price_cents, warranty_days, warranty_expires_at,
                    is_completed, completed_at, notes, created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4,
                    ?5, ?6, ?7,
                    ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14
                )
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.problem_id)
            .bind(item.part_type)
            .bind(item.base_price_cents)
            .bind(item.discount_rate_bps)
            .bind(item.discount_amount_cents)
            .bind(item.final_price_cents)
            .bind(item.warranty_days)
            .bind(item.warranty_expires_at)
            .bind(item.is_completed)
            .bind(item.completed_at)
            .bind(&item.notes)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, user_id,
                   customer_name, customer_email, customer_phone,
                   model_id, status, payment_status, payment_reference,
                   subtotal_cents, item_discount_cents,
                   site_discount_bps, site_discount_amount_cents, total_cents,
                   notes, admin_notes,
                   created_at, updated_at, confirmed_at, completed_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by its customer-facing order number.
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, user_id,
                   customer_name, customer_email, customer_phone,
                   model_id, status, payment_status, payment_reference,
                   subtotal_cents, item_discount_cents,
                   site_discount_bps, site_discount_amount_cents, total_cents,
                   notes, admin_notes,
                   created_at, updated_at, confirmed_at, completed_at
            FROM orders
            WHERE order_number = ?1
            "#,
        )
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Checks whether an order number is already taken.
    ///
    /// The allocator calls this before accepting a candidate; the UNIQUE
    /// index on `order_number` is the backstop for a race between two
    /// concurrent creations.
    pub async fn order_number_exists(&self, order_number: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM orders WHERE order_number = ?1"#)
                .bind(order_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Lists orders, newest first, with optional status filters.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, user_id,
                   customer_name, customer_email, customer_phone,
                   model_id, status, payment_status, payment_reference,
                   subtotal_cents, item_discount_cents,
                   site_discount_bps, site_discount_amount_cents, total_cents,
                   notes, admin_notes,
                   created_at, updated_at, confirmed_at, completed_at
            FROM orders
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR payment_status = ?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .bind(payment_status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders placed under a customer email, newest first.
    pub async fn list_for_customer_email(&self, email: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, user_id,
                   customer_name, customer_email, customer_phone,
                   model_id, status, payment_status, payment_reference,
                   subtotal_cents, item_discount_cents,
                   site_discount_bps, site_discount_amount_cents, total_cents,
                   notes, admin_notes,
                   created_at, updated_at, confirmed_at, completed_at
            FROM orders
            WHERE customer_email = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Gets all line items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, problem_id, part_type,
                   base_price_cents, discount_rate_bps, discount_amount_cents,
                   final_price_cents, warranty_days, warranty_expires_at,
                   is_completed, completed_at, notes, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Confirms a pending order and arms every line item's warranty clock.
    ///
    /// ## What This Does (one transaction)
    /// 1. `status = confirmed`, `confirmed_at = now` - guarded by
    ///    `WHERE status = 'pending'`
    /// 2. `warranty_expires_at = (now + warranty_days).date()` per item
    ///
    /// ## Returns
    /// `false` if the guard matched no row (the order is not pending);
    /// nothing is written in that case.
    pub async fn confirm_order(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'confirmed',
                confirmed_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Guard lost: not pending (or no such order). Rolls back on drop.
            return Ok(false);
        }

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, problem_id, part_type,
                   base_price_cents, discount_rate_bps, discount_amount_cents,
                   final_price_cents, warranty_days, warranty_expires_at,
                   is_completed, completed_at, notes, created_at
            FROM order_items
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            let expires = item.warranty_expiry(now);
            sqlx::query(r#"UPDATE order_items SET warranty_expires_at = ?2 WHERE id = ?1"#)
                .bind(&item.id)
                .bind(expires)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(order_id = %order_id, items = items.len(), "Order confirmed");
        Ok(true)
    }

    /// Moves a confirmed order into active repair.
    ///
    /// ## Returns
    /// `false` if the order is not currently confirmed.
    pub async fn start_order(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'in_progress',
                updated_at = ?2
            WHERE id = ?1 AND status = 'confirmed'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Completes an in-progress order.
    ///
    /// ## Returns
    /// `false` if the order is not currently in progress.
    pub async fn complete_order(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'completed',
                completed_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'in_progress'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cancels an order from any non-terminal state.
    ///
    /// Payment status is untouched: reversing a captured payment belongs
    /// to the payment collaborator.
    ///
    /// ## Returns
    /// `false` if the order is already terminal.
    pub async fn cancel_order(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'cancelled',
                updated_at = ?2
            WHERE id = ?1 AND status IN ('pending', 'confirmed', 'in_progress')
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks a paid order as refunded.
    ///
    /// ## Returns
    /// `false` if the order is unpaid or already cancelled/refunded.
    pub async fn refund_order(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'refunded',
                updated_at = ?2
            WHERE id = ?1
              AND payment_status = 'paid'
              AND status NOT IN ('cancelled', 'refunded')
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records the payment collaborator's verdict for an order.
    pub async fn set_payment_status(
        &self,
        order_id: &str,
        payment_status: PaymentStatus,
        payment_reference: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payment_status = ?2,
                payment_reference = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(payment_status)
        .bind(payment_reference)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Marks a single line item as completed.
    ///
    /// ## Returns
    /// `false` if the item doesn't exist or was already completed.
    pub async fn complete_item(&self, item_id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE order_items SET
                is_completed = 1,
                completed_at = ?2
            WHERE id = ?1 AND is_completed = 0
            "#,
        )
        .bind(item_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Rewrites an order's monetary snapshot with freshly computed totals.
    ///
    /// ## When To Call
    /// Only from the explicit recalculation path (e.g. after an
    /// administrative line-item edit). Lifecycle transitions never call
    /// this.
    pub async fn update_totals(
        &self,
        order_id: &str,
        totals: &OrderTotals,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                subtotal_cents = ?2,
                item_discount_cents = ?3,
                site_discount_bps = ?4,
                site_discount_amount_cents = ?5,
                total_cents = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(totals.subtotal_cents)
        .bind(totals.item_discount_cents)
        .bind(totals.site_discount_bps)
        .bind(totals.site_discount_amount_cents)
        .bind(totals.total_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }
}
