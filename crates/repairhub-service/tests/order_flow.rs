//! Order service integration tests: creation, immutability, lifecycle, and
//! tracking against an in-memory database.

mod common;

use chrono::Duration;

use common::{canonical_selection, order_request, select, setup};
use repairhub_core::validation::validate_order_number;
use repairhub_core::{OrderStatus, PartType, PaymentStatus};
use repairhub_db::DbError;
use repairhub_service::ErrorCode;

#[tokio::test]
async fn create_order_snapshots_selection() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    assert!(validate_order_number(&order.order_number).is_ok());
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.subtotal_cents, 15_000);
    assert_eq!(order.item_discount_cents, 2_500);
    assert_eq!(order.site_discount_bps, 500);
    assert_eq!(order.total_cents, 11_875);
    assert_eq!(order.total_discount_cents, 3_125);
    assert_eq!(order.notes, "Handle with care");
    assert!(order.confirmed_at.is_none());

    assert_eq!(order.items.len(), 2);
    let screen = order
        .items
        .iter()
        .find(|i| i.problem_id == shop.screen_problem_id)
        .unwrap();
    assert_eq!(screen.base_price_cents, 10_000);
    assert_eq!(screen.discount_rate_bps, 1000);
    assert_eq!(screen.discount_amount_cents, 500);
    assert_eq!(screen.final_price_cents, 8_500);
    assert_eq!(screen.item_discount_cents, 1_500);
    assert_eq!(screen.warranty_days, 90);
    // Warranty clocks are armed at confirmation, not creation
    assert!(screen.warranty_expires_at.is_none());
    assert_eq!(screen.problem_name, "Screen Replacement");
}

#[tokio::test]
async fn create_order_rejects_empty_selection_without_persisting() {
    let shop = setup().await;

    let err = shop
        .orders
        .create_order(order_request(&shop.model_id, vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);

    // All-or-nothing: no half-written order survives the failure
    let orders = shop.orders.list_orders(None, None).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn create_order_treats_stock_out_as_fatal() {
    let shop = setup().await;

    let err = shop
        .orders
        .create_order(order_request(
            &shop.model_id,
            vec![
                select(&shop.battery_problem_id, PartType::Original),
                // The duplicate screen part is seeded out of stock
                select(&shop.screen_problem_id, PartType::Duplicate),
            ],
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::OutOfStock);
    assert!(err.message.contains(&shop.screen_problem_id));

    let orders = shop.orders.list_orders(None, None).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn create_order_names_unresolvable_selections() {
    let shop = setup().await;

    let err = shop
        .orders
        .create_order(order_request(
            &shop.model_id,
            vec![select(&shop.battery_problem_id, PartType::Duplicate)],
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains(&shop.battery_problem_id));
    assert!(err.message.contains("duplicate"));
}

#[tokio::test]
async fn create_order_requires_active_model() {
    let shop = setup().await;

    let err = shop
        .orders
        .create_order(order_request(
            &shop.inactive_model_id,
            canonical_selection(&shop),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn create_order_rejects_bad_customer_fields() {
    let shop = setup().await;

    let mut request = order_request(&shop.model_id, canonical_selection(&shop));
    request.customer.email = "not-an-email".to_string();

    let err = shop.orders.create_order(request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("customer_email"));
}

#[tokio::test]
async fn catalog_edits_never_touch_existing_orders() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    // Reprice the screen repair after the order was placed
    shop.db
        .catalog()
        .update_price_terms(&shop.screen_original_price_id, 99_999, 0, 0)
        .await
        .unwrap();

    // New quotes see the new price...
    let preview = shop
        .catalog
        .preview_price(
            &shop.model_id,
            &[select(&shop.screen_problem_id, PartType::Original)],
            None,
        )
        .await
        .unwrap();
    assert_eq!(preview.totals.subtotal_cents, 99_999);

    // ...but the persisted order still carries its frozen snapshot
    let refetched = shop.orders.get_order(&order.id).await.unwrap();
    assert_eq!(refetched.subtotal_cents, 15_000);
    assert_eq!(refetched.total_cents, 11_875);
    let screen = refetched
        .items
        .iter()
        .find(|i| i.problem_id == shop.screen_problem_id)
        .unwrap();
    assert_eq!(screen.base_price_cents, 10_000);
    assert_eq!(screen.final_price_cents, 8_500);
}

#[tokio::test]
async fn confirm_arms_warranty_clocks() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    let confirmed = shop.orders.confirm_order(&order.id).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    let confirmed_at = confirmed.confirmed_at.expect("confirmation timestamp");

    // Each line expires warranty_days after the shared confirmation instant
    let screen = confirmed
        .items
        .iter()
        .find(|i| i.problem_id == shop.screen_problem_id)
        .unwrap();
    assert_eq!(
        screen.warranty_expires_at,
        Some((confirmed_at + Duration::days(90)).date_naive())
    );

    let battery = confirmed
        .items
        .iter()
        .find(|i| i.problem_id == shop.battery_problem_id)
        .unwrap();
    assert_eq!(
        battery.warranty_expires_at,
        Some((confirmed_at + Duration::days(180)).date_naive())
    );

    // Confirmation never rewrites money
    assert_eq!(confirmed.total_cents, 11_875);
}

#[tokio::test]
async fn confirm_is_exclusive_to_pending() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    shop.orders.confirm_order(&order.id).await.unwrap();

    // Second confirm is rejected, not silently ignored
    let err = shop.orders.confirm_order(&order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn confirm_rejected_on_cancelled_order() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    shop.orders.cancel_order(&order.id).await.unwrap();

    let err = shop.orders.confirm_order(&order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    assert!(err.message.contains("cancelled"));

    // The failed transition left the status untouched
    let refetched = shop.orders.get_order(&order.id).await.unwrap();
    assert_eq!(refetched.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn full_lifecycle_walks_the_ladder() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    let confirmed = shop.orders.confirm_order(&order.id).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    let started = shop.orders.start_order(&order.id).await.unwrap();
    assert_eq!(started.status, OrderStatus::InProgress);

    let completed = shop.orders.complete_order(&order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.completed_at.is_some());

    // Completed is terminal: cancel is rejected
    let err = shop.orders.cancel_order(&order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    // No rung may be skipped
    let other = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();
    let err = shop.orders.start_order(&other.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn cancel_leaves_payment_status_alone() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    shop.orders
        .set_payment_status(&order.id, PaymentStatus::Paid, Some("pi_123"))
        .await
        .unwrap();

    let cancelled = shop.orders.cancel_order(&order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    // Reversing the captured payment is the payment collaborator's job
    assert_eq!(cancelled.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn refund_requires_a_paid_order() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    // Unpaid: refund rejected
    let err = shop.orders.refund_order(&order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    shop.orders
        .set_payment_status(&order.id, PaymentStatus::Paid, Some("pi_123"))
        .await
        .unwrap();

    let refunded = shop.orders.refund_order(&order.id).await.unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
}

#[tokio::test]
async fn track_returns_full_detail_by_number() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    let tracked = shop.orders.track_order(&order.order_number).await.unwrap();
    assert_eq!(tracked.id, order.id);
    assert_eq!(tracked.items.len(), 2);
    assert_eq!(tracked.total_cents, order.total_cents);

    // Well-formed but unknown: NotFound
    let err = shop.orders.track_order("ORD-00000000").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // Not even shaped like an order number: ValidationError
    let err = shop.orders.track_order("whatever").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn list_orders_filters_by_status() {
    let shop = setup().await;

    let first = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();
    shop.orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    shop.orders.cancel_order(&first.id).await.unwrap();

    let all = shop.orders.list_orders(None, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let cancelled = shop
        .orders
        .list_orders(Some(OrderStatus::Cancelled), None)
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, first.id);

    let by_email = shop
        .orders
        .list_customer_orders("ada@example.com")
        .await
        .unwrap();
    assert_eq!(by_email.len(), 2);
}

#[tokio::test]
async fn recalculation_reproduces_frozen_totals() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    // Even after the catalog moves, recalculation derives from the order's
    // own line items + stored site terms, so it reproduces the same totals
    shop.db
        .catalog()
        .update_price_terms(&shop.screen_original_price_id, 99_999, 0, 0)
        .await
        .unwrap();

    let totals = shop.orders.recalculate_totals(&order.id).await.unwrap();
    assert_eq!(totals.subtotal_cents, order.subtotal_cents);
    assert_eq!(totals.total_cents, order.total_cents);

    let refetched = shop.orders.get_order(&order.id).await.unwrap();
    assert_eq!(refetched.total_cents, order.total_cents);
}

#[tokio::test]
async fn referenced_model_is_protected_from_deletion() {
    let shop = setup().await;

    shop.orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    let err = shop
        .db
        .catalog()
        .delete_model(&shop.model_id)
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

    // Soft-deactivation is the supported path and still works
    shop.db
        .catalog()
        .set_model_active(&shop.model_id, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn line_items_complete_individually() {
    let shop = setup().await;

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    let item_id = order
        .items
        .iter()
        .find(|i| i.problem_id == shop.battery_problem_id)
        .unwrap()
        .id
        .clone();

    let updated = shop
        .orders
        .complete_order_item(&order.id, &item_id)
        .await
        .unwrap();

    let battery = updated.items.iter().find(|i| i.id == item_id).unwrap();
    assert!(battery.is_completed);
    assert!(battery.completed_at.is_some());

    // Completing the same line twice is rejected
    let err = shop
        .orders
        .complete_order_item(&order.id, &item_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Unknown item id in this order: NotFound
    let err = shop
        .orders
        .complete_order_item(&order.id, "no-such-item")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}
