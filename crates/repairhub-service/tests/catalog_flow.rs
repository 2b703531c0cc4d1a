//! Catalog service integration tests: grouped listings and price preview
//! against an in-memory database.

mod common;

use common::{canonical_selection, order_request, select, setup};
use repairhub_core::PartType;
use repairhub_service::dto::SiteDiscountTerms;
use repairhub_service::ErrorCode;

#[tokio::test]
async fn grouped_options_pair_part_types_per_problem() {
    let shop = setup().await;

    let groups = shop
        .catalog
        .repair_options_for_model(&shop.model_id)
        .await
        .unwrap();

    // Prices are listed by problem name, so Battery comes before Screen
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].problem_name, "Battery Replacement");
    assert_eq!(groups[1].problem_name, "Screen Replacement");

    // Battery only has an original part; the duplicate arm is None
    let battery = &groups[0];
    assert!(battery.original.is_some());
    assert!(battery.duplicate.is_none());
    assert_eq!(battery.estimated_minutes, 45);

    // Screen has both arms, with engine-computed final prices
    let screen = &groups[1];
    let original = screen.original.as_ref().unwrap();
    assert_eq!(original.final_price_cents, 8_500);
    assert_eq!(original.total_discount_cents, 1_500);
    assert!(original.in_stock);

    let duplicate = screen.duplicate.as_ref().unwrap();
    assert_eq!(duplicate.final_price_cents, 6_000);
    assert!(!duplicate.in_stock);
}

#[tokio::test]
async fn grouped_options_for_brand_cover_all_models() {
    let shop = setup().await;

    let groups = shop
        .catalog
        .repair_options_for_brand(&shop.brand_id)
        .await
        .unwrap();

    // Only the active model's prices contribute
    assert_eq!(groups.len(), 2);
}

#[tokio::test]
async fn grouped_options_empty_result_is_not_found() {
    let shop = setup().await;

    let err = shop
        .catalog
        .repair_options_for_model("no-such-model")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn listing_endpoints_return_active_rows() {
    let shop = setup().await;

    let brands = shop.catalog.list_brands().await.unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "Apple");

    // The inactive iPhone 3G is filtered out
    let models = shop
        .catalog
        .list_models(Some(shop.brand_id.as_str()))
        .await
        .unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "iPhone 15");

    let problems = shop.catalog.list_problems().await.unwrap();
    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0].name, "Battery Replacement");
}

#[tokio::test]
async fn preview_computes_canonical_totals() {
    let shop = setup().await;

    let preview = shop
        .catalog
        .preview_price(&shop.model_id, &canonical_selection(&shop), None)
        .await
        .unwrap();

    // subtotal $150.00, item discount $25.00, after items $125.00,
    // site 5% → $6.25, total $118.75, saved $31.25
    assert_eq!(preview.totals.subtotal_cents, 15_000);
    assert_eq!(preview.totals.item_discount_cents, 2_500);
    assert_eq!(preview.totals.price_after_items_cents, 12_500);
    assert_eq!(preview.totals.site_discount_cents, 625);
    assert_eq!(preview.totals.total_cents, 11_875);
    assert_eq!(preview.totals.total_discount_cents, 3_125);

    assert_eq!(preview.model_name, "iPhone 15");
    assert_eq!(preview.items.len(), 2);
}

#[tokio::test]
async fn preview_override_replaces_active_site_discount() {
    let shop = setup().await;

    let preview = shop
        .catalog
        .preview_price(
            &shop.model_id,
            &canonical_selection(&shop),
            Some(SiteDiscountTerms {
                rate_bps: 0,
                amount_cents: 0,
            }),
        )
        .await
        .unwrap();

    // With the 5% promotion overridden away, the total is just the
    // item-discounted sum
    assert_eq!(preview.totals.site_discount_cents, 0);
    assert_eq!(preview.totals.total_cents, 12_500);
}

#[tokio::test]
async fn preview_falls_back_to_zero_without_active_site_discount() {
    let shop = setup().await;

    // End the 5% promotion
    shop.db
        .catalog()
        .set_site_discount_active(&shop.site_discount_id, false)
        .await
        .unwrap();

    let preview = shop
        .catalog
        .preview_price(&shop.model_id, &canonical_selection(&shop), None)
        .await
        .unwrap();

    assert_eq!(preview.totals.site_discount_bps, 0);
    assert_eq!(preview.totals.site_discount_cents, 0);
    assert_eq!(preview.totals.total_cents, 12_500);
}

#[tokio::test]
async fn newest_active_site_discount_wins() {
    let shop = setup().await;

    // Stage a 10% replacement promotion while the 5% row is still active
    let later = chrono::Utc::now() + chrono::Duration::seconds(1);
    shop.db
        .catalog()
        .insert_site_discount(&repairhub_core::SiteDiscount {
            id: uuid::Uuid::new_v4().to_string(),
            rate_bps: 1000,
            amount_cents: 0,
            is_active: true,
            created_at: later,
            updated_at: later,
        })
        .await
        .unwrap();

    let preview = shop
        .catalog
        .preview_price(&shop.model_id, &canonical_selection(&shop), None)
        .await
        .unwrap();

    // $125.00 after item discounts, 10% → $12.50 off, total $112.50
    assert_eq!(preview.totals.site_discount_bps, 1000);
    assert_eq!(preview.totals.site_discount_cents, 1_250);
    assert_eq!(preview.totals.total_cents, 11_250);
}

#[tokio::test]
async fn preview_reports_stock_without_failing() {
    let shop = setup().await;

    let preview = shop
        .catalog
        .preview_price(
            &shop.model_id,
            &[select(&shop.screen_problem_id, PartType::Duplicate)],
            None,
        )
        .await
        .unwrap();

    // The out-of-stock duplicate still prices; availability is a flag here,
    // not a failure (order creation is where it becomes fatal)
    assert_eq!(preview.items.len(), 1);
    assert!(!preview.items[0].in_stock);
    assert_eq!(preview.totals.subtotal_cents, 6_000);
}

#[tokio::test]
async fn preview_prices_duplicate_selections_twice() {
    let shop = setup().await;

    let selection = vec![
        select(&shop.battery_problem_id, PartType::Original),
        select(&shop.battery_problem_id, PartType::Original),
    ];

    let preview = shop
        .catalog
        .preview_price(&shop.model_id, &selection, None)
        .await
        .unwrap();

    // Two phones, same repair: no implicit dedup
    assert_eq!(preview.items.len(), 2);
    assert_eq!(preview.totals.subtotal_cents, 10_000);
}

#[tokio::test]
async fn preview_rejects_bad_input() {
    let shop = setup().await;

    // Empty selection
    let err = shop
        .catalog
        .preview_price(&shop.model_id, &[], None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Unknown model
    let err = shop
        .catalog
        .preview_price("no-such-model", &canonical_selection(&shop), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // Selection with no catalog entry: names the offending pair
    let err = shop
        .catalog
        .preview_price(
            &shop.model_id,
            &[select(&shop.battery_problem_id, PartType::Duplicate)],
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains(&shop.battery_problem_id));
    assert!(err.message.contains("duplicate"));
}

#[tokio::test]
async fn preview_matches_created_order_totals() {
    let shop = setup().await;

    let preview = shop
        .catalog
        .preview_price(&shop.model_id, &canonical_selection(&shop), None)
        .await
        .unwrap();

    let order = shop
        .orders
        .create_order(order_request(&shop.model_id, canonical_selection(&shop)))
        .await
        .unwrap();

    // One engine, two call sites: the numbers cannot disagree
    assert_eq!(order.subtotal_cents, preview.totals.subtotal_cents);
    assert_eq!(order.item_discount_cents, preview.totals.item_discount_cents);
    assert_eq!(order.total_cents, preview.totals.total_cents);
    assert_eq!(order.total_discount_cents, preview.totals.total_discount_cents);
}
