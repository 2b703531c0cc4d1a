//! Shared fixture for service integration tests.
//!
//! Builds an isolated in-memory database seeded with a small catalog:
//!
//! ```text
//! Apple ── iPhone 15 (active), iPhone 3G (inactive)
//!
//! iPhone 15 prices:
//!   Screen Replacement  original   $100.00 − 10% − $5.00 → $85.00  (90d)
//!   Screen Replacement  duplicate   $60.00, OUT OF STOCK          (90d)
//!   Battery Replacement original    $50.00 − 10% − $5.00 → $40.00 (180d)
//!
//! Site discount: 5% + $0.00 (active)
//! ```
//!
//! Ordering Screen(original) + Battery(original) reproduces the canonical
//! two-line scenario: subtotal $150.00, item discount $25.00, site
//! discount $6.25, total $118.75.

#![allow(dead_code)]

use chrono::Utc;
use uuid::Uuid;

use repairhub_core::{Brand, PartType, PhoneModel, Problem, RepairPrice, SiteDiscount};
use repairhub_db::{Database, DbConfig};
use repairhub_service::dto::{CreateOrderRequest, CustomerInfo, ItemSelection};
use repairhub_service::{CatalogService, OrderService};

pub struct TestShop {
    pub db: Database,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub brand_id: String,
    pub model_id: String,
    pub inactive_model_id: String,
    pub screen_problem_id: String,
    pub battery_problem_id: String,
    pub screen_original_price_id: String,
    pub screen_duplicate_price_id: String,
    pub site_discount_id: String,
}

/// Creates a fresh in-memory shop with the fixture catalog.
pub async fn setup() -> TestShop {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    let repo = db.catalog();
    let now = Utc::now();

    let brand = Brand {
        id: Uuid::new_v4().to_string(),
        name: "Apple".to_string(),
        logo: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_brand(&brand).await.unwrap();

    let model = PhoneModel {
        id: Uuid::new_v4().to_string(),
        brand_id: brand.id.clone(),
        name: "iPhone 15".to_string(),
        image: None,
        release_year: Some(2023),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_model(&model).await.unwrap();

    let inactive_model = PhoneModel {
        id: Uuid::new_v4().to_string(),
        brand_id: brand.id.clone(),
        name: "iPhone 3G".to_string(),
        image: None,
        release_year: Some(2008),
        is_active: false,
        created_at: now,
        updated_at: now,
    };
    repo.insert_model(&inactive_model).await.unwrap();

    let screen = Problem {
        id: Uuid::new_v4().to_string(),
        name: "Screen Replacement".to_string(),
        description: "Cracked or unresponsive display".to_string(),
        icon: "screen".to_string(),
        estimated_minutes: 60,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_problem(&screen).await.unwrap();

    let battery = Problem {
        id: Uuid::new_v4().to_string(),
        name: "Battery Replacement".to_string(),
        description: "Battery drains fast or swells".to_string(),
        icon: "battery".to_string(),
        estimated_minutes: 45,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_problem(&battery).await.unwrap();

    let screen_original = RepairPrice {
        id: Uuid::new_v4().to_string(),
        model_id: model.id.clone(),
        problem_id: screen.id.clone(),
        part_type: PartType::Original,
        base_price_cents: 10_000,
        discount_rate_bps: 1000,
        discount_amount_cents: 500,
        in_stock: true,
        warranty_days: 90,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_repair_price(&screen_original).await.unwrap();

    let screen_duplicate = RepairPrice {
        id: Uuid::new_v4().to_string(),
        model_id: model.id.clone(),
        problem_id: screen.id.clone(),
        part_type: PartType::Duplicate,
        base_price_cents: 6_000,
        discount_rate_bps: 0,
        discount_amount_cents: 0,
        in_stock: false,
        warranty_days: 90,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_repair_price(&screen_duplicate).await.unwrap();

    let battery_original = RepairPrice {
        id: Uuid::new_v4().to_string(),
        model_id: model.id.clone(),
        problem_id: battery.id.clone(),
        part_type: PartType::Original,
        base_price_cents: 5_000,
        discount_rate_bps: 1000,
        discount_amount_cents: 500,
        in_stock: true,
        warranty_days: 180,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_repair_price(&battery_original).await.unwrap();

    let site_discount = SiteDiscount {
        id: Uuid::new_v4().to_string(),
        rate_bps: 500,
        amount_cents: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    repo.insert_site_discount(&site_discount).await.unwrap();

    TestShop {
        catalog: CatalogService::new(db.clone()),
        orders: OrderService::new(db.clone()),
        db,
        brand_id: brand.id,
        model_id: model.id,
        inactive_model_id: inactive_model.id,
        screen_problem_id: screen.id,
        battery_problem_id: battery.id,
        screen_original_price_id: screen_original.id,
        screen_duplicate_price_id: screen_duplicate.id,
        site_discount_id: site_discount.id,
    }
}

/// One selection for the fixture catalog.
pub fn select(problem_id: &str, part_type: PartType) -> ItemSelection {
    ItemSelection {
        problem_id: problem_id.to_string(),
        part_type,
    }
}

/// A create-order request with valid customer details for the given items.
pub fn order_request(model_id: &str, items: Vec<ItemSelection>) -> CreateOrderRequest {
    CreateOrderRequest {
        model_id: model_id.to_string(),
        customer: CustomerInfo {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+1 (555) 010-2345".to_string(),
        },
        user_id: None,
        items,
        site_discount_override: None,
        notes: Some("Handle with care".to_string()),
    }
}

/// The canonical two-line selection: screen original + battery original.
pub fn canonical_selection(shop: &TestShop) -> Vec<ItemSelection> {
    vec![
        select(&shop.screen_problem_id, PartType::Original),
        select(&shop.battery_problem_id, PartType::Original),
    ]
}
