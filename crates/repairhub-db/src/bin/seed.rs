//! # Seed Data Generator
//!
//! Populates the database with a development catalog: brands, phone models,
//! repair problems, priced repair options, and one site-wide discount.
//!
//! ## Usage
//! ```bash
//! # Seed into the default database file
//! cargo run -p repairhub-db --bin seed
//!
//! # Specify database path
//! cargo run -p repairhub-db --bin seed -- --db ./data/repairhub.db
//! ```
//!
//! ## Generated Catalog
//! - 4 brands × a handful of models each
//! - 6 repair problems
//! - An original + duplicate price for every (model, problem) pair,
//!   with deterministic prices and a sprinkle of discounts/stock-outs
//! - One active 5% site discount

use chrono::Utc;
use std::env;
use tracing::info;
use uuid::Uuid;

use repairhub_core::{Brand, PartType, PhoneModel, Problem, RepairPrice, SiteDiscount};
use repairhub_db::{Database, DbConfig};

/// Brands and their models for realistic test data.
const BRANDS: &[(&str, &[&str])] = &[
    (
        "Apple",
        &[
            "iPhone 13",
            "iPhone 14",
            "iPhone 15",
            "iPhone 15 Pro Max",
            "iPhone SE",
        ],
    ),
    (
        "Samsung",
        &[
            "Galaxy S22",
            "Galaxy S23",
            "Galaxy S24 Ultra",
            "Galaxy A54",
            "Galaxy Z Flip 5",
        ],
    ),
    ("Google", &["Pixel 7", "Pixel 8", "Pixel 8 Pro"]),
    ("Xiaomi", &["Redmi Note 12", "Mi 13", "Poco X5"]),
];

/// Repair problems: (name, icon, estimated minutes).
const PROBLEMS: &[(&str, &str, i64)] = &[
    ("Screen Replacement", "screen", 60),
    ("Battery Replacement", "battery", 45),
    ("Charging Port Repair", "charging", 40),
    ("Camera Repair", "camera", 50),
    ("Speaker Repair", "speaker", 35),
    ("Water Damage Treatment", "water", 120),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./repairhub.db".to_string());
    info!(path = %db_path, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();
    let now = Utc::now();

    let mut problem_ids = Vec::new();
    for (name, icon, minutes) in PROBLEMS {
        let problem = Problem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: format!("{name} by a certified technician"),
            icon: icon.to_string(),
            estimated_minutes: *minutes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        catalog.insert_problem(&problem).await?;
        problem_ids.push(problem.id);
    }

    let mut price_count = 0usize;
    for (brand_idx, (brand_name, models)) in BRANDS.iter().enumerate() {
        let brand = Brand {
            id: Uuid::new_v4().to_string(),
            name: brand_name.to_string(),
            logo: Some(format!("brand_logos/{}.png", brand_name.to_lowercase())),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        catalog.insert_brand(&brand).await?;

        for (model_idx, model_name) in models.iter().enumerate() {
            let model = PhoneModel {
                id: Uuid::new_v4().to_string(),
                brand_id: brand.id.clone(),
                name: model_name.to_string(),
                image: None,
                release_year: Some(2022 + (model_idx as i64 % 3)),
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            catalog.insert_model(&model).await?;

            for (problem_idx, problem_id) in problem_ids.iter().enumerate() {
                for part_type in [PartType::Original, PartType::Duplicate] {
                    // Deterministic but varied prices: pricier brands/problems
                    // cost more, duplicates run ~60% of original
                    let base = 3_000
                        + (brand_idx as i64 * 2_500)
                        + (model_idx as i64 * 1_000)
                        + (problem_idx as i64 * 1_500);
                    let base = match part_type {
                        PartType::Original => base,
                        PartType::Duplicate => base * 6 / 10,
                    };

                    let discount_bps = match (model_idx + problem_idx) % 3 {
                        0 => 0,
                        1 => 500,  // 5%
                        _ => 1000, // 10%
                    };

                    let price = RepairPrice {
                        id: Uuid::new_v4().to_string(),
                        model_id: model.id.clone(),
                        problem_id: problem_id.clone(),
                        part_type,
                        base_price_cents: base,
                        discount_rate_bps: discount_bps,
                        discount_amount_cents: 0,
                        // Every 7th option is a stock-out, to exercise the
                        // out-of-stock paths in dev
                        in_stock: price_count % 7 != 6,
                        warranty_days: match part_type {
                            PartType::Original => 180,
                            PartType::Duplicate => 90,
                        },
                        is_active: true,
                        created_at: now,
                        updated_at: now,
                    };
                    catalog.insert_repair_price(&price).await?;
                    price_count += 1;
                }
            }
        }
    }

    let site_discount = SiteDiscount {
        id: Uuid::new_v4().to_string(),
        rate_bps: 500, // 5% launch promotion
        amount_cents: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    catalog.insert_site_discount(&site_discount).await?;

    info!(
        problems = PROBLEMS.len(),
        brands = BRANDS.len(),
        prices = price_count,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Parses `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
