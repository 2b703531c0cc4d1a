//! # Catalog Repository
//!
//! Database operations for the catalog read model: brands, phone models,
//! repair problems, priced repair options, and the site-wide discount.
//!
//! ## Query Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Query Conventions                            │
//! │                                                                         │
//! │  • list_active_* methods filter is_active = 1 and state their sort key  │
//! │      brands        → by name                                            │
//! │      phone models  → newest first                                       │
//! │      problems      → by name                                            │
//! │      repair prices → by problem name, then part type                    │
//! │                                                                         │
//! │  • get_* methods return Option (absence is not an error here;           │
//! │    the service layer decides what a miss means)                         │
//! │                                                                         │
//! │  • Catalog rows referenced by orders are NEVER hard-deleted;            │
//! │    deactivate them instead. delete_model exists for unreferenced        │
//! │    rows and surfaces a ForeignKeyViolation otherwise.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use repairhub_core::{Brand, PartType, PhoneModel, Problem, RepairPrice, SiteDiscount};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
///
/// let brands = repo.list_active_brands().await?;
/// let price = repo
///     .find_active_price("model-id", "problem-id", PartType::Original)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Brands
    // =========================================================================

    /// Lists active brands, ordered by name.
    pub async fn list_active_brands(&self) -> DbResult<Vec<Brand>> {
        let brands = sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, name, logo, is_active, created_at, updated_at
            FROM brands
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(brands)
    }

    /// Gets a brand by ID, active or not.
    pub async fn get_brand(&self, id: &str) -> DbResult<Option<Brand>> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, name, logo, is_active, created_at, updated_at
            FROM brands
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(brand)
    }

    /// Inserts a brand.
    pub async fn insert_brand(&self, brand: &Brand) -> DbResult<()> {
        debug!(id = %brand.id, name = %brand.name, "Inserting brand");

        sqlx::query(
            r#"
            INSERT INTO brands (id, name, logo, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&brand.id)
        .bind(&brand.name)
        .bind(&brand.logo)
        .bind(brand.is_active)
        .bind(brand.created_at)
        .bind(brand.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Phone Models
    // =========================================================================

    /// Lists active phone models, newest first, optionally filtered by brand.
    pub async fn list_active_models(&self, brand_id: Option<&str>) -> DbResult<Vec<PhoneModel>> {
        let models = sqlx::query_as::<_, PhoneModel>(
            r#"
            SELECT id, brand_id, name, image, release_year, is_active, created_at, updated_at
            FROM phone_models
            WHERE is_active = 1
              AND (?1 IS NULL OR brand_id = ?1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(brand_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(models)
    }

    /// Gets a phone model by ID, active or not.
    pub async fn get_model(&self, id: &str) -> DbResult<Option<PhoneModel>> {
        let model = sqlx::query_as::<_, PhoneModel>(
            r#"
            SELECT id, brand_id, name, image, release_year, is_active, created_at, updated_at
            FROM phone_models
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    /// Gets an active phone model by ID.
    pub async fn get_active_model(&self, id: &str) -> DbResult<Option<PhoneModel>> {
        Ok(self.get_model(id).await?.filter(|m| m.is_active))
    }

    /// Inserts a phone model.
    pub async fn insert_model(&self, model: &PhoneModel) -> DbResult<()> {
        debug!(id = %model.id, name = %model.name, "Inserting phone model");

        sqlx::query(
            r#"
            INSERT INTO phone_models (
                id, brand_id, name, image, release_year, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&model.id)
        .bind(&model.brand_id)
        .bind(&model.name)
        .bind(&model.image)
        .bind(model.release_year)
        .bind(model.is_active)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Activates or deactivates a phone model (soft delete).
    pub async fn set_model_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE phone_models SET is_active = ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PhoneModel", id));
        }

        Ok(())
    }

    /// Hard-deletes a phone model.
    ///
    /// Only valid for rows no order references; a referenced model trips
    /// the RESTRICT foreign key and surfaces as a ForeignKeyViolation.
    pub async fn delete_model(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(r#"DELETE FROM phone_models WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PhoneModel", id));
        }

        Ok(())
    }

    // =========================================================================
    // Problems
    // =========================================================================

    /// Lists active problems, ordered by name.
    pub async fn list_active_problems(&self) -> DbResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"
            SELECT id, name, description, icon, estimated_minutes, is_active,
                   created_at, updated_at
            FROM problems
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(problems)
    }

    /// Gets a problem by ID, active or not.
    pub async fn get_problem(&self, id: &str) -> DbResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            SELECT id, name, description, icon, estimated_minutes, is_active,
                   created_at, updated_at
            FROM problems
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(problem)
    }

    /// Inserts a problem.
    pub async fn insert_problem(&self, problem: &Problem) -> DbResult<()> {
        debug!(id = %problem.id, name = %problem.name, "Inserting problem");

        sqlx::query(
            r#"
            INSERT INTO problems (
                id, name, description, icon, estimated_minutes, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&problem.id)
        .bind(&problem.name)
        .bind(&problem.description)
        .bind(&problem.icon)
        .bind(problem.estimated_minutes)
        .bind(problem.is_active)
        .bind(problem.created_at)
        .bind(problem.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Repair Prices
    // =========================================================================

    /// Finds the unique active price for one (model, problem, part type)
    /// selection.
    ///
    /// ## Snapshot Read
    /// This is the lookup both price preview and order creation resolve
    /// selections through. The row read here is the row the order freezes;
    /// a concurrent catalog edit does not invalidate an in-flight
    /// computation.
    pub async fn find_active_price(
        &self,
        model_id: &str,
        problem_id: &str,
        part_type: PartType,
    ) -> DbResult<Option<RepairPrice>> {
        let price = sqlx::query_as::<_, RepairPrice>(
            r#"
            SELECT id, model_id, problem_id, part_type, base_price_cents,
                   discount_rate_bps, discount_amount_cents, in_stock,
                   warranty_days, is_active, created_at, updated_at
            FROM repair_prices
            WHERE model_id = ?1 AND problem_id = ?2 AND part_type = ?3
              AND is_active = 1
            "#,
        )
        .bind(model_id)
        .bind(problem_id)
        .bind(part_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Lists active prices for a phone model, ordered by problem name then
    /// part type - the display order the grouped catalog preserves.
    pub async fn list_active_prices_for_model(
        &self,
        model_id: &str,
    ) -> DbResult<Vec<RepairPrice>> {
        let prices = sqlx::query_as::<_, RepairPrice>(
            r#"
            SELECT rp.id, rp.model_id, rp.problem_id, rp.part_type,
                   rp.base_price_cents, rp.discount_rate_bps,
                   rp.discount_amount_cents, rp.in_stock, rp.warranty_days,
                   rp.is_active, rp.created_at, rp.updated_at
            FROM repair_prices rp
            INNER JOIN problems p ON p.id = rp.problem_id
            WHERE rp.model_id = ?1 AND rp.is_active = 1
            ORDER BY p.name, rp.part_type
            "#,
        )
        .bind(model_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(model_id = %model_id, count = prices.len(), "Listed prices for model");
        Ok(prices)
    }

    /// Lists active prices across every model of a brand, ordered by model
    /// creation (newest first), then problem name, then part type.
    pub async fn list_active_prices_for_brand(
        &self,
        brand_id: &str,
    ) -> DbResult<Vec<RepairPrice>> {
        let prices = sqlx::query_as::<_, RepairPrice>(
            r#"
            SELECT rp.id, rp.model_id, rp.problem_id, rp.part_type,
                   rp.base_price_cents, rp.discount_rate_bps,
                   rp.discount_amount_cents, rp.in_stock, rp.warranty_days,
                   rp.is_active, rp.created_at, rp.updated_at
            FROM repair_prices rp
            INNER JOIN phone_models m ON m.id = rp.model_id
            INNER JOIN problems p ON p.id = rp.problem_id
            WHERE m.brand_id = ?1 AND rp.is_active = 1 AND m.is_active = 1
            ORDER BY m.created_at DESC, p.name, rp.part_type
            "#,
        )
        .bind(brand_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    /// Inserts a repair price.
    pub async fn insert_repair_price(&self, price: &RepairPrice) -> DbResult<()> {
        debug!(
            id = %price.id,
            model_id = %price.model_id,
            problem_id = %price.problem_id,
            part_type = %price.part_type,
            "Inserting repair price"
        );

        sqlx::query(
            r#"
            INSERT INTO repair_prices (
                id, model_id, problem_id, part_type,
                base_price_cents, discount_rate_bps, discount_amount_cents,
                in_stock, warranty_days, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&price.id)
        .bind(&price.model_id)
        .bind(&price.problem_id)
        .bind(price.part_type)
        .bind(price.base_price_cents)
        .bind(price.discount_rate_bps)
        .bind(price.discount_amount_cents)
        .bind(price.in_stock)
        .bind(price.warranty_days)
        .bind(price.is_active)
        .bind(price.created_at)
        .bind(price.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the pricing terms of a repair price.
    ///
    /// Orders created before this call keep their frozen snapshot; only
    /// future quotes see the new terms.
    pub async fn update_price_terms(
        &self,
        id: &str,
        base_price_cents: i64,
        discount_rate_bps: u32,
        discount_amount_cents: i64,
    ) -> DbResult<()> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE repair_prices SET
                base_price_cents = ?2,
                discount_rate_bps = ?3,
                discount_amount_cents = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(base_price_cents)
        .bind(discount_rate_bps)
        .bind(discount_amount_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RepairPrice", id));
        }

        Ok(())
    }

    /// Sets the in-stock flag on a repair price.
    pub async fn set_price_in_stock(&self, id: &str, in_stock: bool) -> DbResult<()> {
        let result = sqlx::query(r#"UPDATE repair_prices SET in_stock = ?2 WHERE id = ?1"#)
            .bind(id)
            .bind(in_stock)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RepairPrice", id));
        }

        Ok(())
    }

    /// Activates or deactivates a repair price (soft delete).
    pub async fn set_price_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query(r#"UPDATE repair_prices SET is_active = ?2 WHERE id = ?1"#)
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RepairPrice", id));
        }

        Ok(())
    }

    // =========================================================================
    // Site Discount
    // =========================================================================

    /// Returns the currently honored site-wide discount, if any.
    ///
    /// At most one active row is honored: the newest active one. Operators
    /// stage a replacement by inserting the new row before deactivating the
    /// old.
    pub async fn active_site_discount(&self) -> DbResult<Option<SiteDiscount>> {
        let discount = sqlx::query_as::<_, SiteDiscount>(
            r#"
            SELECT id, rate_bps, amount_cents, is_active, created_at, updated_at
            FROM site_discounts
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Inserts a site discount row.
    pub async fn insert_site_discount(&self, discount: &SiteDiscount) -> DbResult<()> {
        debug!(id = %discount.id, rate_bps = discount.rate_bps, "Inserting site discount");

        sqlx::query(
            r#"
            INSERT INTO site_discounts (
                id, rate_bps, amount_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&discount.id)
        .bind(discount.rate_bps)
        .bind(discount.amount_cents)
        .bind(discount.is_active)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Activates or deactivates a site discount row.
    ///
    /// Deactivating the only active row ends the promotion: pricing falls
    /// back to zero site-wide discount.
    pub async fn set_site_discount_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"UPDATE site_discounts SET is_active = ?2, updated_at = ?3 WHERE id = ?1"#,
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SiteDiscount", id));
        }

        Ok(())
    }
}
