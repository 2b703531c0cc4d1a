//! # Catalog Service
//!
//! Read-only catalog operations: browse brands/models/problems, list repair
//! options grouped by problem, and preview prices for a selection. Nothing
//! here writes to the database.

use std::collections::HashMap;

use tracing::debug;

use crate::dto::{
    BrandDto, ItemSelection, LinePreviewDto, PhoneModelDto, PricePreviewDto, ProblemDto,
    ProblemGroupDto, SiteDiscountTerms,
};
use crate::error::{ApiError, ErrorCode};
use repairhub_core::{
    compute_order_totals, pricing, validation, CoreError, DiscountRate, LineQuote, Money, Problem,
};
use repairhub_db::Database;

/// Message returned when a grouped-options query matches nothing.
///
/// An empty result set here is a NotFound-class response, not an empty
/// success: the client shows "we don't service this device" rather than an
/// empty price table.
const NO_PRICES_MESSAGE: &str = "No repair prices found for the given phone model or brand";

/// Read-side facade over the catalog.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new CatalogService over a database handle.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Lists active brands, ordered by name.
    pub async fn list_brands(&self) -> Result<Vec<BrandDto>, ApiError> {
        let brands = self.db.catalog().list_active_brands().await?;
        Ok(brands.into_iter().map(BrandDto::from).collect())
    }

    /// Lists active phone models, newest first, optionally for one brand.
    pub async fn list_models(&self, brand_id: Option<&str>) -> Result<Vec<PhoneModelDto>, ApiError> {
        let models = self.db.catalog().list_active_models(brand_id).await?;
        Ok(models.into_iter().map(PhoneModelDto::from).collect())
    }

    /// Lists active repair problems, ordered by name.
    pub async fn list_problems(&self) -> Result<Vec<ProblemDto>, ApiError> {
        let problems = self.db.catalog().list_active_problems().await?;
        Ok(problems.into_iter().map(ProblemDto::from).collect())
    }

    // =========================================================================
    // Grouped Repair Options
    // =========================================================================

    /// Lists a model's repair options grouped by problem, original and
    /// duplicate tiers paired.
    ///
    /// ## Errors
    /// `NotFound` when the model has no active prices at all.
    pub async fn repair_options_for_model(
        &self,
        model_id: &str,
    ) -> Result<Vec<ProblemGroupDto>, ApiError> {
        let prices = self.db.catalog().list_active_prices_for_model(model_id).await?;
        self.grouped(prices).await
    }

    /// Lists repair options across every active model of a brand, grouped
    /// by problem.
    ///
    /// ## Errors
    /// `NotFound` when the brand has no active prices at all.
    pub async fn repair_options_for_brand(
        &self,
        brand_id: &str,
    ) -> Result<Vec<ProblemGroupDto>, ApiError> {
        let prices = self.db.catalog().list_active_prices_for_brand(brand_id).await?;
        self.grouped(prices).await
    }

    async fn grouped(
        &self,
        prices: Vec<repairhub_core::RepairPrice>,
    ) -> Result<Vec<ProblemGroupDto>, ApiError> {
        if prices.is_empty() {
            return Err(ApiError::new(ErrorCode::NotFound, NO_PRICES_MESSAGE));
        }

        let problems = self.problems_by_id().await?;
        let groups = pricing::group_by_problem(prices);

        debug!(groups = groups.len(), "Grouped repair options");

        Ok(groups
            .into_iter()
            .map(|g| ProblemGroupDto::from_group(g, &problems))
            .collect())
    }

    // =========================================================================
    // Price Preview
    // =========================================================================

    /// Prices a selection without persisting anything.
    ///
    /// Runs the exact computation order creation runs - same engine, same
    /// rounding, same clamping - so the preview a customer sees is the total
    /// their order will freeze. The only difference: stock-outs are reported
    /// per line instead of failing the call.
    ///
    /// ## Errors
    /// - `NotFound` - model absent or inactive
    /// - `ValidationError` - empty selection, or a selection with no active
    ///   price (message names the problem id and part type)
    pub async fn preview_price(
        &self,
        model_id: &str,
        selections: &[ItemSelection],
        discount_override: Option<SiteDiscountTerms>,
    ) -> Result<PricePreviewDto, ApiError> {
        if selections.is_empty() {
            return Err(CoreError::EmptySelection.into());
        }
        validation::validate_selection_size(selections.len()).map_err(CoreError::from)?;

        let model = self
            .db
            .catalog()
            .get_active_model(model_id)
            .await?
            .ok_or_else(|| CoreError::ModelNotFound(model_id.to_string()))?;

        let terms = resolve_site_terms(&self.db, discount_override).await?;

        let mut quotes = Vec::with_capacity(selections.len());
        for selection in selections {
            let price = self
                .db
                .catalog()
                .find_active_price(model_id, &selection.problem_id, selection.part_type)
                .await?
                .ok_or_else(|| CoreError::PriceNotFound {
                    problem_id: selection.problem_id.clone(),
                    part_type: selection.part_type,
                })?;

            quotes.push(LineQuote::from_price(&price));
        }

        let totals = compute_order_totals(
            &quotes,
            DiscountRate::from_bps(terms.rate_bps),
            Money::from_cents(terms.amount_cents),
        );

        let problems = self.problems_by_id().await?;
        let items = quotes
            .iter()
            .map(|quote| {
                let name = problems
                    .get(&quote.problem_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                LinePreviewDto::from_quote(quote, name)
            })
            .collect();

        debug!(
            model_id = %model_id,
            lines = quotes.len(),
            total_cents = totals.total_cents,
            "Price preview computed"
        );

        Ok(PricePreviewDto {
            model_id: model.id,
            model_name: model.name,
            items,
            totals,
        })
    }

    /// Active problems keyed by id, for DTO assembly.
    async fn problems_by_id(&self) -> Result<HashMap<String, Problem>, ApiError> {
        let problems = self.db.catalog().list_active_problems().await?;
        Ok(problems.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

// =============================================================================
// Site Discount Resolution
// =============================================================================

/// Resolves the site-wide discount terms for one computation.
///
/// Precedence: caller override > currently active SiteDiscount row > zero.
/// Fetched once here and passed INTO the engine - the engine itself never
/// performs global lookups.
pub(crate) async fn resolve_site_terms(
    db: &Database,
    discount_override: Option<SiteDiscountTerms>,
) -> Result<SiteDiscountTerms, ApiError> {
    if let Some(terms) = discount_override {
        validation::validate_discount_bps(terms.rate_bps).map_err(CoreError::from)?;
        validation::validate_price_cents(terms.amount_cents).map_err(CoreError::from)?;
        return Ok(terms);
    }

    let active = db.catalog().active_site_discount().await?;

    Ok(active
        .map(|d| SiteDiscountTerms {
            rate_bps: d.rate_bps,
            amount_cents: d.amount_cents,
        })
        .unwrap_or(SiteDiscountTerms {
            rate_bps: 0,
            amount_cents: 0,
        }))
}
