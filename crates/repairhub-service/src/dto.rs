//! # Data Transfer Objects
//!
//! Typed request/response structs - one per operation, each enumerating
//! exactly the fields that operation accepts or returns. No runtime field
//! introspection, no shared kitchen-sink serializer: if a field isn't in
//! the struct, it isn't in the contract.
//!
//! ## Naming
//! Response DTOs end in `Dto`; request payloads are named after the
//! operation (`CreateOrderRequest`, `ItemSelection`). All serialize as
//! camelCase JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use repairhub_core::{
    Brand, LineQuote, Order, OrderItem, OrderStatus, OrderTotals, PartType, PaymentStatus,
    PhoneModel, Problem, ProblemGroup, RepairPrice,
};

// =============================================================================
// Catalog Responses
// =============================================================================

/// A brand as shown in catalog listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDto {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
}

impl From<Brand> for BrandDto {
    fn from(brand: Brand) -> Self {
        BrandDto {
            id: brand.id,
            name: brand.name,
            logo: brand.logo,
        }
    }
}

/// A phone model as shown in catalog listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneModelDto {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub image: Option<String>,
    pub release_year: Option<i64>,
}

impl From<PhoneModel> for PhoneModelDto {
    fn from(model: PhoneModel) -> Self {
        PhoneModelDto {
            id: model.id,
            brand_id: model.brand_id,
            name: model.name,
            image: model.image,
            release_year: model.release_year,
        }
    }
}

/// A repair problem as shown in catalog listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub estimated_minutes: i64,
}

impl From<Problem> for ProblemDto {
    fn from(problem: Problem) -> Self {
        ProblemDto {
            id: problem.id,
            name: problem.name,
            description: problem.description,
            icon: problem.icon,
            estimated_minutes: problem.estimated_minutes,
        }
    }
}

/// One purchasable repair option (a part tier for a problem), with its
/// engine-computed final price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOfferDto {
    pub price_id: String,
    pub part_type: PartType,
    pub base_price_cents: i64,
    pub discount_rate_bps: u32,
    pub discount_amount_cents: i64,
    pub final_price_cents: i64,
    pub total_discount_cents: i64,
    pub in_stock: bool,
    pub warranty_days: i64,
}

impl From<&RepairPrice> for RepairOfferDto {
    fn from(price: &RepairPrice) -> Self {
        RepairOfferDto {
            price_id: price.id.clone(),
            part_type: price.part_type,
            base_price_cents: price.base_price_cents,
            discount_rate_bps: price.discount_rate_bps,
            discount_amount_cents: price.discount_amount_cents,
            final_price_cents: price.final_price().cents(),
            total_discount_cents: price.total_discount().cents(),
            in_stock: price.in_stock,
            warranty_days: price.warranty_days,
        }
    }
}

/// All priced options for one problem on one model, paired by part tier.
///
/// A tier the catalog doesn't offer is `null`, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemGroupDto {
    pub problem_id: String,
    pub problem_name: String,
    pub problem_icon: String,
    pub problem_description: String,
    pub estimated_minutes: i64,
    pub original: Option<RepairOfferDto>,
    pub duplicate: Option<RepairOfferDto>,
}

impl ProblemGroupDto {
    /// Builds the display group from an engine group plus problem metadata.
    pub fn from_group(group: ProblemGroup, problems: &HashMap<String, Problem>) -> Self {
        let meta = problems.get(&group.problem_id);

        ProblemGroupDto {
            problem_id: group.problem_id.clone(),
            problem_name: meta.map(|p| p.name.clone()).unwrap_or_default(),
            problem_icon: meta.map(|p| p.icon.clone()).unwrap_or_default(),
            problem_description: meta.map(|p| p.description.clone()).unwrap_or_default(),
            estimated_minutes: meta.map(|p| p.estimated_minutes).unwrap_or_default(),
            original: group.original.as_ref().map(RepairOfferDto::from),
            duplicate: group.duplicate.as_ref().map(RepairOfferDto::from),
        }
    }
}

// =============================================================================
// Price Preview
// =============================================================================

/// One quoted line in a price preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePreviewDto {
    pub problem_id: String,
    pub problem_name: String,
    pub part_type: PartType,
    pub base_price_cents: i64,
    pub discount_cents: i64,
    pub final_price_cents: i64,
    pub warranty_days: i64,
    /// Preview reports availability without failing on it; order creation
    /// is where a stock-out becomes fatal.
    pub in_stock: bool,
}

impl LinePreviewDto {
    /// Builds the preview line from an engine quote plus the problem name.
    pub fn from_quote(quote: &LineQuote, problem_name: String) -> Self {
        LinePreviewDto {
            problem_id: quote.problem_id.clone(),
            problem_name,
            part_type: quote.part_type,
            base_price_cents: quote.base_price_cents,
            discount_cents: quote.line_discount().cents(),
            final_price_cents: quote.final_price_cents,
            warranty_days: quote.warranty_days,
            in_stock: quote.in_stock,
        }
    }
}

/// Full response of the read-only price preview: itemized lines plus the
/// engine totals. Nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePreviewDto {
    pub model_id: String,
    pub model_name: String,
    pub items: Vec<LinePreviewDto>,
    pub totals: OrderTotals,
}

// =============================================================================
// Order Requests
// =============================================================================

/// One selected repair: which problem, which part tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSelection {
    pub problem_id: String,
    pub part_type: PartType,
}

/// Customer contact details attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Site-wide discount terms: a percentage (basis points) plus a fixed
/// amount. Used both as an override on preview/create and echoed back in
/// totals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDiscountTerms {
    pub rate_bps: u32,
    pub amount_cents: i64,
}

/// Request payload for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub model_id: String,
    pub customer: CustomerInfo,
    /// Authenticated user id, if any; guest orders omit it.
    pub user_id: Option<String>,
    pub items: Vec<ItemSelection>,
    /// Explicit discount terms; when absent the currently active site
    /// discount applies (zero if none is active).
    pub site_discount_override: Option<SiteDiscountTerms>,
    pub notes: Option<String>,
}

// =============================================================================
// Order Responses
// =============================================================================

/// One frozen line item of a persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: String,
    pub problem_id: String,
    pub problem_name: String,
    pub part_type: PartType,
    pub base_price_cents: i64,
    pub discount_rate_bps: u32,
    pub discount_amount_cents: i64,
    pub final_price_cents: i64,
    pub item_discount_cents: i64,
    pub warranty_days: i64,
    pub warranty_expires_at: Option<NaiveDate>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: String,
}

impl OrderItemDto {
    /// Builds the line DTO from the persisted item plus the problem name.
    pub fn from_item(item: &OrderItem, problem_name: String) -> Self {
        OrderItemDto {
            id: item.id.clone(),
            problem_id: item.problem_id.clone(),
            problem_name,
            part_type: item.part_type,
            base_price_cents: item.base_price_cents,
            discount_rate_bps: item.discount_rate_bps,
            discount_amount_cents: item.discount_amount_cents,
            final_price_cents: item.final_price_cents,
            item_discount_cents: item.item_discount().cents(),
            warranty_days: item.warranty_days,
            warranty_expires_at: item.warranty_expires_at,
            is_completed: item.is_completed,
            completed_at: item.completed_at,
            notes: item.notes.clone(),
        }
    }
}

/// Full order detail: header, frozen totals, and every line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub order_number: String,
    pub user_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub model_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal_cents: i64,
    pub item_discount_cents: i64,
    pub site_discount_bps: u32,
    pub site_discount_amount_cents: i64,
    pub total_cents: i64,
    pub total_discount_cents: i64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemDto>,
}

impl OrderDto {
    /// Assembles the full detail DTO from the aggregate's parts.
    pub fn from_parts(
        order: Order,
        items: Vec<OrderItem>,
        problems: &HashMap<String, Problem>,
    ) -> Self {
        let total_discount_cents = order.total_discount().cents();

        let items = items
            .iter()
            .map(|item| {
                let name = problems
                    .get(&item.problem_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                OrderItemDto::from_item(item, name)
            })
            .collect();

        OrderDto {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            model_id: order.model_id,
            status: order.status,
            payment_status: order.payment_status,
            subtotal_cents: order.subtotal_cents,
            item_discount_cents: order.item_discount_cents,
            site_discount_bps: order.site_discount_bps,
            site_discount_amount_cents: order.site_discount_amount_cents,
            total_cents: order.total_cents,
            total_discount_cents,
            notes: order.notes,
            created_at: order.created_at,
            confirmed_at: order.confirmed_at,
            completed_at: order.completed_at,
            items,
        }
    }
}

/// Slim order row for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryDto {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub model_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderSummaryDto {
    fn from(order: Order) -> Self {
        OrderSummaryDto {
            id: order.id,
            order_number: order.order_number,
            customer_name: order.customer_name,
            model_id: order.model_id,
            status: order.status,
            payment_status: order.payment_status,
            total_cents: order.total_cents,
            created_at: order.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_offer_dto_computes_final_price() {
        let price = RepairPrice {
            id: "rp-1".to_string(),
            model_id: "model-1".to_string(),
            problem_id: "problem-1".to_string(),
            part_type: PartType::Original,
            base_price_cents: 10_000,
            discount_rate_bps: 1000,
            discount_amount_cents: 500,
            in_stock: true,
            warranty_days: 90,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let dto = RepairOfferDto::from(&price);
        assert_eq!(dto.final_price_cents, 8_500);
        assert_eq!(dto.total_discount_cents, 1_500);
    }

    #[test]
    fn test_dto_json_is_camel_case() {
        let selection = ItemSelection {
            problem_id: "problem-1".to_string(),
            part_type: PartType::Duplicate,
        };

        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["problemId"], "problem-1");
        assert_eq!(json["partType"], "duplicate");
    }
}
