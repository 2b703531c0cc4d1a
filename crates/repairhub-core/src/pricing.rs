//! # Pricing Engine
//!
//! Deterministic, side-effect-free price computation for repair orders.
//!
//! ## Single Source of Truth
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               One Formula, Three Call Sites                             │
//! │                                                                         │
//! │  Catalog listing ──┐                                                    │
//! │                    │                                                    │
//! │  Price preview ────┼──► final_price() / compute_order_totals()          │
//! │                    │         (THIS MODULE)                              │
//! │  Order creation ───┘                                                    │
//! │                                                                         │
//! │  No call site reimplements the arithmetic. The same integer-cent        │
//! │  rounding and zero-floor clamping run everywhere, so a price shown      │
//! │  in the catalog is the price frozen into the order.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Computation Order
//! 1. Per line: `final = max(0, base − base×rate − fixed)`
//! 2. `subtotal = Σ base`
//! 3. `item_discount = Σ (base − final)`
//! 4. `price_after_items = subtotal − item_discount`
//! 5. `site_discount = price_after_items × site_rate + site_fixed`
//! 6. `total = max(0, price_after_items − site_discount)`

use serde::{Deserialize, Serialize};

use crate::money::{DiscountRate, Money};
use crate::types::{PartType, RepairPrice};

// =============================================================================
// Line Pricing
// =============================================================================

/// Final price after a percentage discount and a fixed discount, floored
/// at zero.
///
/// This is THE pricing formula. Every final price in the system - catalog
/// display, preview, order snapshot - comes from this function.
///
/// ## Example
/// ```rust
/// use repairhub_core::money::{DiscountRate, Money};
/// use repairhub_core::pricing::final_price;
///
/// // $100.00 − 10% − $5.00 = $85.00
/// let price = final_price(
///     Money::from_cents(10_000),
///     DiscountRate::from_bps(1000),
///     Money::from_cents(500),
/// );
/// assert_eq!(price.cents(), 8_500);
/// ```
pub fn final_price(base: Money, rate: DiscountRate, amount: Money) -> Money {
    (base - base.discount_part(rate) - amount).clamp_non_negative()
}

/// Snapshot of one priced repair line.
///
/// Produced from a [`RepairPrice`] at quote time; order creation copies
/// these exact numbers into the persisted line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineQuote {
    /// Problem being repaired.
    pub problem_id: String,

    /// Part tier chosen.
    pub part_type: PartType,

    /// Base price in cents.
    pub base_price_cents: i64,

    /// Percentage discount in basis points.
    pub discount_rate_bps: u32,

    /// Fixed discount in cents.
    pub discount_amount_cents: i64,

    /// Final line price in cents (clamped at zero).
    pub final_price_cents: i64,

    /// Warranty length in days for this line.
    pub warranty_days: i64,

    /// Whether the part was in stock when quoted. Order creation treats
    /// `false` as fatal; preview merely reports it.
    pub in_stock: bool,
}

impl LineQuote {
    /// Quotes a single catalog price entry.
    pub fn from_price(price: &RepairPrice) -> Self {
        LineQuote {
            problem_id: price.problem_id.clone(),
            part_type: price.part_type,
            base_price_cents: price.base_price_cents,
            discount_rate_bps: price.discount_rate_bps,
            discount_amount_cents: price.discount_amount_cents,
            final_price_cents: price.final_price().cents(),
            warranty_days: price.warranty_days,
            in_stock: price.in_stock,
        }
    }

    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }

    /// Returns the final price as Money.
    #[inline]
    pub fn final_price(&self) -> Money {
        Money::from_cents(self.final_price_cents)
    }

    /// Discount captured by this line (base − final). Never negative.
    pub fn line_discount(&self) -> Money {
        self.base_price() - self.final_price()
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Fully itemized totals for a set of quoted lines.
///
/// All values in cents; `site_discount_bps`/`site_discount_amount_cents`
/// echo the input terms so callers can persist them alongside the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    /// Σ base prices.
    pub subtotal_cents: i64,

    /// Σ per-line discounts.
    pub item_discount_cents: i64,

    /// Subtotal after item discounts (≥ 0 by construction).
    pub price_after_items_cents: i64,

    /// Site-wide percentage applied, in basis points.
    pub site_discount_bps: u32,

    /// Site-wide fixed amount applied, in cents.
    pub site_discount_amount_cents: i64,

    /// Computed site-wide discount (percentage part + fixed part).
    pub site_discount_cents: i64,

    /// Final amount payable (floored at zero).
    pub total_cents: i64,

    /// Subtotal − total: everything the customer saved.
    pub total_discount_cents: i64,
}

/// Computes order totals for a sequence of quoted lines plus site-wide
/// discount terms.
///
/// Deterministic and side-effect-free: same lines + same terms = same
/// totals, at every call site. Duplicate (problem, part type) lines are
/// deliberately priced twice - deduplication, if wanted, is an API-boundary
/// concern.
///
/// ## Example
/// ```rust
/// use repairhub_core::money::{DiscountRate, Money};
/// use repairhub_core::pricing::{compute_order_totals, LineQuote};
/// use repairhub_core::types::PartType;
///
/// let lines = vec![LineQuote {
///     problem_id: "p1".into(),
///     part_type: PartType::Original,
///     base_price_cents: 10_000,
///     discount_rate_bps: 1000,
///     discount_amount_cents: 500,
///     final_price_cents: 8_500,
///     warranty_days: 90,
///     in_stock: true,
/// }];
///
/// let totals = compute_order_totals(&lines, DiscountRate::zero(), Money::zero());
/// assert_eq!(totals.total_cents, 8_500);
/// ```
pub fn compute_order_totals(
    lines: &[LineQuote],
    site_rate: DiscountRate,
    site_amount: Money,
) -> OrderTotals {
    let mut subtotal = Money::zero();
    let mut item_discount = Money::zero();

    for line in lines {
        subtotal += line.base_price();
        item_discount += line.line_discount();
    }

    // ≥ 0 by construction: each line's final price is clamped to [0, base]
    let price_after_items = subtotal - item_discount;

    let site_discount = price_after_items.discount_part(site_rate) + site_amount;

    let total = (price_after_items - site_discount).clamp_non_negative();
    let total_discount = subtotal - total;

    OrderTotals {
        subtotal_cents: subtotal.cents(),
        item_discount_cents: item_discount.cents(),
        price_after_items_cents: price_after_items.cents(),
        site_discount_bps: site_rate.bps(),
        site_discount_amount_cents: site_amount.cents(),
        site_discount_cents: site_discount.cents(),
        total_cents: total.cents(),
        total_discount_cents: total_discount.cents(),
    }
}

// =============================================================================
// Catalog Grouping
// =============================================================================

/// Priced options for one problem, paired by part tier.
///
/// An absent tier is `None`, not an error: plenty of repairs only have an
/// original part, or only an aftermarket one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemGroup {
    /// Problem shared by the grouped entries.
    pub problem_id: String,

    /// The original-part price, if offered.
    pub original: Option<RepairPrice>,

    /// The duplicate-part price, if offered.
    pub duplicate: Option<RepairPrice>,
}

/// Groups priced options by problem, pairing original/duplicate entries.
///
/// Preserves the encounter order of each problem's first appearance, so
/// catalog ordering (by problem name, per the repository queries) survives
/// the grouping. If the same (problem, part type) appears twice the later
/// entry wins, mirroring plain map assignment; the catalog's uniqueness
/// constraint makes that unreachable in practice.
pub fn group_by_problem(prices: Vec<RepairPrice>) -> Vec<ProblemGroup> {
    let mut groups: Vec<ProblemGroup> = Vec::new();

    for price in prices {
        let idx = groups
            .iter()
            .position(|g| g.problem_id == price.problem_id)
            .unwrap_or_else(|| {
                groups.push(ProblemGroup {
                    problem_id: price.problem_id.clone(),
                    original: None,
                    duplicate: None,
                });
                groups.len() - 1
            });

        match price.part_type {
            PartType::Original => groups[idx].original = Some(price),
            PartType::Duplicate => groups[idx].duplicate = Some(price),
        }
    }

    groups
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn price(
        problem: &str,
        part_type: PartType,
        base: i64,
        rate_bps: u32,
        amount: i64,
    ) -> RepairPrice {
        RepairPrice {
            id: format!("rp-{}-{}", problem, part_type),
            model_id: "model-1".to_string(),
            problem_id: problem.to_string(),
            part_type,
            base_price_cents: base,
            discount_rate_bps: rate_bps,
            discount_amount_cents: amount,
            in_stock: true,
            warranty_days: 90,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_final_price_scenario_a() {
        // base $100.00, 10% + $5.00 fixed → final $85.00, saved $15.00
        let p = price("p1", PartType::Original, 10_000, 1000, 500);
        assert_eq!(p.final_price().cents(), 8_500);
        assert_eq!(p.total_discount().cents(), 1_500);
    }

    #[test]
    fn test_final_price_clamped_scenario_c() {
        // base $20.00, 100% + $50.00 fixed → clamped to $0.00, never negative
        let p = price("p1", PartType::Original, 2_000, 10_000, 5_000);
        assert_eq!(p.final_price().cents(), 0);
        assert_eq!(p.total_discount().cents(), 2_000);
    }

    #[test]
    fn test_price_floor_holds_across_inputs() {
        for base in [0, 1, 99, 2_000, 10_000, 999_999] {
            for rate in [0, 1, 825, 5_000, 10_000] {
                for amount in [0, 50, 2_000, 100_000] {
                    let f = final_price(
                        Money::from_cents(base),
                        DiscountRate::from_bps(rate),
                        Money::from_cents(amount),
                    );
                    assert!(!f.is_negative(), "base={base} rate={rate} amount={amount}");
                    assert!(f.cents() <= base);
                }
            }
        }
    }

    #[test]
    fn test_discount_monotonicity() {
        let base = Money::from_cents(10_000);

        let mut last = i64::MAX;
        for rate in [0u32, 100, 500, 1000, 5000, 10_000] {
            let f = final_price(base, DiscountRate::from_bps(rate), Money::zero()).cents();
            assert!(f <= last, "raising the rate must never raise the price");
            last = f;
        }

        let mut last = i64::MAX;
        for amount in [0i64, 100, 500, 5_000, 10_000, 20_000] {
            let f = final_price(base, DiscountRate::zero(), Money::from_cents(amount)).cents();
            assert!(f <= last, "raising the fixed discount must never raise the price");
            last = f;
        }
    }

    #[test]
    fn test_order_totals_scenario_b() {
        // Lines: $100.00 → $85.00 and $50.00 → $40.00
        // subtotal $150.00, item discount $25.00, after items $125.00
        // site 5% + $0.00 → $6.25, total $118.75, total saved $31.25
        let lines = vec![
            LineQuote::from_price(&price("p1", PartType::Original, 10_000, 1000, 500)),
            LineQuote::from_price(&price("p2", PartType::Duplicate, 5_000, 1000, 500)),
        ];

        let totals = compute_order_totals(&lines, DiscountRate::from_bps(500), Money::zero());

        assert_eq!(totals.subtotal_cents, 15_000);
        assert_eq!(totals.item_discount_cents, 2_500);
        assert_eq!(totals.price_after_items_cents, 12_500);
        assert_eq!(totals.site_discount_cents, 625);
        assert_eq!(totals.total_cents, 11_875);
        assert_eq!(totals.total_discount_cents, 3_125);
    }

    #[test]
    fn test_order_totals_floor() {
        // Site discount larger than what's left after item discounts
        let lines = vec![LineQuote::from_price(&price(
            "p1",
            PartType::Original,
            2_000,
            0,
            0,
        ))];

        let totals =
            compute_order_totals(&lines, DiscountRate::from_bps(10_000), Money::from_cents(500));

        assert_eq!(totals.price_after_items_cents, 2_000);
        assert_eq!(totals.site_discount_cents, 2_500);
        assert_eq!(totals.total_cents, 0);
        assert_eq!(totals.total_discount_cents, 2_000);
    }

    #[test]
    fn test_order_totals_empty_selection_is_all_zero() {
        let totals = compute_order_totals(&[], DiscountRate::from_bps(500), Money::zero());
        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_duplicate_lines_priced_twice() {
        // Same (problem, part type) twice: both lines count, no dedup
        let quote = LineQuote::from_price(&price("p1", PartType::Original, 10_000, 1000, 500));
        let lines = vec![quote.clone(), quote];

        let totals = compute_order_totals(&lines, DiscountRate::zero(), Money::zero());
        assert_eq!(totals.subtotal_cents, 20_000);
        assert_eq!(totals.total_cents, 17_000);
    }

    #[test]
    fn test_group_by_problem_pairs_part_types() {
        let groups = group_by_problem(vec![
            price("screen", PartType::Original, 10_000, 0, 0),
            price("battery", PartType::Original, 5_000, 0, 0),
            price("screen", PartType::Duplicate, 6_000, 0, 0),
        ]);

        assert_eq!(groups.len(), 2);
        // First-appearance order is preserved
        assert_eq!(groups[0].problem_id, "screen");
        assert_eq!(groups[1].problem_id, "battery");

        assert!(groups[0].original.is_some());
        assert!(groups[0].duplicate.is_some());
        // Absent part type is None, not an error
        assert!(groups[1].original.is_some());
        assert!(groups[1].duplicate.is_none());
    }

    #[test]
    fn test_group_by_problem_is_deterministic() {
        let input = vec![
            price("screen", PartType::Original, 10_000, 0, 0),
            price("battery", PartType::Duplicate, 5_000, 0, 0),
            price("screen", PartType::Duplicate, 6_000, 0, 0),
        ];

        let a = group_by_problem(input.clone());
        let b = group_by_problem(input);

        let key = |gs: &[ProblemGroup]| -> Vec<(String, bool, bool)> {
            gs.iter()
                .map(|g| (g.problem_id.clone(), g.original.is_some(), g.duplicate.is_some()))
                .collect()
        };
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn test_preview_and_snapshot_agree() {
        // The quote a preview shows is byte-for-byte the snapshot an order
        // would freeze: both come from LineQuote::from_price.
        let p = price("p1", PartType::Original, 10_333, 825, 199);
        let quote_for_preview = LineQuote::from_price(&p);
        let quote_for_order = LineQuote::from_price(&p);
        assert_eq!(quote_for_preview, quote_for_order);
        // $103.33 − 8.25% ($8.52 rounded) − $1.99 = $92.82
        assert_eq!(quote_for_preview.final_price_cents, 9_282);
    }
}
