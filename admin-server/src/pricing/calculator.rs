//! Amount math
//!
//! Pure Decimal arithmetic for charges, taxes and premiums. Nothing here is
//! rounded except through [`round_money`], which the composer calls exactly
//! once per finalized line.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::db::models::{ChargeRule, ChargeTier, ChargeType, InsurancePlan, TaxRule};
use crate::pricing::EvaluationError;
use crate::pricing::context::OrderContext;

/// Money precision for finalized amounts
pub const DECIMAL_PLACES: u32 = 2;

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Round half away from zero to money precision
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Unrounded amount of an applied charge
pub fn charge_amount(rule: &ChargeRule, ctx: &OrderContext) -> Result<Decimal, EvaluationError> {
    match rule.charge_type {
        ChargeType::Fixed => rule.amount.ok_or(EvaluationError::MissingRequiredField {
            rule: rule.code.clone(),
            field: "amount",
        }),
        ChargeType::Percentage => {
            let percent = rule.percent.ok_or(EvaluationError::MissingRequiredField {
                rule: rule.code.clone(),
                field: "percent",
            })?;
            Ok(ctx.subtotal * percent / HUNDRED)
        }
        ChargeType::Tiered => {
            let tiers = rule
                .tiers
                .as_ref()
                .ok_or(EvaluationError::MissingRequiredField {
                    rule: rule.code.clone(),
                    field: "tiers",
                })?;
            Ok(tiered_amount(tiers, ctx.subtotal))
        }
    }
}

/// The tier with the greatest threshold not exceeding the base wins (the
/// boundary itself belongs to the higher tier). A base below the smallest
/// threshold yields zero.
pub fn tiered_amount(tiers: &[ChargeTier], base: Decimal) -> Decimal {
    tiers
        .iter()
        .filter(|t| t.threshold <= base)
        .max_by(|a, b| a.threshold.cmp(&b.threshold))
        .map(|t| t.amount)
        .unwrap_or(Decimal::ZERO)
}

/// Unrounded tax amount for a base.
///
/// Exclusive taxes add `base * rate / 100` on top. Inclusive taxes back the
/// contained tax out of the base, `base - base / (1 + rate/100)`, and are
/// reported without being added to the total.
pub fn tax_amount(rule: &TaxRule, base: Decimal) -> Decimal {
    if rule.inclusive {
        base - base / (Decimal::ONE + rule.rate / HUNDRED)
    } else {
        base * rule.rate / HUNDRED
    }
}

/// Unrounded premium for an insured value: percentage of value, clamped to
/// the plan's `[min_premium, max_premium]` band
pub fn premium(plan: &InsurancePlan, value: Decimal) -> Decimal {
    let raw = value * plan.premium_percent / HUNDRED;
    let floored = raw.max(plan.min_premium);
    match plan.max_premium {
        Some(cap) => floored.min(cap),
        None => floored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::insurance_plan::InsurancePlanCreate;

    fn tier(threshold: i64, amount: i64) -> ChargeTier {
        ChargeTier {
            threshold: Decimal::from(threshold),
            amount: Decimal::from(amount),
        }
    }

    fn make_plan() -> InsurancePlan {
        InsurancePlanCreate {
            name: "Standard cover".to_string(),
            code: "standard".to_string(),
            description: None,
            min_order_value: Decimal::from(500),
            max_order_value: Some(Decimal::from(5000)),
            premium_percent: Decimal::from(1),
            min_premium: Decimal::from(20),
            max_premium: Some(Decimal::from(200)),
            coverage_percentage: None,
            claim_processing_days: None,
            mandatory: None,
            condition: None,
            priority: None,
            enabled: None,
        }
        .into()
    }

    #[test]
    fn tier_boundary_belongs_to_higher_tier() {
        let tiers = vec![tier(0, 0), tier(500, 20), tier(1000, 40)];
        assert_eq!(tiered_amount(&tiers, Decimal::from(499)), Decimal::from(0));
        assert_eq!(tiered_amount(&tiers, Decimal::from(500)), Decimal::from(20));
        assert_eq!(tiered_amount(&tiers, Decimal::from(999)), Decimal::from(20));
        assert_eq!(
            tiered_amount(&tiers, Decimal::from(1000)),
            Decimal::from(40)
        );
    }

    #[test]
    fn base_below_smallest_threshold_is_zero() {
        let tiers = vec![tier(500, 20), tier(1000, 40)];
        assert_eq!(tiered_amount(&tiers, Decimal::from(499)), Decimal::ZERO);
    }

    #[test]
    fn inclusive_tax_backs_out_of_base() {
        let rule = TaxRule {
            id: None,
            name: "VAT incl".to_string(),
            code: "vat".to_string(),
            description: None,
            display_label: None,
            tax_type: crate::db::models::TaxType::Vat,
            rate: Decimal::from(18),
            base: Default::default(),
            inclusive: true,
            apply_after_discount: true,
            priority: 0,
            condition: None,
            enabled: true,
            created_at: 0,
            updated_at: 0,
        };
        // 1180 contains exactly 180 of 18% tax
        assert_eq!(tax_amount(&rule, Decimal::from(1180)), Decimal::from(180));
    }

    #[test]
    fn premium_clamped_to_band() {
        let plan = make_plan();
        // 1% of 10000 = 100, inside the band
        assert_eq!(premium(&plan, Decimal::from(10000)), Decimal::from(100));
        // 1% of 1000 = 10, floored to 20
        assert_eq!(premium(&plan, Decimal::from(1000)), Decimal::from(20));
        // 1% of 50000 = 500, capped at 200
        assert_eq!(premium(&plan, Decimal::from(50000)), Decimal::from(200));
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_money("10.005".parse().unwrap()), "10.01".parse().unwrap());
        assert_eq!(round_money("10.004".parse().unwrap()), "10.00".parse().unwrap());
        assert_eq!(
            round_money("-10.005".parse::<Decimal>().unwrap()),
            "-10.01".parse::<Decimal>().unwrap()
        );
    }
}
