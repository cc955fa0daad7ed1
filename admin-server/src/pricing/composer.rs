//! Breakdown composition
//!
//! Runs the full quote: applicable charges first, then taxes on their
//! bases, then insurance selection. Each line is rounded exactly once when
//! finalized, and totals sum the rounded lines so the grand total always
//! equals what the breakdown displays.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::models::{InsurancePlan, TaxBase};
use crate::pricing::EvaluationError;
use crate::pricing::calculator::{charge_amount, premium, round_money, tax_amount};
use crate::pricing::context::OrderContext;
use crate::pricing::matcher::{charge_applies, plan_eligible, tax_applies};
use crate::pricing::schedule::SurchargeSchedule;
use crate::pricing::snapshot::RuleSnapshot;

/// Charge code feeding the SUBTOTAL_WITH_SHIPPING tax base
pub const SHIPPING_CODE: &str = "shipping";

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// One applied charge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChargeLine {
    pub code: String,
    pub name: String,
    pub amount: Decimal,
    pub taxable: bool,
}

/// One applied tax
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxLine {
    pub code: String,
    pub name: String,
    pub rate: Decimal,
    pub base: TaxBase,
    pub base_amount: Decimal,
    pub amount: Decimal,
    /// Inclusive amounts are informational, never added to the total
    pub inclusive: bool,
}

/// The applied insurance plan, if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsuranceLine {
    pub code: String,
    pub name: String,
    pub premium: Decimal,
    pub mandatory: bool,
    /// True when the engine chose the plan rather than the customer
    pub auto_applied: bool,
}

/// Complete quote breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Breakdown {
    pub subtotal: Decimal,
    pub charges: Vec<ChargeLine>,
    pub charges_total: Decimal,
    pub taxes: Vec<TaxLine>,
    /// Sum of exclusive tax lines only
    pub taxes_total: Decimal,
    /// Sum of inclusive tax lines, reported but not added
    pub inclusive_tax_total: Decimal,
    pub insurance: Option<InsuranceLine>,
    pub grand_total: Decimal,
}

/// Evaluate one order against a rule snapshot.
///
/// `ctx.subtotal` is already discount-adjusted; nothing here revisits
/// discounts. Rules run in snapshot order (priority ascending, id as the
/// tiebreaker). Insurance premiums are never taxed, so taxes are computed
/// before the premium and never see it.
pub fn evaluate(
    ctx: &OrderContext,
    snapshot: &RuleSnapshot,
    schedule: &dyn SurchargeSchedule,
) -> Result<Breakdown, EvaluationError> {
    // Charges. Zero-amount lines stay in the breakdown so a quote shows
    // every rule that fired.
    let mut charges = Vec::new();
    for rule in snapshot.charges.iter() {
        if !charge_applies(rule, ctx) {
            continue;
        }
        let amount = round_money(charge_amount(rule, ctx)?);
        charges.push(ChargeLine {
            code: rule.code.clone(),
            name: rule.name.clone(),
            amount,
            taxable: rule.taxable,
        });
    }
    let charges_total: Decimal = charges.iter().map(|l| l.amount).sum();
    let taxable_charges: Decimal = charges
        .iter()
        .filter(|l| l.taxable)
        .map(|l| l.amount)
        .sum();
    let shipping_charges: Decimal = charges
        .iter()
        .filter(|l| l.code == SHIPPING_CODE)
        .map(|l| l.amount)
        .sum();

    // Taxes
    let mut taxes = Vec::new();
    for rule in snapshot.taxes.iter() {
        if !tax_applies(rule, ctx) {
            continue;
        }
        let base_amount = match rule.base {
            TaxBase::Subtotal => ctx.subtotal,
            TaxBase::SubtotalWithCharges => ctx.subtotal + taxable_charges,
            TaxBase::SubtotalWithShipping => ctx.subtotal + shipping_charges,
        };
        let amount = round_money(tax_amount(rule, base_amount));
        taxes.push(TaxLine {
            code: rule.code.clone(),
            name: rule.name.clone(),
            rate: rule.rate,
            base: rule.base,
            base_amount,
            amount,
            inclusive: rule.inclusive,
        });
    }
    let taxes_total: Decimal = taxes
        .iter()
        .filter(|l| !l.inclusive)
        .map(|l| l.amount)
        .sum();
    let inclusive_tax_total: Decimal = taxes
        .iter()
        .filter(|l| l.inclusive)
        .map(|l| l.amount)
        .sum();

    // Insurance
    let insurance = select_insurance(ctx, &snapshot.plans, schedule)?;
    let premium_total = insurance
        .as_ref()
        .map(|l| l.premium)
        .unwrap_or(Decimal::ZERO);

    let grand_total = ctx.subtotal + charges_total + taxes_total + premium_total;

    Ok(Breakdown {
        subtotal: ctx.subtotal,
        charges,
        charges_total,
        taxes,
        taxes_total,
        inclusive_tax_total,
        insurance,
        grand_total,
    })
}

/// Resolve which plan (if any) covers the order.
///
/// Exactly one mandatory eligible plan auto-applies and overrides any
/// explicit selection; two or more is a configuration conflict. Optional
/// plans only apply through an explicit selection, which must name an
/// eligible plan. Several eligible optional plans with nothing selected is
/// surfaced as an error so the caller knows to present the choice.
fn select_insurance(
    ctx: &OrderContext,
    plans: &[InsurancePlan],
    schedule: &dyn SurchargeSchedule,
) -> Result<Option<InsuranceLine>, EvaluationError> {
    let eligible: Vec<&InsurancePlan> = plans.iter().filter(|p| plan_eligible(p, ctx)).collect();
    let mandatory: Vec<&InsurancePlan> =
        eligible.iter().copied().filter(|p| p.mandatory).collect();

    if mandatory.len() > 1 {
        return Err(EvaluationError::ConflictingMandatoryPlans(
            mandatory.iter().map(|p| p.code.clone()).collect(),
        ));
    }

    let (plan, auto_applied) = if let Some(plan) = mandatory.first() {
        (*plan, true)
    } else if let Some(selected) = &ctx.selected_plan {
        match eligible.iter().find(|p| &p.code == selected) {
            Some(plan) => (*plan, false),
            None => return Err(EvaluationError::UnknownSelectedPlan(selected.clone())),
        }
    } else {
        if eligible.len() > 1 {
            return Err(EvaluationError::UnresolvedInsuranceSelection(
                eligible.iter().map(|p| p.code.clone()).collect(),
            ));
        }
        // A single eligible optional plan still needs the customer to opt in
        return Ok(None);
    };

    // Uplift applies after the clamp so the band bounds the base premium,
    // not the risk-adjusted one
    let base = premium(plan, ctx.insured_value());
    let uplift = schedule.uplift_percent(plan, ctx);
    let final_premium = round_money(base * (Decimal::ONE + uplift / HUNDRED));

    Ok(Some(InsuranceLine {
        code: plan.code.clone(),
        name: plan.name.clone(),
        premium: final_premium,
        mandatory: plan.mandatory,
        auto_applied,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        ChargeApplyTo, ChargeRule, ChargeType, TaxRule, TaxType,
        charge_rule::ChargeRuleCreate, insurance_plan::InsurancePlanCreate,
        tax_rule::TaxRuleCreate,
    };
    use crate::pricing::schedule::{FlatSchedule, NoSurcharge};

    fn make_tax(code: &str, rate: i64, base: TaxBase, inclusive: bool) -> TaxRule {
        TaxRuleCreate {
            name: code.to_string(),
            code: code.to_string(),
            description: None,
            display_label: None,
            tax_type: TaxType::Gst,
            rate: Decimal::from(rate),
            base: Some(base),
            inclusive: Some(inclusive),
            apply_after_discount: None,
            priority: None,
            condition: None,
            enabled: None,
        }
        .into()
    }

    fn make_percent_charge(code: &str, percent: i64, taxable: bool) -> ChargeRule {
        ChargeRuleCreate {
            name: code.to_string(),
            code: code.to_string(),
            description: None,
            charge_type: ChargeType::Percentage,
            amount: None,
            percent: Some(Decimal::from(percent)),
            tiers: None,
            apply_to: Some(ChargeApplyTo::All),
            payment_methods: None,
            condition: None,
            taxable: Some(taxable),
            is_refundable: None,
            apply_after_discount: None,
            priority: None,
            enabled: None,
        }
        .into()
    }

    fn make_plan(code: &str, mandatory: bool) -> InsurancePlan {
        InsurancePlanCreate {
            name: code.to_string(),
            code: code.to_string(),
            description: None,
            min_order_value: Decimal::from(500),
            max_order_value: Some(Decimal::from(5000)),
            premium_percent: Decimal::from(1),
            min_premium: Decimal::from(20),
            max_premium: Some(Decimal::from(200)),
            coverage_percentage: None,
            claim_processing_days: None,
            mandatory: Some(mandatory),
            condition: None,
            priority: None,
            enabled: None,
        }
        .into()
    }

    fn ctx(subtotal: i64) -> OrderContext {
        OrderContext {
            subtotal: Decimal::from(subtotal),
            ..Default::default()
        }
    }

    #[test]
    fn charge_then_tax_on_subtotal_with_charges() {
        // 1000 subtotal, 5% taxable charge = 50, 18% tax on 1050 = 189
        let snapshot = RuleSnapshot::new(
            vec![make_tax("gst", 18, TaxBase::SubtotalWithCharges, false)],
            vec![make_percent_charge("handling", 5, true)],
            vec![],
        );
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();

        assert_eq!(result.charges_total, Decimal::from(50));
        assert_eq!(result.taxes[0].base_amount, Decimal::from(1050));
        assert_eq!(result.taxes_total, Decimal::from(189));
        assert_eq!(result.grand_total, Decimal::from(1239));
    }

    #[test]
    fn non_taxable_charge_stays_out_of_tax_base() {
        let snapshot = RuleSnapshot::new(
            vec![make_tax("gst", 18, TaxBase::SubtotalWithCharges, false)],
            vec![make_percent_charge("cod_fee", 5, false)],
            vec![],
        );
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();

        // Charge still collected, but the tax base is the bare subtotal
        assert_eq!(result.charges_total, Decimal::from(50));
        assert_eq!(result.taxes[0].base_amount, Decimal::from(1000));
        assert_eq!(result.taxes_total, Decimal::from(180));
        assert_eq!(result.grand_total, Decimal::from(1230));
    }

    #[test]
    fn inclusive_tax_reported_not_added() {
        let snapshot = RuleSnapshot::new(
            vec![make_tax("vat", 18, TaxBase::Subtotal, true)],
            vec![],
            vec![],
        );
        let result = evaluate(&ctx(1180), &snapshot, &NoSurcharge).unwrap();

        assert_eq!(result.inclusive_tax_total, Decimal::from(180));
        assert_eq!(result.taxes_total, Decimal::ZERO);
        assert_eq!(result.grand_total, Decimal::from(1180));
    }

    #[test]
    fn optional_plan_needs_explicit_selection() {
        // One eligible optional plan, nothing selected: no cover
        let snapshot = RuleSnapshot::new(vec![], vec![], vec![make_plan("standard", false)]);
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();
        assert!(result.insurance.is_none());
        assert_eq!(result.grand_total, Decimal::from(1000));

        // Opting in applies it
        let mut c = ctx(1000);
        c.selected_plan = Some("standard".to_string());
        let result = evaluate(&c, &snapshot, &NoSurcharge).unwrap();
        let line = result.insurance.unwrap();
        assert_eq!(line.code, "standard");
        assert!(!line.auto_applied);
        // 1% of 1000 = 10, floored to the 20 minimum
        assert_eq!(line.premium, Decimal::from(20));
        assert_eq!(result.grand_total, Decimal::from(1020));
    }

    #[test]
    fn mandatory_plan_applies_without_selection() {
        let snapshot = RuleSnapshot::new(vec![], vec![], vec![make_plan("transit", true)]);
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();

        let line = result.insurance.unwrap();
        assert_eq!(line.code, "transit");
        assert!(line.mandatory);
        assert!(line.auto_applied);
        assert_eq!(result.grand_total, Decimal::from(1020));
    }

    #[test]
    fn two_plans_require_selection() {
        let snapshot = RuleSnapshot::new(
            vec![],
            vec![],
            vec![make_plan("a", false), make_plan("b", false)],
        );
        let err = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::UnresolvedInsuranceSelection(vec![
                "a".to_string(),
                "b".to_string()
            ])
        );

        let mut c = ctx(1000);
        c.selected_plan = Some("b".to_string());
        let result = evaluate(&c, &snapshot, &NoSurcharge).unwrap();
        let line = result.insurance.unwrap();
        assert_eq!(line.code, "b");
        assert!(!line.auto_applied);
    }

    #[test]
    fn selection_must_be_eligible() {
        let snapshot = RuleSnapshot::new(vec![], vec![], vec![make_plan("a", false)]);
        let mut c = ctx(1000);
        c.selected_plan = Some("premium".to_string());
        let err = evaluate(&c, &snapshot, &NoSurcharge).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::UnknownSelectedPlan("premium".to_string())
        );
    }

    #[test]
    fn mandatory_plan_overrides_selection() {
        let snapshot = RuleSnapshot::new(
            vec![],
            vec![],
            vec![make_plan("forced", true), make_plan("optional", false)],
        );
        let mut c = ctx(1000);
        c.selected_plan = Some("optional".to_string());
        let result = evaluate(&c, &snapshot, &NoSurcharge).unwrap();
        let line = result.insurance.unwrap();
        assert_eq!(line.code, "forced");
        assert!(line.mandatory);
        assert!(line.auto_applied);
    }

    #[test]
    fn conflicting_mandatory_plans_error() {
        let snapshot = RuleSnapshot::new(
            vec![],
            vec![],
            vec![make_plan("a", true), make_plan("b", true)],
        );
        let err = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::ConflictingMandatoryPlans(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn premium_never_taxed() {
        // Tax on SUBTOTAL_WITH_CHARGES must not see the premium
        let snapshot = RuleSnapshot::new(
            vec![make_tax("gst", 18, TaxBase::SubtotalWithCharges, false)],
            vec![],
            vec![make_plan("standard", true)],
        );
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();
        assert_eq!(result.taxes[0].base_amount, Decimal::from(1000));
        assert_eq!(result.taxes_total, Decimal::from(180));
        // 1000 + 180 tax + 20 premium
        assert_eq!(result.grand_total, Decimal::from(1200));
    }

    #[test]
    fn uplift_applies_after_clamp() {
        let snapshot = RuleSnapshot::new(vec![], vec![], vec![make_plan("standard", false)]);
        let schedule = FlatSchedule {
            remote_percent: Decimal::from(10),
            ..Default::default()
        };
        let mut c = ctx(1000);
        c.is_remote = true;
        c.selected_plan = Some("standard".to_string());
        let result = evaluate(&c, &snapshot, &schedule).unwrap();
        // clamp first (10 -> 20), then +10%
        assert_eq!(result.insurance.unwrap().premium, Decimal::from(22));
    }

    #[test]
    fn zero_amount_charge_line_included() {
        let rule = make_percent_charge("handling", 0, false);
        let snapshot = RuleSnapshot::new(vec![], vec![rule], vec![]);
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();
        assert_eq!(result.charges.len(), 1);
        assert_eq!(result.charges[0].amount, Decimal::ZERO);
    }

    #[test]
    fn shipping_base_uses_shipping_code() {
        let mut shipping = make_percent_charge(SHIPPING_CODE, 5, false);
        shipping.name = "Shipping".to_string();
        let other = make_percent_charge("handling", 5, false);
        let snapshot = RuleSnapshot::new(
            vec![make_tax("gst", 18, TaxBase::SubtotalWithShipping, false)],
            vec![shipping, other],
            vec![],
        );
        let result = evaluate(&ctx(1000), &snapshot, &NoSurcharge).unwrap();
        // Base = 1000 + 50 shipping, not the other charge
        assert_eq!(result.taxes[0].base_amount, Decimal::from(1050));
    }

    #[test]
    fn lines_rounded_once_and_totals_sum_lines() {
        // 3% of 10.33 = 0.3099 -> 0.31; total must equal the displayed line
        let snapshot = RuleSnapshot::new(
            vec![],
            vec![make_percent_charge("handling", 3, false)],
            vec![],
        );
        let c = OrderContext {
            subtotal: "10.33".parse().unwrap(),
            ..Default::default()
        };
        let result = evaluate(&c, &snapshot, &NoSurcharge).unwrap();
        assert_eq!(result.charges[0].amount, "0.31".parse::<Decimal>().unwrap());
        assert_eq!(result.charges_total, "0.31".parse::<Decimal>().unwrap());
        assert_eq!(result.grand_total, "10.64".parse::<Decimal>().unwrap());
    }
}
