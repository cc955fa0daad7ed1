//! Rule applicability
//!
//! Decides whether a rule applies to an order. Amount math lives in
//! [`super::calculator`]; this module only answers yes/no.

use crate::db::models::{ChargeApplyTo, ChargeRule, InsurancePlan, TaxRule};
use crate::pricing::context::OrderContext;

/// A tax rule applies when enabled and its condition (if any) matches
pub fn tax_applies(rule: &TaxRule, ctx: &OrderContext) -> bool {
    if !rule.enabled {
        return false;
    }
    rule.condition.as_ref().is_none_or(|c| c.matches(ctx))
}

/// A charge applies when enabled, its payment gate passes, and its
/// condition (if any) matches. An order without a payment method passes
/// neither the COD nor the online gate.
pub fn charge_applies(rule: &ChargeRule, ctx: &OrderContext) -> bool {
    if !rule.enabled {
        return false;
    }
    let gate = match rule.apply_to {
        ChargeApplyTo::All | ChargeApplyTo::Conditional => true,
        ChargeApplyTo::CodOnly => ctx.is_cod(),
        ChargeApplyTo::OnlineOnly => ctx.is_online(),
        ChargeApplyTo::SpecificPaymentMethods => rule.payment_methods.as_ref().is_some_and(|ms| {
            ctx.payment_method
                .as_ref()
                .is_some_and(|m| ms.contains(m))
        }),
    };
    gate && rule.condition.as_ref().is_none_or(|c| c.matches(ctx))
}

/// A plan is eligible when enabled, the insured value falls inside its
/// value window (both bounds inclusive), and its condition (if any) matches
pub fn plan_eligible(plan: &InsurancePlan, ctx: &OrderContext) -> bool {
    if !plan.enabled {
        return false;
    }
    let value = ctx.insured_value();
    if value < plan.min_order_value {
        return false;
    }
    if plan.max_order_value.is_some_and(|max| value > max) {
        return false;
    }
    plan.condition.as_ref().is_none_or(|c| c.matches(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        ChargeType, Condition, TaxType, charge_rule::ChargeRuleCreate,
        insurance_plan::InsurancePlanCreate, tax_rule::TaxRuleCreate,
    };
    use rust_decimal::Decimal;
    use serde_json::json;

    fn make_charge(apply_to: ChargeApplyTo) -> ChargeRule {
        ChargeRuleCreate {
            name: "fee".to_string(),
            code: "fee".to_string(),
            description: None,
            charge_type: ChargeType::Fixed,
            amount: Some(Decimal::from(30)),
            percent: None,
            tiers: None,
            apply_to: Some(apply_to),
            payment_methods: None,
            condition: None,
            taxable: None,
            is_refundable: None,
            apply_after_discount: None,
            priority: None,
            enabled: None,
        }
        .into()
    }

    fn make_plan(min: i64, max: Option<i64>) -> InsurancePlan {
        InsurancePlanCreate {
            name: "cover".to_string(),
            code: "cover".to_string(),
            description: None,
            min_order_value: Decimal::from(min),
            max_order_value: max.map(Decimal::from),
            premium_percent: Decimal::from(1),
            min_premium: Decimal::from(20),
            max_premium: None,
            coverage_percentage: None,
            claim_processing_days: None,
            mandatory: None,
            condition: None,
            priority: None,
            enabled: None,
        }
        .into()
    }

    fn ctx(subtotal: i64, payment: Option<&str>) -> OrderContext {
        OrderContext {
            subtotal: Decimal::from(subtotal),
            payment_method: payment.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn payment_gates() {
        let cod = make_charge(ChargeApplyTo::CodOnly);
        assert!(charge_applies(&cod, &ctx(100, Some("cod"))));
        assert!(!charge_applies(&cod, &ctx(100, Some("card"))));
        assert!(!charge_applies(&cod, &ctx(100, None)));

        let online = make_charge(ChargeApplyTo::OnlineOnly);
        assert!(charge_applies(&online, &ctx(100, Some("card"))));
        assert!(!charge_applies(&online, &ctx(100, Some("cod"))));
        assert!(!charge_applies(&online, &ctx(100, None)));
    }

    #[test]
    fn specific_payment_methods_gate() {
        let mut rule = make_charge(ChargeApplyTo::SpecificPaymentMethods);
        rule.payment_methods = Some(vec!["wallet".to_string(), "upi".to_string()]);
        assert!(charge_applies(&rule, &ctx(100, Some("upi"))));
        assert!(!charge_applies(&rule, &ctx(100, Some("card"))));
        assert!(!charge_applies(&rule, &ctx(100, None)));
    }

    #[test]
    fn disabled_rule_never_applies() {
        let mut rule = make_charge(ChargeApplyTo::All);
        rule.enabled = false;
        assert!(!charge_applies(&rule, &ctx(100, None)));
    }

    #[test]
    fn condition_gates_tax() {
        let mut rule: TaxRule = TaxRuleCreate {
            name: "GST".to_string(),
            code: "gst".to_string(),
            description: None,
            display_label: None,
            tax_type: TaxType::Gst,
            rate: Decimal::from(18),
            base: None,
            inclusive: None,
            apply_after_discount: None,
            priority: None,
            condition: None,
            enabled: None,
        }
        .into();
        assert!(tax_applies(&rule, &ctx(100, None)));

        let cond: Condition = serde_json::from_value(
            json!({"field": "subtotal", "op": "gte", "value": 500}),
        )
        .unwrap();
        rule.condition = Some(cond);
        assert!(!tax_applies(&rule, &ctx(100, None)));
        assert!(tax_applies(&rule, &ctx(500, None)));
    }

    #[test]
    fn plan_value_window_inclusive() {
        let plan = make_plan(500, Some(5000));
        assert!(!plan_eligible(&plan, &ctx(499, None)));
        assert!(plan_eligible(&plan, &ctx(500, None)));
        assert!(plan_eligible(&plan, &ctx(5000, None)));
        assert!(!plan_eligible(&plan, &ctx(5001, None)));
    }

    #[test]
    fn declared_value_overrides_subtotal() {
        let plan = make_plan(500, None);
        let mut c = ctx(100, None);
        assert!(!plan_eligible(&plan, &c));
        c.declared_value = Some(Decimal::from(800));
        assert!(plan_eligible(&plan, &c));
    }
}
