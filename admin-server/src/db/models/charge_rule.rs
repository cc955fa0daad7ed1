//! Charge Rule Model
//!
//! Charges cover shipping, handling, COD fees and similar order-level fees.
//! A charge computes its amount in one of three ways (fixed, percentage,
//! tiered) and gates applicability by payment method and/or condition tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::condition::Condition;
use super::serde_helpers;
use crate::utils::time::now_millis;

/// Amount computation kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeType {
    Fixed,
    Percentage,
    Tiered,
}

/// Payment-method gate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeApplyTo {
    #[default]
    All,
    CodOnly,
    OnlineOnly,
    SpecificPaymentMethods,
    Conditional,
}

/// One tier of a tiered charge. The tier with the greatest threshold that is
/// less than or equal to the base amount wins; a base below the smallest
/// threshold yields zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChargeTier {
    pub threshold: Decimal,
    pub amount: Decimal,
}

/// Charge rule entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRule {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Stable machine code, unique across charge rules.
    /// Rules with code "shipping" feed the SUBTOTAL_WITH_SHIPPING tax base.
    pub code: String,
    pub description: Option<String>,
    pub charge_type: ChargeType,
    /// Fixed amount (FIXED only)
    pub amount: Option<Decimal>,
    /// Percentage of the subtotal (PERCENTAGE only, 5 means 5%)
    pub percent: Option<Decimal>,
    /// Tier table (TIERED only), sorted ascending by threshold
    pub tiers: Option<Vec<ChargeTier>>,
    #[serde(default)]
    pub apply_to: ChargeApplyTo,
    /// Payment method codes (SPECIFIC_PAYMENT_METHODS only)
    pub payment_methods: Option<Vec<String>>,
    pub condition: Option<Condition>,
    /// Taxable charges feed the SUBTOTAL_WITH_CHARGES tax base
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub taxable: bool,
    /// Refunded with the order on cancellation
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_refundable: bool,
    /// Evaluated against the discount-adjusted subtotal when set
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub apply_after_discount: bool,
    #[serde(default)]
    pub priority: u32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub enabled: bool,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
    /// Updated timestamp (milliseconds since epoch)
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create charge rule payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChargeRuleCreate {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub description: Option<String>,
    pub charge_type: ChargeType,
    pub amount: Option<Decimal>,
    pub percent: Option<Decimal>,
    pub tiers: Option<Vec<ChargeTier>>,
    pub apply_to: Option<ChargeApplyTo>,
    pub payment_methods: Option<Vec<String>>,
    pub condition: Option<Condition>,
    pub taxable: Option<bool>,
    pub is_refundable: Option<bool>,
    pub apply_after_discount: Option<bool>,
    pub priority: Option<u32>,
    pub enabled: Option<bool>,
}

/// Checks shared by create and update: the amount fields must match the
/// charge type, and tier tables must be well-formed.
fn check_amount_fields(
    charge_type: ChargeType,
    amount: &Option<Decimal>,
    percent: &Option<Decimal>,
    tiers: &Option<Vec<ChargeTier>>,
) -> Result<(), String> {
    match charge_type {
        ChargeType::Fixed => {
            let Some(amount) = amount else {
                return Err("FIXED charge requires 'amount'".to_string());
            };
            if *amount < Decimal::ZERO {
                return Err("amount must not be negative".to_string());
            }
            if percent.is_some() || tiers.is_some() {
                return Err("FIXED charge must not set 'percent' or 'tiers'".to_string());
            }
        }
        ChargeType::Percentage => {
            let Some(percent) = percent else {
                return Err("PERCENTAGE charge requires 'percent'".to_string());
            };
            if *percent < Decimal::ZERO {
                return Err("percent must not be negative".to_string());
            }
            if *percent > Decimal::from(100) {
                return Err("percent must not exceed 100".to_string());
            }
            if amount.is_some() || tiers.is_some() {
                return Err("PERCENTAGE charge must not set 'amount' or 'tiers'".to_string());
            }
        }
        ChargeType::Tiered => {
            let Some(tiers) = tiers else {
                return Err("TIERED charge requires 'tiers'".to_string());
            };
            if tiers.is_empty() {
                return Err("tier table must not be empty".to_string());
            }
            for pair in tiers.windows(2) {
                if pair[0].threshold >= pair[1].threshold {
                    return Err("tier thresholds must be strictly ascending".to_string());
                }
            }
            if tiers
                .iter()
                .any(|t| t.threshold < Decimal::ZERO || t.amount < Decimal::ZERO)
            {
                return Err("tier thresholds and amounts must not be negative".to_string());
            }
            if amount.is_some() || percent.is_some() {
                return Err("TIERED charge must not set 'amount' or 'percent'".to_string());
            }
        }
    }
    Ok(())
}

fn check_apply_to(
    apply_to: ChargeApplyTo,
    payment_methods: &Option<Vec<String>>,
    condition: &Option<Condition>,
) -> Result<(), String> {
    match apply_to {
        ChargeApplyTo::SpecificPaymentMethods => {
            if payment_methods.as_ref().is_none_or(|m| m.is_empty()) {
                return Err(
                    "SPECIFIC_PAYMENT_METHODS requires a non-empty 'payment_methods'".to_string(),
                );
            }
        }
        ChargeApplyTo::Conditional => {
            if condition.is_none() {
                return Err("CONDITIONAL charge requires a 'condition'".to_string());
            }
        }
        _ => {}
    }
    if let Some(cond) = condition {
        cond.validate()?;
    }
    Ok(())
}

impl ChargeRuleCreate {
    pub fn validate_semantics(&self) -> Result<(), String> {
        check_amount_fields(self.charge_type, &self.amount, &self.percent, &self.tiers)?;
        check_apply_to(
            self.apply_to.unwrap_or_default(),
            &self.payment_methods,
            &self.condition,
        )
    }
}

impl From<ChargeRuleCreate> for ChargeRule {
    fn from(c: ChargeRuleCreate) -> Self {
        let now = now_millis();
        ChargeRule {
            id: None,
            name: c.name,
            code: c.code,
            description: c.description,
            charge_type: c.charge_type,
            amount: c.amount,
            percent: c.percent,
            tiers: c.tiers,
            apply_to: c.apply_to.unwrap_or_default(),
            payment_methods: c.payment_methods,
            condition: c.condition,
            taxable: c.taxable.unwrap_or(false),
            is_refundable: c.is_refundable.unwrap_or(false),
            apply_after_discount: c.apply_after_discount.unwrap_or(true),
            priority: c.priority.unwrap_or(0),
            enabled: c.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update charge rule payload
///
/// The amount fields travel together, so updates are merged onto the
/// existing record first and validated as a whole. Changing `charge_type`
/// drops the old type's amount fields; the new type's fields must be sent
/// in the same request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ChargeRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_type: Option<ChargeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<ChargeTier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_to: Option<ChargeApplyTo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_refundable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_after_discount: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Always bumped server-side
    pub updated_at: Option<i64>,
}

impl ChargeRuleUpdate {
    /// Merge onto the existing record, producing the full replacement
    pub fn merge(&self, existing: &ChargeRule) -> ChargeRule {
        let mut merged = existing.clone();
        if let Some(charge_type) = self.charge_type
            && charge_type != existing.charge_type
        {
            merged.charge_type = charge_type;
            merged.amount = None;
            merged.percent = None;
            merged.tiers = None;
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(amount) = self.amount {
            merged.amount = Some(amount);
        }
        if let Some(percent) = self.percent {
            merged.percent = Some(percent);
        }
        if let Some(tiers) = &self.tiers {
            merged.tiers = Some(tiers.clone());
        }
        if let Some(apply_to) = self.apply_to {
            merged.apply_to = apply_to;
        }
        if let Some(methods) = &self.payment_methods {
            merged.payment_methods = Some(methods.clone());
        }
        if let Some(condition) = &self.condition {
            merged.condition = Some(condition.clone());
        }
        if let Some(taxable) = self.taxable {
            merged.taxable = taxable;
        }
        if let Some(is_refundable) = self.is_refundable {
            merged.is_refundable = is_refundable;
        }
        if let Some(apply_after_discount) = self.apply_after_discount {
            merged.apply_after_discount = apply_after_discount;
        }
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(enabled) = self.enabled {
            merged.enabled = enabled;
        }
        merged
    }
}

impl ChargeRule {
    /// Re-check invariants on the merged record before an update lands
    pub fn validate_semantics(&self) -> Result<(), String> {
        check_amount_fields(self.charge_type, &self.amount, &self.percent, &self.tiers)?;
        check_apply_to(self.apply_to, &self.payment_methods, &self.condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_create(charge_type: ChargeType) -> ChargeRuleCreate {
        ChargeRuleCreate {
            name: "COD fee".to_string(),
            code: "cod_fee".to_string(),
            description: None,
            charge_type,
            amount: None,
            percent: None,
            tiers: None,
            apply_to: None,
            payment_methods: None,
            condition: None,
            taxable: None,
            is_refundable: None,
            apply_after_discount: None,
            priority: None,
            enabled: None,
        }
    }

    #[test]
    fn fixed_requires_amount_only() {
        let mut c = make_create(ChargeType::Fixed);
        assert!(c.validate_semantics().is_err());

        c.amount = Some(Decimal::from(30));
        assert!(c.validate_semantics().is_ok());

        c.percent = Some(Decimal::from(5));
        assert!(c.validate_semantics().is_err());
    }

    #[test]
    fn percent_must_stay_in_range() {
        let mut c = make_create(ChargeType::Percentage);
        c.percent = Some(Decimal::from(120));
        assert!(c.validate_semantics().is_err());

        c.percent = Some(Decimal::from(100));
        assert!(c.validate_semantics().is_ok());
    }

    #[test]
    fn refund_and_discount_defaults() {
        let rule: ChargeRule = {
            let mut c = make_create(ChargeType::Fixed);
            c.amount = Some(Decimal::from(30));
            c
        }
        .into();
        assert!(!rule.is_refundable);
        assert!(rule.apply_after_discount);
    }

    #[test]
    fn tiers_must_be_sorted_and_non_empty() {
        let mut c = make_create(ChargeType::Tiered);
        c.tiers = Some(vec![]);
        assert!(c.validate_semantics().is_err());

        c.tiers = Some(vec![
            ChargeTier {
                threshold: Decimal::from(500),
                amount: Decimal::from(20),
            },
            ChargeTier {
                threshold: Decimal::from(0),
                amount: Decimal::from(0),
            },
        ]);
        assert!(c.validate_semantics().is_err());

        c.tiers = Some(vec![
            ChargeTier {
                threshold: Decimal::from(0),
                amount: Decimal::from(0),
            },
            ChargeTier {
                threshold: Decimal::from(500),
                amount: Decimal::from(20),
            },
        ]);
        assert!(c.validate_semantics().is_ok());
    }

    #[test]
    fn specific_payment_methods_requires_list() {
        let mut c = make_create(ChargeType::Fixed);
        c.amount = Some(Decimal::from(10));
        c.apply_to = Some(ChargeApplyTo::SpecificPaymentMethods);
        assert!(c.validate_semantics().is_err());

        c.payment_methods = Some(vec!["wallet".to_string()]);
        assert!(c.validate_semantics().is_ok());
    }

    #[test]
    fn conditional_requires_condition() {
        let mut c = make_create(ChargeType::Fixed);
        c.amount = Some(Decimal::from(10));
        c.apply_to = Some(ChargeApplyTo::Conditional);
        assert!(c.validate_semantics().is_err());
    }
}
