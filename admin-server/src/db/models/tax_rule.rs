//! Tax Rule Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::condition::Condition;
use super::serde_helpers;
use crate::utils::time::now_millis;

/// Tax category enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxType {
    Gst,
    Igst,
    CgstSgst,
    Vat,
    SalesTax,
    Custom,
}

/// Base amount a tax rate is applied to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxBase {
    #[default]
    Subtotal,
    SubtotalWithCharges,
    SubtotalWithShipping,
}

/// Tax rule entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRule {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Stable machine code, unique across tax rules
    pub code: String,
    pub description: Option<String>,
    /// Customer-facing label on invoices, falls back to `name` when unset
    pub display_label: Option<String>,
    pub tax_type: TaxType,
    /// Percentage rate (18 means 18%)
    pub rate: Decimal,
    #[serde(default)]
    pub base: TaxBase,
    /// Inclusive taxes are reported as contained in the base, never added
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub inclusive: bool,
    /// Evaluated against the discount-adjusted subtotal when set
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub apply_after_discount: bool,
    #[serde(default)]
    pub priority: u32,
    pub condition: Option<Condition>,
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

/// Create tax rule payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaxRuleCreate {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub display_label: Option<String>,
    pub tax_type: TaxType,
    pub rate: Decimal,
    pub base: Option<TaxBase>,
    pub inclusive: Option<bool>,
    pub apply_after_discount: Option<bool>,
    pub priority: Option<u32>,
    pub condition: Option<Condition>,
    pub enabled: Option<bool>,
}

impl TaxRuleCreate {
    /// Cross-field checks that `Validate` cannot express
    pub fn validate_semantics(&self) -> Result<(), String> {
        check_rate(self.rate)?;
        if let Some(cond) = &self.condition {
            cond.validate()?;
        }
        Ok(())
    }
}

/// Rates are percentages and must stay in [0, 100]
fn check_rate(rate: Decimal) -> Result<(), String> {
    if rate < Decimal::ZERO {
        return Err("rate must not be negative".to_string());
    }
    if rate > Decimal::from(100) {
        return Err("rate must not exceed 100".to_string());
    }
    Ok(())
}

impl From<TaxRuleCreate> for TaxRule {
    fn from(c: TaxRuleCreate) -> Self {
        let now = now_millis();
        TaxRule {
            id: None,
            name: c.name,
            code: c.code,
            description: c.description,
            display_label: c.display_label,
            tax_type: c.tax_type,
            rate: c.rate,
            base: c.base.unwrap_or_default(),
            inclusive: c.inclusive.unwrap_or(false),
            apply_after_discount: c.apply_after_discount.unwrap_or(true),
            priority: c.priority.unwrap_or(0),
            condition: c.condition,
            enabled: c.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update tax rule payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct TaxRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub display_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<TaxBase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_after_discount: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Always bumped server-side
    pub updated_at: Option<i64>,
}

impl TaxRuleUpdate {
    pub fn validate_semantics(&self) -> Result<(), String> {
        if let Some(rate) = self.rate {
            check_rate(rate)?;
        }
        if let Some(cond) = &self.condition {
            cond.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_create(rate: Decimal) -> TaxRuleCreate {
        TaxRuleCreate {
            name: "Standard GST".to_string(),
            code: "gst_std".to_string(),
            description: None,
            display_label: None,
            tax_type: TaxType::Gst,
            rate,
            base: None,
            inclusive: None,
            apply_after_discount: None,
            priority: None,
            condition: None,
            enabled: None,
        }
    }

    #[test]
    fn rate_must_stay_in_percent_range() {
        assert!(make_create(Decimal::from(-1)).validate_semantics().is_err());
        assert!(make_create(Decimal::from(500)).validate_semantics().is_err());
        assert!(make_create(Decimal::from(101)).validate_semantics().is_err());
        assert!(make_create(Decimal::from(18)).validate_semantics().is_ok());
        assert!(make_create(Decimal::from(100)).validate_semantics().is_ok());

        let update = TaxRuleUpdate {
            rate: Some(Decimal::from(120)),
            ..Default::default()
        };
        assert!(update.validate_semantics().is_err());
    }

    #[test]
    fn defaults_applied_on_create() {
        let rule: TaxRule = make_create(Decimal::from(18)).into();
        assert!(rule.enabled);
        assert!(!rule.inclusive);
        assert!(rule.apply_after_discount);
        assert_eq!(rule.base, TaxBase::Subtotal);
        assert_eq!(rule.priority, 0);
    }

    #[test]
    fn enum_wire_format() {
        let rule: TaxRule = make_create(Decimal::from(18)).into();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["tax_type"], "GST");
        assert_eq!(json["base"], "SUBTOTAL");
    }
}
