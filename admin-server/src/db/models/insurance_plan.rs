//! Insurance Plan Model
//!
//! A plan is eligible when the declared order value falls inside its
//! `[min_order_value, max_order_value]` window and its condition tree (if
//! any) matches. The premium is `value * premium_percent / 100`, clamped to
//! `[min_premium, max_premium]`. Premiums are never taxed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::condition::Condition;
use super::serde_helpers;
use crate::utils::time::now_millis;

/// Insurance plan entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePlan {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Stable machine code, unique across plans
    pub code: String,
    pub description: Option<String>,
    /// Inclusive lower bound on declared order value
    pub min_order_value: Decimal,
    /// Inclusive upper bound, open-ended when absent
    pub max_order_value: Option<Decimal>,
    /// Percentage of declared value (1 means 1%)
    pub premium_percent: Decimal,
    pub min_premium: Decimal,
    pub max_premium: Option<Decimal>,
    /// Share of the declared value paid out on a claim (100 means full cover)
    #[serde(default = "default_coverage")]
    pub coverage_percentage: Decimal,
    /// Advertised claim turnaround, 1 to 30 days
    #[serde(default = "default_claim_days")]
    pub claim_processing_days: u32,
    /// Mandatory plans auto-apply and override an explicit selection
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub mandatory: bool,
    pub condition: Option<Condition>,
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

fn default_coverage() -> Decimal {
    Decimal::from(100)
}

fn default_claim_days() -> u32 {
    7
}

/// Create insurance plan payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InsurancePlanCreate {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub description: Option<String>,
    pub min_order_value: Decimal,
    pub max_order_value: Option<Decimal>,
    pub premium_percent: Decimal,
    pub min_premium: Decimal,
    pub max_premium: Option<Decimal>,
    pub coverage_percentage: Option<Decimal>,
    pub claim_processing_days: Option<u32>,
    pub mandatory: Option<bool>,
    pub condition: Option<Condition>,
    pub priority: Option<u32>,
    pub enabled: Option<bool>,
}

fn check_bounds(
    min_order_value: Decimal,
    max_order_value: Option<Decimal>,
    premium_percent: Decimal,
    min_premium: Decimal,
    max_premium: Option<Decimal>,
    coverage_percentage: Decimal,
    claim_processing_days: u32,
) -> Result<(), String> {
    if min_order_value < Decimal::ZERO {
        return Err("min_order_value must not be negative".to_string());
    }
    if let Some(max) = max_order_value
        && max < min_order_value
    {
        return Err("max_order_value must not be below min_order_value".to_string());
    }
    if premium_percent < Decimal::ZERO {
        return Err("premium_percent must not be negative".to_string());
    }
    if premium_percent > Decimal::from(50) {
        return Err("premium_percent must not exceed 50".to_string());
    }
    if min_premium < Decimal::ZERO {
        return Err("min_premium must not be negative".to_string());
    }
    if let Some(max) = max_premium
        && max < min_premium
    {
        return Err("max_premium must not be below min_premium".to_string());
    }
    if coverage_percentage < Decimal::ZERO || coverage_percentage > Decimal::from(100) {
        return Err("coverage_percentage must be between 0 and 100".to_string());
    }
    if !(1..=30).contains(&claim_processing_days) {
        return Err("claim_processing_days must be between 1 and 30".to_string());
    }
    Ok(())
}

impl InsurancePlanCreate {
    pub fn validate_semantics(&self) -> Result<(), String> {
        check_bounds(
            self.min_order_value,
            self.max_order_value,
            self.premium_percent,
            self.min_premium,
            self.max_premium,
            self.coverage_percentage.unwrap_or_else(default_coverage),
            self.claim_processing_days.unwrap_or_else(default_claim_days),
        )?;
        if let Some(cond) = &self.condition {
            cond.validate()?;
        }
        Ok(())
    }
}

impl From<InsurancePlanCreate> for InsurancePlan {
    fn from(c: InsurancePlanCreate) -> Self {
        let now = now_millis();
        InsurancePlan {
            id: None,
            name: c.name,
            code: c.code,
            description: c.description,
            min_order_value: c.min_order_value,
            max_order_value: c.max_order_value,
            premium_percent: c.premium_percent,
            min_premium: c.min_premium,
            max_premium: c.max_premium,
            coverage_percentage: c.coverage_percentage.unwrap_or_else(default_coverage),
            claim_processing_days: c.claim_processing_days.unwrap_or_else(default_claim_days),
            mandatory: c.mandatory.unwrap_or(false),
            condition: c.condition,
            priority: c.priority.unwrap_or(0),
            enabled: c.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update insurance plan payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct InsurancePlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_order_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_premium: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_premium: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_processing_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Always bumped server-side
    pub updated_at: Option<i64>,
}

impl InsurancePlanUpdate {
    /// Merge onto the existing record, producing the full replacement
    pub fn merge(&self, existing: &InsurancePlan) -> InsurancePlan {
        let mut merged = existing.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(min) = self.min_order_value {
            merged.min_order_value = min;
        }
        if let Some(max) = self.max_order_value {
            merged.max_order_value = Some(max);
        }
        if let Some(percent) = self.premium_percent {
            merged.premium_percent = percent;
        }
        if let Some(min) = self.min_premium {
            merged.min_premium = min;
        }
        if let Some(max) = self.max_premium {
            merged.max_premium = Some(max);
        }
        if let Some(coverage) = self.coverage_percentage {
            merged.coverage_percentage = coverage;
        }
        if let Some(days) = self.claim_processing_days {
            merged.claim_processing_days = days;
        }
        if let Some(mandatory) = self.mandatory {
            merged.mandatory = mandatory;
        }
        if let Some(condition) = &self.condition {
            merged.condition = Some(condition.clone());
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

impl InsurancePlan {
    /// Re-check invariants on the merged record before an update lands
    pub fn validate_semantics(&self) -> Result<(), String> {
        check_bounds(
            self.min_order_value,
            self.max_order_value,
            self.premium_percent,
            self.min_premium,
            self.max_premium,
            self.coverage_percentage,
            self.claim_processing_days,
        )?;
        if let Some(cond) = &self.condition {
            cond.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_create() -> InsurancePlanCreate {
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
    }

    #[test]
    fn bounds_checked() {
        assert!(make_create().validate_semantics().is_ok());

        let mut c = make_create();
        c.max_order_value = Some(Decimal::from(100));
        assert!(c.validate_semantics().is_err());

        let mut c = make_create();
        c.max_premium = Some(Decimal::from(5));
        assert!(c.validate_semantics().is_err());

        let mut c = make_create();
        c.premium_percent = Decimal::from(-1);
        assert!(c.validate_semantics().is_err());
    }

    #[test]
    fn premium_percent_capped() {
        let mut c = make_create();
        c.premium_percent = Decimal::from(51);
        assert!(c.validate_semantics().is_err());

        c.premium_percent = Decimal::from(50);
        assert!(c.validate_semantics().is_ok());
    }

    #[test]
    fn coverage_and_claim_days_bounded() {
        let mut c = make_create();
        c.coverage_percentage = Some(Decimal::from(101));
        assert!(c.validate_semantics().is_err());

        let mut c = make_create();
        c.claim_processing_days = Some(0);
        assert!(c.validate_semantics().is_err());

        let mut c = make_create();
        c.claim_processing_days = Some(31);
        assert!(c.validate_semantics().is_err());

        let mut c = make_create();
        c.coverage_percentage = Some(Decimal::from(80));
        c.claim_processing_days = Some(14);
        assert!(c.validate_semantics().is_ok());
    }

    #[test]
    fn defaults_applied_on_create() {
        let plan: InsurancePlan = make_create().into();
        assert!(plan.enabled);
        assert!(!plan.mandatory);
        assert_eq!(plan.priority, 0);
        assert_eq!(plan.coverage_percentage, Decimal::from(100));
        assert_eq!(plan.claim_processing_days, 7);
    }
}
