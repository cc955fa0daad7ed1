//! Applicability condition tree
//!
//! Rules carry an optional condition tree that gates whether they apply to
//! an order. The tree is stored as JSON alongside the rule:
//!
//! ```json
//! {
//!   "all": [
//!     { "field": "zone", "op": "in", "value": ["north", "east"] },
//!     { "field": "subtotal", "op": "gte", "value": "500" }
//!   ]
//! }
//! ```
//!
//! A rule without a condition matches every order. An absent context value
//! (e.g. no zone on the order) fails every comparison against that field,
//! including `ne`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::pricing::context::OrderContext;

/// Condition node: conjunction, disjunction, or leaf comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Condition {
    All { all: Vec<Condition> },
    Any { any: Vec<Condition> },
    Cmp(Comparison),
}

/// Context field a leaf comparison reads
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    Zone,
    PaymentMethod,
    Subtotal,
    IsRemote,
    HasFragileItems,
    HasElectronics,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    In,
    Gte,
    Lte,
    Gt,
    Lt,
}

/// Leaf comparison against one context field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub field: ConditionField,
    pub op: CmpOp,
    pub value: Value,
}

impl Condition {
    /// Evaluate the tree against an order context
    pub fn matches(&self, ctx: &OrderContext) -> bool {
        match self {
            Condition::All { all } => all.iter().all(|c| c.matches(ctx)),
            Condition::Any { any } => any.iter().any(|c| c.matches(ctx)),
            Condition::Cmp(cmp) => cmp.matches(ctx),
        }
    }

    /// Authoring-time validation, run when a rule is created or updated
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Condition::All { all } => {
                if all.is_empty() {
                    return Err("'all' branch must not be empty".to_string());
                }
                for c in all {
                    c.validate()?;
                }
                Ok(())
            }
            Condition::Any { any } => {
                if any.is_empty() {
                    return Err("'any' branch must not be empty".to_string());
                }
                for c in any {
                    c.validate()?;
                }
                Ok(())
            }
            Condition::Cmp(cmp) => cmp.validate(),
        }
    }
}

impl Comparison {
    fn matches(&self, ctx: &OrderContext) -> bool {
        match self.field {
            ConditionField::Subtotal => cmp_decimal(ctx.subtotal, self.op, &self.value),
            ConditionField::Zone => cmp_string(ctx.zone.as_deref(), self.op, &self.value),
            ConditionField::PaymentMethod => {
                cmp_string(ctx.payment_method.as_deref(), self.op, &self.value)
            }
            ConditionField::IsRemote => cmp_bool(ctx.is_remote, self.op, &self.value),
            ConditionField::HasFragileItems => {
                cmp_bool(ctx.has_fragile_items, self.op, &self.value)
            }
            ConditionField::HasElectronics => cmp_bool(ctx.has_electronics, self.op, &self.value),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self.field {
            ConditionField::Subtotal => match self.op {
                CmpOp::In => {
                    let Some(arr) = self.value.as_array() else {
                        return Err("'in' requires an array value".to_string());
                    };
                    if arr.iter().any(|v| json_decimal(v).is_none()) {
                        return Err("subtotal 'in' values must be numeric".to_string());
                    }
                    Ok(())
                }
                _ => json_decimal(&self.value)
                    .map(|_| ())
                    .ok_or_else(|| "subtotal comparison requires a numeric value".to_string()),
            },
            ConditionField::Zone | ConditionField::PaymentMethod => match self.op {
                CmpOp::Eq | CmpOp::Ne => self
                    .value
                    .as_str()
                    .map(|_| ())
                    .ok_or_else(|| "string comparison requires a string value".to_string()),
                CmpOp::In => {
                    let Some(arr) = self.value.as_array() else {
                        return Err("'in' requires an array value".to_string());
                    };
                    if arr.iter().any(|v| !v.is_string()) {
                        return Err("'in' values must be strings".to_string());
                    }
                    Ok(())
                }
                _ => Err("ordering operators are not valid for string fields".to_string()),
            },
            ConditionField::IsRemote
            | ConditionField::HasFragileItems
            | ConditionField::HasElectronics => match self.op {
                CmpOp::Eq | CmpOp::Ne => self
                    .value
                    .as_bool()
                    .map(|_| ())
                    .ok_or_else(|| "boolean comparison requires a boolean value".to_string()),
                _ => Err("only 'eq'/'ne' are valid for boolean fields".to_string()),
            },
        }
    }
}

/// Parse a JSON number or numeric string into a Decimal without going
/// through a float
fn json_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

fn cmp_decimal(actual: Decimal, op: CmpOp, expected: &Value) -> bool {
    match op {
        CmpOp::In => expected
            .as_array()
            .map(|arr| arr.iter().filter_map(json_decimal).any(|d| d == actual))
            .unwrap_or(false),
        _ => {
            let Some(expected) = json_decimal(expected) else {
                return false;
            };
            match op {
                CmpOp::Eq => actual == expected,
                CmpOp::Ne => actual != expected,
                CmpOp::Gte => actual >= expected,
                CmpOp::Lte => actual <= expected,
                CmpOp::Gt => actual > expected,
                CmpOp::Lt => actual < expected,
                CmpOp::In => unreachable!(),
            }
        }
    }
}

fn cmp_string(actual: Option<&str>, op: CmpOp, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match op {
        CmpOp::Eq => expected.as_str() == Some(actual),
        CmpOp::Ne => expected.as_str().is_some_and(|e| e != actual),
        CmpOp::In => expected
            .as_array()
            .map(|arr| arr.iter().any(|v| v.as_str() == Some(actual)))
            .unwrap_or(false),
        _ => false,
    }
}

fn cmp_bool(actual: bool, op: CmpOp, expected: &Value) -> bool {
    match (op, expected.as_bool()) {
        (CmpOp::Eq, Some(e)) => actual == e,
        (CmpOp::Ne, Some(e)) => actual != e,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(subtotal: Decimal, zone: Option<&str>, payment: Option<&str>) -> OrderContext {
        OrderContext {
            subtotal,
            zone: zone.map(str::to_string),
            payment_method: payment.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn leaf_comparisons() {
        let c: Condition =
            serde_json::from_value(json!({"field": "subtotal", "op": "gte", "value": 500}))
                .unwrap();
        assert!(c.matches(&ctx(Decimal::from(500), None, None)));
        assert!(c.matches(&ctx(Decimal::new(50001, 2), None, None)));
        assert!(!c.matches(&ctx(Decimal::new(49999, 2), None, None)));
    }

    #[test]
    fn string_in_operator() {
        let c: Condition = serde_json::from_value(
            json!({"field": "zone", "op": "in", "value": ["north", "east"]}),
        )
        .unwrap();
        assert!(c.matches(&ctx(Decimal::from(100), Some("north"), None)));
        assert!(!c.matches(&ctx(Decimal::from(100), Some("south"), None)));
    }

    #[test]
    fn absent_context_value_never_matches() {
        let eq: Condition =
            serde_json::from_value(json!({"field": "zone", "op": "eq", "value": "north"}))
                .unwrap();
        let ne: Condition =
            serde_json::from_value(json!({"field": "zone", "op": "ne", "value": "north"}))
                .unwrap();
        let no_zone = ctx(Decimal::from(100), None, None);
        assert!(!eq.matches(&no_zone));
        assert!(!ne.matches(&no_zone));
    }

    #[test]
    fn nested_all_any() {
        let c: Condition = serde_json::from_value(json!({
            "all": [
                {"field": "subtotal", "op": "gte", "value": "100"},
                {"any": [
                    {"field": "payment_method", "op": "eq", "value": "cod"},
                    {"field": "zone", "op": "eq", "value": "remote"}
                ]}
            ]
        }))
        .unwrap();
        assert!(c.matches(&ctx(Decimal::from(150), None, Some("cod"))));
        assert!(c.matches(&ctx(Decimal::from(150), Some("remote"), None)));
        assert!(!c.matches(&ctx(Decimal::from(150), Some("north"), Some("online"))));
        assert!(!c.matches(&ctx(Decimal::from(50), None, Some("cod"))));
    }

    #[test]
    fn boolean_fields() {
        let c: Condition =
            serde_json::from_value(json!({"field": "is_remote", "op": "eq", "value": true}))
                .unwrap();
        let mut remote = ctx(Decimal::from(100), None, None);
        remote.is_remote = true;
        assert!(c.matches(&remote));
        assert!(!c.matches(&ctx(Decimal::from(100), None, None)));
    }

    #[test]
    fn validation_rejects_bad_shapes() {
        let empty: Condition = serde_json::from_value(json!({"all": []})).unwrap();
        assert!(empty.validate().is_err());

        let bad_op: Condition =
            serde_json::from_value(json!({"field": "zone", "op": "gt", "value": "north"}))
                .unwrap();
        assert!(bad_op.validate().is_err());

        let bad_value: Condition =
            serde_json::from_value(json!({"field": "subtotal", "op": "gte", "value": "abc"}))
                .unwrap();
        assert!(bad_value.validate().is_err());

        let good: Condition = serde_json::from_value(
            json!({"any": [{"field": "payment_method", "op": "in", "value": ["cod"]}]}),
        )
        .unwrap();
        assert!(good.validate().is_ok());
    }
}
