//! Rule snapshot and cache
//!
//! A quote evaluates against an immutable snapshot of the enabled rules so
//! concurrent admin edits cannot tear a single evaluation. The cache holds
//! one sorted `Arc<Vec<_>>` per rule kind; admin writes invalidate only the
//! kind they touched.

use std::sync::{Arc, RwLock};

use surrealdb::RecordId;

use crate::db::DbService;
use crate::db::models::{ChargeRule, InsurancePlan, TaxRule};
use crate::db::repository::{
    ChargeRuleRepository, InsurancePlanRepository, RepoResult, TaxRuleRepository,
};

/// Evaluation order: priority ascending, record id as the tiebreaker
fn sort_key(priority: u32, id: &Option<RecordId>) -> (u32, String) {
    (
        priority,
        id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
    )
}

/// Immutable view of the enabled rules, pre-sorted in evaluation order
#[derive(Debug, Clone)]
pub struct RuleSnapshot {
    pub taxes: Arc<Vec<TaxRule>>,
    pub charges: Arc<Vec<ChargeRule>>,
    pub plans: Arc<Vec<InsurancePlan>>,
}

impl RuleSnapshot {
    pub fn new(
        mut taxes: Vec<TaxRule>,
        mut charges: Vec<ChargeRule>,
        mut plans: Vec<InsurancePlan>,
    ) -> Self {
        taxes.sort_by(|a, b| sort_key(a.priority, &a.id).cmp(&sort_key(b.priority, &b.id)));
        charges.sort_by(|a, b| sort_key(a.priority, &a.id).cmp(&sort_key(b.priority, &b.id)));
        plans.sort_by(|a, b| sort_key(a.priority, &a.id).cmp(&sort_key(b.priority, &b.id)));
        Self {
            taxes: Arc::new(taxes),
            charges: Arc::new(charges),
            plans: Arc::new(plans),
        }
    }
}

/// Rule kind, for targeted cache invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Tax,
    Charge,
    Insurance,
}

/// Per-kind cache of the enabled rule lists
#[derive(Default)]
pub struct SnapshotCache {
    taxes: RwLock<Option<Arc<Vec<TaxRule>>>>,
    charges: RwLock<Option<Arc<Vec<ChargeRule>>>>,
    plans: RwLock<Option<Arc<Vec<InsurancePlan>>>>,
}

fn read_slot<T>(slot: &RwLock<Option<Arc<Vec<T>>>>) -> Option<Arc<Vec<T>>> {
    slot.read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .cloned()
}

fn fill_slot<T>(slot: &RwLock<Option<Arc<Vec<T>>>>, value: Arc<Vec<T>>) {
    *slot.write().unwrap_or_else(|e| e.into_inner()) = Some(value);
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached list for one rule kind. Writes to a kind must call
    /// this before returning so the next quote sees the change.
    pub fn invalidate(&self, kind: RuleKind) {
        match kind {
            RuleKind::Tax => *self.taxes.write().unwrap_or_else(|e| e.into_inner()) = None,
            RuleKind::Charge => *self.charges.write().unwrap_or_else(|e| e.into_inner()) = None,
            RuleKind::Insurance => *self.plans.write().unwrap_or_else(|e| e.into_inner()) = None,
        }
    }

    /// Snapshot for one evaluation, filling cache misses from the database
    pub async fn snapshot(&self, db: &DbService) -> RepoResult<RuleSnapshot> {
        let taxes = match read_slot(&self.taxes) {
            Some(cached) => cached,
            None => {
                let mut rules = TaxRuleRepository::new(db.db.clone()).find_enabled().await?;
                rules.sort_by(|a, b| sort_key(a.priority, &a.id).cmp(&sort_key(b.priority, &b.id)));
                let arc = Arc::new(rules);
                fill_slot(&self.taxes, arc.clone());
                arc
            }
        };

        let charges = match read_slot(&self.charges) {
            Some(cached) => cached,
            None => {
                let mut rules = ChargeRuleRepository::new(db.db.clone())
                    .find_enabled()
                    .await?;
                rules.sort_by(|a, b| sort_key(a.priority, &a.id).cmp(&sort_key(b.priority, &b.id)));
                let arc = Arc::new(rules);
                fill_slot(&self.charges, arc.clone());
                arc
            }
        };

        let plans = match read_slot(&self.plans) {
            Some(cached) => cached,
            None => {
                let mut rules = InsurancePlanRepository::new(db.db.clone())
                    .find_enabled()
                    .await?;
                rules.sort_by(|a, b| sort_key(a.priority, &a.id).cmp(&sort_key(b.priority, &b.id)));
                let arc = Arc::new(rules);
                fill_slot(&self.plans, arc.clone());
                arc
            }
        };

        Ok(RuleSnapshot {
            taxes,
            charges,
            plans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{TaxType, tax_rule::TaxRuleCreate};
    use rust_decimal::Decimal;

    fn make_rule(code: &str, priority: u32, key: &str) -> TaxRule {
        let mut rule: TaxRule = TaxRuleCreate {
            name: code.to_string(),
            code: code.to_string(),
            description: None,
            display_label: None,
            tax_type: TaxType::Custom,
            rate: Decimal::from(10),
            base: None,
            inclusive: None,
            apply_after_discount: None,
            priority: Some(priority),
            condition: None,
            enabled: None,
        }
        .into();
        rule.id = Some(RecordId::from_table_key("tax_rule", key));
        rule
    }

    #[test]
    fn snapshot_sorts_by_priority_then_id() {
        let snap = RuleSnapshot::new(
            vec![
                make_rule("c", 20, "zz"),
                make_rule("a", 10, "bb"),
                make_rule("b", 10, "aa"),
            ],
            vec![],
            vec![],
        );
        let codes: Vec<&str> = snap.taxes.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "a", "c"]);
    }
}
