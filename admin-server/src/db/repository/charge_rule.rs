//! Charge Rule Repository

use super::{BaseRepository, ReorderItem, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{ChargeRule, ChargeRuleCreate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "charge_rule";

#[derive(Clone)]
pub struct ChargeRuleRepository {
    base: BaseRepository,
}

impl ChargeRuleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All rules in evaluation order
    pub async fn find_all(&self) -> RepoResult<Vec<ChargeRule>> {
        let rules: Vec<ChargeRule> = self
            .base
            .db()
            .query("SELECT * FROM charge_rule ORDER BY priority ASC, id ASC")
            .await?
            .take(0)?;
        Ok(rules)
    }

    /// Enabled rules only, in evaluation order
    pub async fn find_enabled(&self) -> RepoResult<Vec<ChargeRule>> {
        let rules: Vec<ChargeRule> = self
            .base
            .db()
            .query("SELECT * FROM charge_rule WHERE enabled = true ORDER BY priority ASC, id ASC")
            .await?
            .take(0)?;
        Ok(rules)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ChargeRule>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let rule: Option<ChargeRule> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(rule)
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChargeRule>> {
        let code_owned = code.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM charge_rule WHERE code = $code LIMIT 1")
            .bind(("code", code_owned))
            .await?;
        let rules: Vec<ChargeRule> = result.take(0)?;
        Ok(rules.into_iter().next())
    }

    pub async fn create(&self, data: ChargeRuleCreate) -> RepoResult<ChargeRule> {
        if self.find_by_code(&data.code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Charge rule '{}' already exists",
                data.code
            )));
        }

        let rule: ChargeRule = data.into();
        let created: Option<ChargeRule> = self.base.db().create(TABLE).content(rule).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create charge rule".to_string()))
    }

    /// Replace the record with a pre-merged copy
    ///
    /// Full replacement rather than MERGE: changing `charge_type` must be
    /// able to drop the previous type's amount fields.
    pub async fn replace(&self, id: &str, mut rule: ChargeRule) -> RepoResult<ChargeRule> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        rule.id = None;
        rule.updated_at = now_millis();

        let updated: Option<ChargeRule> = self
            .base
            .db()
            .update((TABLE, pure_id))
            .content(rule)
            .await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Charge rule {} not found", id)))
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> RepoResult<ChargeRule> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        self.base
            .db()
            .query("UPDATE type::thing($tb, $id) SET enabled = $enabled, updated_at = $now")
            .bind(("tb", TABLE))
            .bind(("id", pure_id.clone()))
            .bind(("enabled", enabled))
            .bind(("now", now_millis()))
            .await?;

        self.find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Charge rule {} not found", id)))
    }

    /// Bulk priority reassignment, all-or-nothing
    pub async fn reorder(&self, items: Vec<ReorderItem>) -> RepoResult<()> {
        self.base.reorder(TABLE, items, now_millis()).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let deleted: Option<ChargeRule> = self.base.db().delete((TABLE, pure_id)).await?;
        Ok(deleted.is_some())
    }
}
