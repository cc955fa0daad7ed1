//! Tax Rule Repository

use super::{BaseRepository, ReorderItem, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{TaxRule, TaxRuleCreate, TaxRuleUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "tax_rule";

#[derive(Clone)]
pub struct TaxRuleRepository {
    base: BaseRepository,
}

impl TaxRuleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All rules in evaluation order
    pub async fn find_all(&self) -> RepoResult<Vec<TaxRule>> {
        let rules: Vec<TaxRule> = self
            .base
            .db()
            .query("SELECT * FROM tax_rule ORDER BY priority ASC, id ASC")
            .await?
            .take(0)?;
        Ok(rules)
    }

    /// Enabled rules only, in evaluation order
    pub async fn find_enabled(&self) -> RepoResult<Vec<TaxRule>> {
        let rules: Vec<TaxRule> = self
            .base
            .db()
            .query("SELECT * FROM tax_rule WHERE enabled = true ORDER BY priority ASC, id ASC")
            .await?
            .take(0)?;
        Ok(rules)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<TaxRule>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let rule: Option<TaxRule> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(rule)
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<TaxRule>> {
        let code_owned = code.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM tax_rule WHERE code = $code LIMIT 1")
            .bind(("code", code_owned))
            .await?;
        let rules: Vec<TaxRule> = result.take(0)?;
        Ok(rules.into_iter().next())
    }

    pub async fn create(&self, data: TaxRuleCreate) -> RepoResult<TaxRule> {
        if self.find_by_code(&data.code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Tax rule '{}' already exists",
                data.code
            )));
        }

        let rule: TaxRule = data.into();
        let created: Option<TaxRule> = self.base.db().create(TABLE).content(rule).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create tax rule".to_string()))
    }

    pub async fn update(&self, id: &str, mut data: TaxRuleUpdate) -> RepoResult<TaxRule> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        if self.find_by_id(&pure_id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Tax rule {} not found", id)));
        }

        data.updated_at = Some(now_millis());
        self.base
            .db()
            .query("UPDATE type::thing($tb, $id) MERGE $data")
            .bind(("tb", TABLE))
            .bind(("id", pure_id.clone()))
            .bind(("data", data))
            .await?;

        self.find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Tax rule {} not found", id)))
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> RepoResult<TaxRule> {
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
            .ok_or_else(|| RepoError::NotFound(format!("Tax rule {} not found", id)))
    }

    /// Bulk priority reassignment, all-or-nothing
    pub async fn reorder(&self, items: Vec<ReorderItem>) -> RepoResult<()> {
        self.base.reorder(TABLE, items, now_millis()).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let deleted: Option<TaxRule> = self.base.db().delete((TABLE, pure_id)).await?;
        Ok(deleted.is_some())
    }
}
