//! Insurance Plan Repository

use super::{BaseRepository, ReorderItem, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{InsurancePlan, InsurancePlanCreate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "insurance_plan";

#[derive(Clone)]
pub struct InsurancePlanRepository {
    base: BaseRepository,
}

impl InsurancePlanRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All plans in evaluation order
    pub async fn find_all(&self) -> RepoResult<Vec<InsurancePlan>> {
        let plans: Vec<InsurancePlan> = self
            .base
            .db()
            .query("SELECT * FROM insurance_plan ORDER BY priority ASC, id ASC")
            .await?
            .take(0)?;
        Ok(plans)
    }

    /// Enabled plans only, in evaluation order
    pub async fn find_enabled(&self) -> RepoResult<Vec<InsurancePlan>> {
        let plans: Vec<InsurancePlan> = self
            .base
            .db()
            .query(
                "SELECT * FROM insurance_plan WHERE enabled = true ORDER BY priority ASC, id ASC",
            )
            .await?
            .take(0)?;
        Ok(plans)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<InsurancePlan>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let plan: Option<InsurancePlan> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(plan)
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<InsurancePlan>> {
        let code_owned = code.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM insurance_plan WHERE code = $code LIMIT 1")
            .bind(("code", code_owned))
            .await?;
        let plans: Vec<InsurancePlan> = result.take(0)?;
        Ok(plans.into_iter().next())
    }

    pub async fn create(&self, data: InsurancePlanCreate) -> RepoResult<InsurancePlan> {
        if self.find_by_code(&data.code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Insurance plan '{}' already exists",
                data.code
            )));
        }

        let plan: InsurancePlan = data.into();
        let created: Option<InsurancePlan> = self.base.db().create(TABLE).content(plan).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create insurance plan".to_string()))
    }

    /// Replace the record with a pre-merged copy
    pub async fn replace(&self, id: &str, mut plan: InsurancePlan) -> RepoResult<InsurancePlan> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        plan.id = None;
        plan.updated_at = now_millis();

        let updated: Option<InsurancePlan> = self
            .base
            .db()
            .update((TABLE, pure_id))
            .content(plan)
            .await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Insurance plan {} not found", id)))
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> RepoResult<InsurancePlan> {
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
            .ok_or_else(|| RepoError::NotFound(format!("Insurance plan {} not found", id)))
    }

    /// Bulk priority reassignment, all-or-nothing
    pub async fn reorder(&self, items: Vec<ReorderItem>) -> RepoResult<()> {
        self.base.reorder(TABLE, items, now_millis()).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let deleted: Option<InsurancePlan> = self.base.db().delete((TABLE, pure_id)).await?;
        Ok(deleted.is_some())
    }
}
