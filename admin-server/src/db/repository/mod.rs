//! Repository Module
//!
//! CRUD operations for SurrealDB tables. IDs travel as "table:id" strings
//! across the stack; `surrealdb::RecordId` handles parsing and key access,
//! and `strip_table_prefix` accepts either the bare key or the full form.

pub mod abandoned_cart;
pub mod admin_user;
pub mod banner;
pub mod charge_rule;
pub mod insurance_plan;
pub mod payment_settings;
pub mod tax_rule;

pub use abandoned_cart::AbandonedCartRepository;
pub use admin_user::AdminUserRepository;
pub use banner::BannerRepository;
pub use charge_rule::ChargeRuleRepository;
pub use insurance_plan::InsurancePlanRepository;
pub use payment_settings::PaymentSettingsRepository;
pub use tax_rule::TaxRuleRepository;

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// One entry of a bulk priority reassignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderItem {
    /// Bare record key or "table:id" form
    pub id: String,
    pub priority: u32,
}

/// Accept both "table:id" and bare key forms
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Reassign priorities for a set of records in one transaction
    pub async fn reorder(&self, table: &str, items: Vec<ReorderItem>, now: i64) -> RepoResult<()> {
        let items: Vec<ReorderItem> = items
            .into_iter()
            .map(|mut item| {
                item.id = strip_table_prefix(table, &item.id).to_string();
                item
            })
            .collect();
        self.db
            .query(
                r#"
                BEGIN TRANSACTION;
                FOR $item IN $items {
                    UPDATE type::thing($tb, $item.id)
                        SET priority = $item.priority, updated_at = $now;
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("tb", table.to_string()))
            .bind(("items", items))
            .bind(("now", now))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_forms() {
        assert_eq!(strip_table_prefix("tax_rule", "tax_rule:abc"), "abc");
        assert_eq!(strip_table_prefix("tax_rule", "abc"), "abc");
        // Another table's prefix is left alone
        assert_eq!(
            strip_table_prefix("tax_rule", "charge_rule:abc"),
            "charge_rule:abc"
        );
    }
}
