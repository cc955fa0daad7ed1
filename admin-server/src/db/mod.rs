//! Database Module
//!
//! Embedded SurrealDB (RocksDB backend) plus schema bootstrap: unique
//! indexes on rule codes and the default admin account.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database under `data_dir`
    pub async fn new(data_dir: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(data_dir)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns("backoffice")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        let service = Self { db };
        service.define_schema().await?;

        tracing::info!("Database ready at {}", data_dir);
        Ok(service)
    }

    /// In-memory database, used by tests
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<surrealdb::engine::local::Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns("backoffice")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        let service = Self { db };
        service.define_schema().await?;
        Ok(service)
    }

    /// Uniqueness lives in the database, not just the pre-insert checks
    async fn define_schema(&self) -> Result<(), AppError> {
        self.db
            .query(
                r#"
                DEFINE INDEX IF NOT EXISTS tax_rule_code ON tax_rule FIELDS code UNIQUE;
                DEFINE INDEX IF NOT EXISTS charge_rule_code ON charge_rule FIELDS code UNIQUE;
                DEFINE INDEX IF NOT EXISTS insurance_plan_code ON insurance_plan FIELDS code UNIQUE;
                DEFINE INDEX IF NOT EXISTS admin_user_username ON admin_user FIELDS username UNIQUE;
                DEFINE INDEX IF NOT EXISTS abandoned_cart_token ON abandoned_cart FIELDS cart_token UNIQUE;
                DEFINE INDEX IF NOT EXISTS audit_log_created ON audit_log FIELDS created_at;
                "#,
            )
            .await
            .map_err(|e| AppError::database(format!("Failed to define indexes: {e}")))?;
        Ok(())
    }

    /// Create the bootstrap admin when the user table is empty
    pub async fn seed_default_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), AppError> {
        let repo = repository::AdminUserRepository::new(self.db.clone());
        if repo.count().await? == 0 {
            repo.create(username, password, "Administrator", models::AdminRole::Admin)
                .await?;
            tracing::warn!(
                "Seeded default admin '{}'. Change its password immediately.",
                username
            );
        }
        Ok(())
    }
}
