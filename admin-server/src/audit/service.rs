//! Audit service
//!
//! Append-only trail of admin actions. Handlers log after the write
//! succeeds so a failed action never leaves a phantom entry. A failed
//! audit write is traced but does not fail the request.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::types::{AuditAction, AuditEntry, AuditQuery};
use crate::db::repository::RepoResult;
use crate::utils::time::now_millis;

const TABLE: &str = "audit_log";
const DEFAULT_PAGE: usize = 50;
const MAX_PAGE: usize = 500;

#[derive(Clone)]
pub struct AuditService {
    db: Surreal<Db>,
}

impl AuditService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Append one entry
    pub async fn log(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: Option<String>,
        operator_id: Option<String>,
        operator_name: Option<String>,
        details: Option<serde_json::Value>,
    ) {
        let entry = AuditEntry {
            id: None,
            action,
            resource_type: resource_type.to_string(),
            resource_id,
            operator_id,
            operator_name,
            details,
            created_at: now_millis(),
        };
        let created: Result<Option<AuditEntry>, surrealdb::Error> =
            self.db.create(TABLE).content(entry).await;
        if let Err(e) = created {
            tracing::error!(target: "audit", error = %e, "Failed to write audit entry");
        }
    }

    /// Filtered page of entries, newest first
    pub async fn query(&self, q: AuditQuery) -> RepoResult<Vec<AuditEntry>> {
        let limit = q.limit.unwrap_or(DEFAULT_PAGE).min(MAX_PAGE);

        let mut sql = String::from("SELECT * FROM audit_log WHERE true");
        if q.from.is_some() {
            sql.push_str(" AND created_at >= $from");
        }
        if q.to.is_some() {
            sql.push_str(" AND created_at < $to");
        }
        if q.action.is_some() {
            sql.push_str(" AND action = $action");
        }
        if q.resource_type.is_some() {
            sql.push_str(" AND resource_type = $rtype");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT $limit START $offset");

        let mut query = self.db.query(sql).bind(("limit", limit)).bind(("offset", q.offset));
        if let Some(from) = q.from {
            query = query.bind(("from", from));
        }
        if let Some(to) = q.to {
            query = query.bind(("to", to));
        }
        if let Some(action) = q.action {
            query = query.bind(("action", action));
        }
        if let Some(rtype) = q.resource_type {
            query = query.bind(("rtype", rtype));
        }

        let entries: Vec<AuditEntry> = query.await?.take(0)?;
        Ok(entries)
    }

    /// Drop entries older than the cutoff, returning how many were removed
    pub async fn purge_before(&self, cutoff_millis: i64) -> RepoResult<usize> {
        let mut result = self
            .db
            .query(
                "LET $victims = (SELECT VALUE id FROM audit_log WHERE created_at < $cutoff); \
                 DELETE audit_log WHERE created_at < $cutoff; \
                 RETURN array::len($victims);",
            )
            .bind(("cutoff", cutoff_millis))
            .await?;
        let count: Option<usize> = result.take(2)?;
        Ok(count.unwrap_or(0))
    }
}
