//! Audit log types

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::db::models::serde_helpers;

/// Every auditable action. Closed set so queries can filter reliably.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    LoginSuccess,
    LoginFailed,
    TaxRuleCreated,
    TaxRuleUpdated,
    TaxRuleDeleted,
    TaxRulesReordered,
    ChargeRuleCreated,
    ChargeRuleUpdated,
    ChargeRuleDeleted,
    ChargeRulesReordered,
    InsurancePlanCreated,
    InsurancePlanUpdated,
    InsurancePlanDeleted,
    InsurancePlansReordered,
    PaymentSettingsUpdated,
    BannerCreated,
    BannerUpdated,
    BannerDeleted,
    CartRecovered,
    CartsPurged,
    AuditPurged,
}

/// One audit log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub action: AuditAction,
    /// Table name of the touched resource
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    /// Free-form action payload (changed fields, failure reason, ...)
    pub details: Option<serde_json::Value>,
    /// Timestamp (milliseconds since epoch)
    pub created_at: i64,
}

/// Audit log list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    /// Inclusive lower bound (milliseconds since epoch)
    pub from: Option<i64>,
    /// Exclusive upper bound (milliseconds since epoch)
    pub to: Option<i64>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<String>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}
