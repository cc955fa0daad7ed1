//! Audit Module
//!
//! Append-only audit trail for every admin mutation and auth event.

pub mod service;
pub mod types;

pub use service::AuditService;
pub use types::{AuditAction, AuditEntry, AuditQuery};
