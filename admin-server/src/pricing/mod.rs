//! Order Cost Policy Engine
//!
//! Computes a full cost breakdown for an order from the configured tax
//! rules, charge rules and insurance plans:
//! - [`context`] - order facts a quote is computed from
//! - [`snapshot`] - immutable rule snapshot and per-kind cache
//! - [`matcher`] - rule applicability
//! - [`calculator`] - Decimal amount math
//! - [`schedule`] - injectable premium uplift strategy
//! - [`composer`] - breakdown composition

pub mod calculator;
pub mod composer;
pub mod context;
pub mod matcher;
pub mod schedule;
pub mod snapshot;

pub use composer::{Breakdown, ChargeLine, InsuranceLine, TaxLine, evaluate};
pub use context::OrderContext;
pub use schedule::{FlatSchedule, NoSurcharge, SurchargeSchedule};
pub use snapshot::{RuleKind, RuleSnapshot, SnapshotCache};

use thiserror::Error;

/// Terminal evaluation failures. These abort the quote; the caller decides
/// how to surface them (the API maps them to 422).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("conflicting mandatory insurance plans: {}", .0.join(", "))]
    ConflictingMandatoryPlans(Vec<String>),

    #[error("multiple insurance plans are eligible, one must be selected: {}", .0.join(", "))]
    UnresolvedInsuranceSelection(Vec<String>),

    #[error("selected insurance plan '{0}' is not eligible for this order")]
    UnknownSelectedPlan(String),

    #[error("rule '{rule}' is missing required field '{field}'")]
    MissingRequiredField { rule: String, field: &'static str },
}
