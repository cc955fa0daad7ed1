//! Database Models
//!
//! Entity and payload types for every table, plus the serde helpers that
//! bridge SurrealDB's RecordId and null-happy wire formats.

pub mod abandoned_cart;
pub mod admin_user;
pub mod banner;
pub mod charge_rule;
pub mod condition;
pub mod insurance_plan;
pub mod payment_settings;
pub mod serde_helpers;
pub mod tax_rule;

pub use abandoned_cart::{AbandonedCart, CartItem, CartStatus, CartTrackRequest};
pub use admin_user::{AdminRole, AdminUser, LoginRequest, LoginResponse};
pub use banner::{Banner, BannerCreate, BannerUpdate};
pub use charge_rule::{
    ChargeApplyTo, ChargeRule, ChargeRuleCreate, ChargeRuleUpdate, ChargeTier, ChargeType,
};
pub use condition::{CmpOp, Comparison, Condition, ConditionField};
pub use insurance_plan::{InsurancePlan, InsurancePlanCreate, InsurancePlanUpdate};
pub use payment_settings::{DefaultPayment, PaymentFlow, PaymentSettings, PaymentSettingsUpdate};
pub use tax_rule::{TaxBase, TaxRule, TaxRuleCreate, TaxRuleUpdate, TaxType};
