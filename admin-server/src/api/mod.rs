//! API Routes
//!
//! # Structure
//!
//! - [`health`] - liveness and component checks
//! - [`auth`] - login
//! - [`tax_rules`] - tax rule management
//! - [`charge_rules`] - charge rule management
//! - [`insurance_plans`] - insurance plan management
//! - [`payment_settings`] - payment flow settings
//! - [`banners`] - storefront banner management
//! - [`abandoned_carts`] - cart tracking and recovery
//! - [`audit_log`] - audit trail queries
//! - [`quote`] - order cost evaluation

pub mod auth;
pub mod health;

// Policy configuration API
pub mod charge_rules;
pub mod insurance_plans;
pub mod payment_settings;
pub mod tax_rules;

// Back-office API
pub mod abandoned_carts;
pub mod audit_log;
pub mod banners;

// Evaluation API
pub mod quote;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
