//! Order evaluation context
//!
//! The immutable order facts a quote is computed from. `subtotal` is the
//! discount-adjusted merchandise total; rule evaluation never re-applies
//! discounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input to a quote evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderContext {
    /// Discount-adjusted merchandise subtotal
    pub subtotal: Decimal,
    /// Delivery zone code
    pub zone: Option<String>,
    /// Payment method code ("cod" or an online method)
    pub payment_method: Option<String>,
    /// Declared value for insurance, defaults to the subtotal
    pub declared_value: Option<Decimal>,
    /// Insurance plan code explicitly chosen by the customer
    pub selected_plan: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub has_fragile_items: bool,
    #[serde(default)]
    pub has_electronics: bool,
}

impl OrderContext {
    /// Value insured when no declared value was given
    pub fn insured_value(&self) -> Decimal {
        self.declared_value.unwrap_or(self.subtotal)
    }

    /// COD is the one offline method; anything else explicit is online
    pub fn is_cod(&self) -> bool {
        self.payment_method.as_deref() == Some("cod")
    }

    pub fn is_online(&self) -> bool {
        matches!(self.payment_method.as_deref(), Some(m) if m != "cod")
    }
}
