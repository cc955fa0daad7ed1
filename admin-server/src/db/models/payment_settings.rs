//! Payment Flow Settings Model
//!
//! Singleton record (`payment_settings:main`) controlling how the checkout
//! presents payment options and which default is preselected.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::time::now_millis;

/// Checkout presentation flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFlow {
    /// Online/COD choice first, then method list
    #[default]
    TwoTier,
    /// One flat list of all methods
    SingleList,
    /// COD offered up-front, online methods behind a secondary step
    CodFirst,
}

/// Preselected payment default
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefaultPayment {
    #[default]
    None,
    Online,
    Cod,
}

/// Payment flow settings entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub flow: PaymentFlow,
    #[serde(default)]
    pub default_payment: DefaultPayment,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub cod_enabled: bool,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub online_enabled: bool,
    /// Updated timestamp (milliseconds since epoch)
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl Default for PaymentSettings {
    fn default() -> Self {
        PaymentSettings {
            id: None,
            flow: PaymentFlow::TwoTier,
            default_payment: DefaultPayment::None,
            cod_enabled: true,
            online_enabled: true,
            updated_at: now_millis(),
        }
    }
}

/// Update payment settings payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct PaymentSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<PaymentFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_payment: Option<DefaultPayment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_enabled: Option<bool>,
    /// Always bumped server-side
    pub updated_at: Option<i64>,
}

impl PaymentSettingsUpdate {
    /// A default that points at a disabled channel is a footgun for the
    /// storefront, so reject the combination outright.
    pub fn validate_semantics(&self, current: &PaymentSettings) -> Result<(), String> {
        let cod_enabled = self.cod_enabled.unwrap_or(current.cod_enabled);
        let online_enabled = self.online_enabled.unwrap_or(current.online_enabled);
        let default_payment = self.default_payment.unwrap_or(current.default_payment);

        if !cod_enabled && !online_enabled {
            return Err("at least one payment channel must stay enabled".to_string());
        }
        match default_payment {
            DefaultPayment::Cod if !cod_enabled => {
                Err("default_payment COD requires cod_enabled".to_string())
            }
            DefaultPayment::Online if !online_enabled => {
                Err("default_payment ONLINE requires online_enabled".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_must_match_enabled_channel() {
        let current = PaymentSettings::default();
        let update = PaymentSettingsUpdate {
            default_payment: Some(DefaultPayment::Cod),
            cod_enabled: Some(false),
            ..Default::default()
        };
        assert!(update.validate_semantics(&current).is_err());

        let update = PaymentSettingsUpdate {
            default_payment: Some(DefaultPayment::Cod),
            ..Default::default()
        };
        assert!(update.validate_semantics(&current).is_ok());
    }

    #[test]
    fn cannot_disable_both_channels() {
        let current = PaymentSettings::default();
        let update = PaymentSettingsUpdate {
            cod_enabled: Some(false),
            online_enabled: Some(false),
            ..Default::default()
        };
        assert!(update.validate_semantics(&current).is_err());
    }
}
