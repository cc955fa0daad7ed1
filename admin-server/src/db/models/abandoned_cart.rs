//! Abandoned Cart Model
//!
//! The storefront reports cart snapshots keyed by an opaque cart token.
//! Repeated reports for the same token replace the snapshot; a later
//! conversion marks the cart recovered.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Cart lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    #[default]
    Abandoned,
    Recovered,
}

/// One line of a cart snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Abandoned cart entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbandonedCart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Opaque storefront token, unique per cart
    pub cart_token: String,
    pub customer_email: Option<String>,
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub status: CartStatus,
    /// Last snapshot time (milliseconds since epoch)
    pub last_seen_at: i64,
    /// Conversion time (milliseconds since epoch)
    pub recovered_at: Option<i64>,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
}

/// Cart snapshot payload reported by the storefront
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartTrackRequest {
    #[validate(length(min = 1, max = 128))]
    pub cart_token: String,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
}

impl CartTrackRequest {
    pub fn validate_semantics(&self) -> Result<(), String> {
        if self.subtotal < Decimal::ZERO {
            return Err("subtotal must not be negative".to_string());
        }
        if self.items.iter().any(|i| i.unit_price < Decimal::ZERO) {
            return Err("item prices must not be negative".to_string());
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err("item quantity must be at least 1".to_string());
        }
        Ok(())
    }
}
