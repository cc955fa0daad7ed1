//! Storefront Banner Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::time::now_millis;

/// Banner entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub active: bool,
    /// Visibility window start (milliseconds since epoch), open when absent
    pub starts_at: Option<i64>,
    /// Visibility window end (milliseconds since epoch), open when absent
    pub ends_at: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
    /// Updated timestamp (milliseconds since epoch)
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl Banner {
    /// Active flag plus inside the visibility window
    pub fn is_live(&self, now: i64) -> bool {
        self.active
            && self.starts_at.is_none_or(|s| s <= now)
            && self.ends_at.is_none_or(|e| now < e)
    }
}

/// Create banner payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BannerCreate {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url)]
    pub image_url: String,
    #[validate(url)]
    pub link_url: Option<String>,
    pub active: Option<bool>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub sort_order: Option<i32>,
}

impl BannerCreate {
    pub fn validate_semantics(&self) -> Result<(), String> {
        if let (Some(s), Some(e)) = (self.starts_at, self.ends_at)
            && e <= s
        {
            return Err("ends_at must be after starts_at".to_string());
        }
        Ok(())
    }
}

impl From<BannerCreate> for Banner {
    fn from(c: BannerCreate) -> Self {
        let now = now_millis();
        Banner {
            id: None,
            title: c.title,
            image_url: c.image_url,
            link_url: c.link_url,
            active: c.active.unwrap_or(true),
            starts_at: c.starts_at,
            ends_at: c.ends_at,
            sort_order: c.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update banner payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct BannerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    /// Always bumped server-side
    pub updated_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_banner(active: bool, starts_at: Option<i64>, ends_at: Option<i64>) -> Banner {
        Banner {
            id: None,
            title: "Summer sale".to_string(),
            image_url: "https://cdn.example.com/summer.png".to_string(),
            link_url: None,
            active,
            starts_at,
            ends_at,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn live_window() {
        let b = make_banner(true, Some(100), Some(200));
        assert!(!b.is_live(99));
        assert!(b.is_live(100));
        assert!(b.is_live(199));
        assert!(!b.is_live(200));
    }

    #[test]
    fn inactive_never_live() {
        let b = make_banner(false, None, None);
        assert!(!b.is_live(150));
    }

    #[test]
    fn open_ended_window() {
        let b = make_banner(true, None, None);
        assert!(b.is_live(0));
        assert!(b.is_live(i64::MAX));
    }
}
