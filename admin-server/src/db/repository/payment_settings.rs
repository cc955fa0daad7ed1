//! Payment Settings Repository
//!
//! Single-record table keyed at `payment_settings:main`.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{PaymentSettings, PaymentSettingsUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "payment_settings";
const KEY: &str = "main";

#[derive(Clone)]
pub struct PaymentSettingsRepository {
    base: BaseRepository,
}

impl PaymentSettingsRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Current settings, falling back to defaults when the record is absent
    pub async fn get(&self) -> RepoResult<PaymentSettings> {
        let settings: Option<PaymentSettings> = self.base.db().select((TABLE, KEY)).await?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn update(&self, mut data: PaymentSettingsUpdate) -> RepoResult<PaymentSettings> {
        // Upsert so the first write works without a seed record
        let current = self.get().await?;
        data.updated_at = Some(now_millis());

        let merged = PaymentSettings {
            id: current.id,
            flow: data.flow.unwrap_or(current.flow),
            default_payment: data.default_payment.unwrap_or(current.default_payment),
            cod_enabled: data.cod_enabled.unwrap_or(current.cod_enabled),
            online_enabled: data.online_enabled.unwrap_or(current.online_enabled),
            updated_at: data.updated_at.unwrap_or_else(now_millis),
        };

        let saved: Option<PaymentSettings> = self
            .base
            .db()
            .upsert((TABLE, KEY))
            .content(PaymentSettings { id: None, ..merged })
            .await?;
        saved.ok_or_else(|| RepoError::Database("Failed to save payment settings".to_string()))
    }
}
