//! Banner Repository

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{Banner, BannerCreate, BannerUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "banner";

#[derive(Clone)]
pub struct BannerRepository {
    base: BaseRepository,
}

impl BannerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All banners in display order
    pub async fn find_all(&self) -> RepoResult<Vec<Banner>> {
        let banners: Vec<Banner> = self
            .base
            .db()
            .query("SELECT * FROM banner ORDER BY sort_order ASC, created_at ASC")
            .await?
            .take(0)?;
        Ok(banners)
    }

    /// Banners live right now: active and inside their visibility window
    pub async fn find_live(&self) -> RepoResult<Vec<Banner>> {
        let now = now_millis();
        let banners = self.find_all().await?;
        Ok(banners.into_iter().filter(|b| b.is_live(now)).collect())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Banner>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let banner: Option<Banner> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(banner)
    }

    pub async fn create(&self, data: BannerCreate) -> RepoResult<Banner> {
        let banner: Banner = data.into();
        let created: Option<Banner> = self.base.db().create(TABLE).content(banner).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create banner".to_string()))
    }

    pub async fn update(&self, id: &str, mut data: BannerUpdate) -> RepoResult<Banner> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        if self.find_by_id(&pure_id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Banner {} not found", id)));
        }

        data.updated_at = Some(now_millis());
        self.base
            .db()
            .query("UPDATE type::thing($tb, $id) MERGE $data")
            .bind(("tb", TABLE))
            .bind(("id", pure_id.clone()))
            .bind(("data", data))
            .await?;

        self.find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Banner {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let deleted: Option<Banner> = self.base.db().delete((TABLE, pure_id)).await?;
        Ok(deleted.is_some())
    }
}
