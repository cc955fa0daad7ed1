//! Abandoned Cart Repository

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{AbandonedCart, CartStatus, CartTrackRequest};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "abandoned_cart";

#[derive(Clone)]
pub struct AbandonedCartRepository {
    base: BaseRepository,
}

impl AbandonedCartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Most recent carts first, optionally filtered by status
    pub async fn find_page(
        &self,
        status: Option<CartStatus>,
        offset: usize,
        limit: usize,
    ) -> RepoResult<Vec<AbandonedCart>> {
        let carts: Vec<AbandonedCart> = match status {
            Some(status) => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM abandoned_cart WHERE status = $status \
                         ORDER BY last_seen_at DESC LIMIT $limit START $offset",
                    )
                    .bind(("status", status))
                    .bind(("limit", limit))
                    .bind(("offset", offset))
                    .await?
                    .take(0)?
            }
            None => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM abandoned_cart \
                         ORDER BY last_seen_at DESC LIMIT $limit START $offset",
                    )
                    .bind(("limit", limit))
                    .bind(("offset", offset))
                    .await?
                    .take(0)?
            }
        };
        Ok(carts)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AbandonedCart>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let cart: Option<AbandonedCart> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(cart)
    }

    pub async fn find_by_token(&self, token: &str) -> RepoResult<Option<AbandonedCart>> {
        let token_owned = token.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM abandoned_cart WHERE cart_token = $token LIMIT 1")
            .bind(("token", token_owned))
            .await?;
        let carts: Vec<AbandonedCart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    /// Record a cart snapshot. Repeated reports for the same token replace
    /// the snapshot and reset the cart to ABANDONED.
    pub async fn track(&self, req: CartTrackRequest) -> RepoResult<AbandonedCart> {
        let now = now_millis();
        let cart = match self.find_by_token(&req.cart_token).await? {
            Some(existing) => AbandonedCart {
                customer_email: req.customer_email.or(existing.customer_email),
                items: req.items,
                subtotal: req.subtotal,
                status: CartStatus::Abandoned,
                last_seen_at: now,
                recovered_at: None,
                ..existing
            },
            None => AbandonedCart {
                id: None,
                cart_token: req.cart_token,
                customer_email: req.customer_email,
                items: req.items,
                subtotal: req.subtotal,
                status: CartStatus::Abandoned,
                last_seen_at: now,
                recovered_at: None,
                created_at: now,
            },
        };

        let saved: Option<AbandonedCart> = match &cart.id {
            Some(id) => {
                let key = id.key().to_string();
                self.base
                    .db()
                    .upsert((TABLE, key))
                    .content(AbandonedCart { id: None, ..cart })
                    .await?
            }
            None => self.base.db().create(TABLE).content(cart).await?,
        };
        saved.ok_or_else(|| RepoError::Database("Failed to save cart snapshot".to_string()))
    }

    /// Mark a cart recovered. Idempotent: recovering twice keeps the first
    /// recovery timestamp.
    pub async fn mark_recovered(&self, id: &str) -> RepoResult<AbandonedCart> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let existing = self
            .find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Cart {} not found", id)))?;

        if existing.status == CartStatus::Recovered {
            return Ok(existing);
        }

        self.base
            .db()
            .query(
                "UPDATE type::thing($tb, $id) \
                 SET status = $status, recovered_at = $now",
            )
            .bind(("tb", TABLE))
            .bind(("id", pure_id.clone()))
            .bind(("status", CartStatus::Recovered))
            .bind(("now", now_millis()))
            .await?;

        self.find_by_id(&pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Cart {} not found", id)))
    }

    /// Drop carts last seen before the cutoff, returning how many were removed
    pub async fn purge_before(&self, cutoff_millis: i64) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                "LET $victims = (SELECT VALUE id FROM abandoned_cart WHERE last_seen_at < $cutoff); \
                 DELETE abandoned_cart WHERE last_seen_at < $cutoff; \
                 RETURN array::len($victims);",
            )
            .bind(("cutoff", cutoff_millis))
            .await?;
        let count: Option<usize> = result.take(2)?;
        Ok(count.unwrap_or(0))
    }
}
