//! Admin User Repository

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{AdminRole, AdminUser};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "admin_user";

#[derive(Clone)]
pub struct AdminUserRepository {
    base: BaseRepository,
}

impl AdminUserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<AdminUser>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM admin_user WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let users: Vec<AdminUser> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AdminUser>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let user: Option<AdminUser> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(user)
    }

    pub async fn count(&self) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query("RETURN count(SELECT VALUE id FROM admin_user)")
            .await?;
        let count: Option<usize> = result.take(0)?;
        Ok(count.unwrap_or(0))
    }

    pub async fn create(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
        role: AdminRole,
    ) -> RepoResult<AdminUser> {
        if self.find_by_username(username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Admin user '{}' already exists",
                username
            )));
        }

        let password_hash = AdminUser::hash_password(password)
            .map_err(|e| RepoError::Validation(format!("Password hashing failed: {}", e)))?;

        let user = AdminUser {
            id: None,
            username: username.to_string(),
            password_hash,
            display_name: display_name.to_string(),
            role,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<AdminUser> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create admin user".to_string()))
    }
}
