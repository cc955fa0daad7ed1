//! Admin User Model

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Admin role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    /// Full read/write access
    Admin,
    /// Read-only access
    Viewer,
}

impl AdminRole {
    /// Permissions granted by this role, in "resource:action" form
    pub fn permissions(&self) -> Vec<String> {
        let resources = [
            "tax_rules",
            "charge_rules",
            "insurance_plans",
            "payment_settings",
            "banners",
            "abandoned_carts",
            "audit_log",
            "quote",
        ];
        let mut perms: Vec<String> = resources.iter().map(|r| format!("{}:read", r)).collect();
        if matches!(self, AdminRole::Admin) {
            perms.extend(resources.iter().map(|r| format!("{}:manage", r)));
        }
        perms
    }
}

/// Admin user entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub username: String,
    /// Argon2id PHC string. Entities stay server-side; the API returns
    /// `LoginResponse`, never this struct.
    pub password_hash: String,
    pub display_name: String,
    pub role: AdminRole,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl AdminUser {
    /// Hash a plaintext password with Argon2id and a random salt
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
    }

    /// Verify a plaintext password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Login request payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub display_name: String,
    pub role: AdminRole,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let hash = AdminUser::hash_password("s3cret!").unwrap();
        let user = AdminUser {
            id: None,
            username: "root".to_string(),
            password_hash: hash,
            display_name: "Root".to_string(),
            role: AdminRole::Admin,
            is_active: true,
            created_at: 0,
        };
        assert!(user.verify_password("s3cret!"));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn viewer_has_no_manage_permissions() {
        let perms = AdminRole::Viewer.permissions();
        assert!(perms.iter().any(|p| p == "tax_rules:read"));
        assert!(!perms.iter().any(|p| p.ends_with(":manage")));
    }
}
