use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::auth::JwtConfig;
use crate::auth::jwt::generate_printable_secret;

/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | HTTP_PORT | 8080 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | Tracing level filter |
/// | LOG_DIR | (unset) | Daily-rolling log directory, stdout when unset |
/// | JWT_SECRET | (generated) | Signing secret, at least 32 characters |
/// | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
/// | JWT_ISSUER | admin-server | Token issuer |
/// | JWT_AUDIENCE | admin-console | Token audience |
/// | DEFAULT_ADMIN_USERNAME | admin | Bootstrap admin username |
/// | DEFAULT_ADMIN_PASSWORD | (unset) | Bootstrap admin password, seeding skipped when unset |
/// | INSURANCE_REMOTE_UPLIFT_PERCENT | 0 | Premium uplift for remote delivery |
/// | INSURANCE_FRAGILE_UPLIFT_PERCENT | 0 | Premium uplift for fragile items |
/// | INSURANCE_ELECTRONICS_UPLIFT_PERCENT | 0 | Premium uplift for electronics |
/// | INSURANCE_ZONE_UPLIFT_PERCENTS | (empty) | Per-zone uplifts, e.g. `island:8,north_east:4` |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/backoffice HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// JWT settings
    pub jwt: JwtConfig,
    /// Bootstrap admin account, seeded only when the user table is empty
    pub default_admin_username: String,
    pub default_admin_password: Option<String>,
    /// Premium uplift percentages for the flat surcharge schedule
    pub remote_uplift_percent: Decimal,
    pub fragile_uplift_percent: Decimal,
    pub electronics_uplift_percent: Decimal,
    /// Per-zone uplift percentages, keyed by zone code
    pub zone_uplift_percents: HashMap<String, Decimal>,
}

fn env_decimal(key: &str) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Parse `zone:percent` pairs separated by commas, skipping malformed ones
fn env_zone_map(key: &str) -> HashMap<String, Decimal> {
    std::env::var(key)
        .map(|raw| parse_zone_map(&raw))
        .unwrap_or_default()
}

fn parse_zone_map(raw: &str) -> HashMap<String, Decimal> {
    raw.split(',')
        .filter_map(|pair| {
            let (zone, percent) = pair.split_once(':')?;
            let zone = zone.trim();
            if zone.is_empty() {
                return None;
            }
            Some((zone.to_string(), percent.trim().parse().ok()?))
        })
        .collect()
}

impl Config {
    /// Load configuration from the environment, with defaults for anything
    /// unset
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if s.len() >= 32 => s,
            Ok(_) => {
                tracing::warn!("JWT_SECRET shorter than 32 characters, generating one instead");
                generate_printable_secret()
            }
            Err(_) => generate_printable_secret(),
        };

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            jwt: JwtConfig {
                secret,
                expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1440),
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "admin-server".into()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "admin-console".into()),
            },
            default_admin_username: std::env::var("DEFAULT_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".into()),
            default_admin_password: std::env::var("DEFAULT_ADMIN_PASSWORD").ok(),
            remote_uplift_percent: env_decimal("INSURANCE_REMOTE_UPLIFT_PERCENT"),
            fragile_uplift_percent: env_decimal("INSURANCE_FRAGILE_UPLIFT_PERCENT"),
            electronics_uplift_percent: env_decimal("INSURANCE_ELECTRONICS_UPLIFT_PERCENT"),
            zone_uplift_percents: env_zone_map("INSURANCE_ZONE_UPLIFT_PERCENTS"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_map_parsing() {
        let map = parse_zone_map("island:8, north_east:4");
        assert_eq!(map.get("island"), Some(&Decimal::from(8)));
        assert_eq!(map.get("north_east"), Some(&Decimal::from(4)));

        // Malformed pairs are skipped, valid ones kept
        let map = parse_zone_map("island:abc,:5,metro:2");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("metro"), Some(&Decimal::from(2)));

        assert!(parse_zone_map("").is_empty());
    }
}
