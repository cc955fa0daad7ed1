use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::AuditService;
use crate::auth::{JwtService, LoginThrottle};
use crate::core::Config;
use crate::db::DbService;
use crate::pricing::{FlatSchedule, SnapshotCache, SurchargeSchedule};
use crate::utils::AppError;

/// Server state shared across handlers
///
/// Cloning is shallow; every component is either `Arc`-wrapped or itself a
/// cheap handle.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt: Arc<JwtService>,
    pub audit: AuditService,
    /// Failed-login lockout
    pub throttle: Arc<LoginThrottle>,
    /// Per-kind cache of the enabled rule lists
    pub snapshots: Arc<SnapshotCache>,
    /// Premium uplift strategy
    pub schedule: Arc<dyn SurchargeSchedule>,
}

impl ServerState {
    /// Initialize everything: work directory, database, schema, bootstrap
    /// admin, services
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db_dir = PathBuf::from(&config.work_dir).join("database");
        std::fs::create_dir_all(&db_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db = DbService::new(&db_dir.to_string_lossy()).await?;

        if let Some(password) = &config.default_admin_password {
            db.seed_default_admin(&config.default_admin_username, password)
                .await?;
        }

        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let audit = AuditService::new(db.db.clone());
        let schedule = Arc::new(FlatSchedule {
            remote_percent: config.remote_uplift_percent,
            fragile_percent: config.fragile_uplift_percent,
            electronics_percent: config.electronics_uplift_percent,
            zone_percents: config.zone_uplift_percents.clone(),
        });

        Ok(Self {
            config: config.clone(),
            db,
            jwt,
            audit,
            throttle: Arc::new(LoginThrottle::new()),
            snapshots: Arc::new(SnapshotCache::new()),
            schedule,
        })
    }
}
