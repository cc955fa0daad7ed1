//! Back-office admin server for an e-commerce storefront
//!
//! # Overview
//!
//! - **Pricing engine** (`pricing`): composes a full order cost breakdown
//!   from configured tax rules, charge rules and insurance plans
//! - **Database** (`db`): embedded SurrealDB storage
//! - **Authentication** (`auth`): JWT + Argon2
//! - **Audit trail** (`audit`): append-only record of admin actions
//! - **HTTP API** (`api`): RESTful routes
//!
//! # Module structure
//!
//! ```text
//! admin-server/src/
//! ├── core/          # Configuration, state, server
//! ├── auth/          # JWT authentication, permissions
//! ├── audit/         # Audit trail
//! ├── api/           # HTTP routes and handlers
//! ├── pricing/       # Order cost policy engine
//! ├── utils/         # Errors, logging, time
//! └── db/            # Models and repositories
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod pricing;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use pricing::{Breakdown, OrderContext, evaluate};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
