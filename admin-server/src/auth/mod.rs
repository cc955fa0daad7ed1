//! Authentication Module
//!
//! JWT issuance/validation and the Axum middleware that enforces it.

pub mod jwt;
pub mod middleware;
pub mod throttle;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_auth, require_permission};
pub use throttle::LoginThrottle;
