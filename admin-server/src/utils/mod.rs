//! Utility Module
//!
//! Shared helpers used across the server:
//! - [`error`] - application error type and response envelope
//! - [`logger`] - tracing setup
//! - [`time`] - timestamp helpers

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResponse, AppResult};
