//! Timestamp helpers
//!
//! All persistence uses `i64` Unix millis; conversion from wall-clock
//! happens here so repositories never touch `chrono` directly.

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
