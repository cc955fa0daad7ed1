//! Login throttling
//!
//! Failed attempts are counted per username in a lock-free map. Once the
//! limit is hit, further attempts are refused until the window expires. A
//! successful login clears the counter.

use dashmap::DashMap;

use crate::utils::time::now_millis;

const MAX_ATTEMPTS: u32 = 5;
const WINDOW_MILLIS: i64 = 15 * 60 * 1000;

#[derive(Debug, Clone, Copy)]
struct Attempts {
    count: u32,
    first_at: i64,
}

/// Per-username failed-login counter
#[derive(Debug, Default)]
pub struct LoginThrottle {
    attempts: DashMap<String, Attempts>,
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the username is currently locked out
    pub fn is_locked(&self, username: &str) -> bool {
        self.is_locked_at(username, now_millis())
    }

    /// Count one failure, restarting the window when the old one expired
    pub fn record_failure(&self, username: &str) {
        self.record_failure_at(username, now_millis());
    }

    pub fn clear(&self, username: &str) {
        self.attempts.remove(username);
    }

    fn is_locked_at(&self, username: &str, now: i64) -> bool {
        self.attempts
            .get(username)
            .map(|a| a.count >= MAX_ATTEMPTS && now - a.first_at < WINDOW_MILLIS)
            .unwrap_or(false)
    }

    fn record_failure_at(&self, username: &str, now: i64) {
        let mut entry = self
            .attempts
            .entry(username.to_string())
            .or_insert(Attempts { count: 0, first_at: now });
        if now - entry.first_at >= WINDOW_MILLIS {
            *entry = Attempts { count: 0, first_at: now };
        }
        entry.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_after_max_attempts() {
        let throttle = LoginThrottle::new();
        for _ in 0..MAX_ATTEMPTS - 1 {
            throttle.record_failure_at("root", 0);
        }
        assert!(!throttle.is_locked_at("root", 1));

        throttle.record_failure_at("root", 0);
        assert!(throttle.is_locked_at("root", 1));
        // Another user is unaffected
        assert!(!throttle.is_locked_at("ops", 1));
    }

    #[test]
    fn lock_expires_with_window() {
        let throttle = LoginThrottle::new();
        for _ in 0..MAX_ATTEMPTS {
            throttle.record_failure_at("root", 0);
        }
        assert!(throttle.is_locked_at("root", WINDOW_MILLIS - 1));
        assert!(!throttle.is_locked_at("root", WINDOW_MILLIS));
    }

    #[test]
    fn success_clears_counter() {
        let throttle = LoginThrottle::new();
        for _ in 0..MAX_ATTEMPTS {
            throttle.record_failure_at("root", 0);
        }
        throttle.clear("root");
        assert!(!throttle.is_locked_at("root", 1));
    }
}
