use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::{info, warn};

/// Suppresses repeats of the same log line inside a time window. Lines are
/// keyed by call site, so unrelated messages never throttle each other.
pub struct ThrottledLog {
    window: Duration,
    last_logged: HashMap<&'static str, Instant>,
}

impl ThrottledLog {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_logged: HashMap::new(),
        }
    }

    /// Whether a line keyed `key` may be logged at `now`. Returning `true`
    /// starts a new window for that key.
    pub fn should_log(&mut self, key: &'static str, now: Instant) -> bool {
        match self.last_logged.get(key) {
            Some(last) if now.saturating_duration_since(*last) < self.window => false,
            _ => {
                self.last_logged.insert(key, now);
                true
            }
        }
    }

    pub fn warn(&mut self, key: &'static str, now: Instant, message: &str) {
        if self.should_log(key, now) {
            warn!("{}", message);
        }
    }

    pub fn info(&mut self, key: &'static str, now: Instant, message: &str) {
        if self.should_log(key, now) {
            info!("{}", message);
        }
    }

    pub fn clear(&mut self) {
        self.last_logged.clear();
    }
}

impl Default for ThrottledLog {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
