use std::collections::HashMap;
use std::sync::Mutex;
use time::{OffsetDateTime, Duration};
use tracing::{warn, error};

#[derive(Debug)]
struct Window {
    attempts: u32,
    started: OffsetDateTime,
}

/// Fixed-window limiter keyed by caller, used to throttle vote submissions.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after_secs: i64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(30, 60)
    }
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_secs: i64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_attempts,
            window: Duration::seconds(window_secs),
        }
    }

    pub fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, OffsetDateTime::now_utc())
    }

    pub fn check_at(&self, key: &str, now: OffsetDateTime) -> Result<(), RateLimited> {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(e) => {
                // a poisoned limiter must not block voting
                error!("Failed to acquire rate limit lock: {}", e);
                return Ok(());
            }
        };

        let window = windows.entry(key.to_string()).or_insert(Window { attempts: 0, started: now });
        if now - window.started > self.window {
            *window = Window { attempts: 0, started: now };
        }

        if window.attempts >= self.max_attempts {
            let retry_after = (window.started + self.window - now).whole_seconds().max(1);
            warn!("Rate limit triggered for key {}", key);
            return Err(RateLimited { retry_after_secs: retry_after });
        }

        window.attempts += 1;
        Ok(())
    }

    /// Drops windows that have expired; returns how many were removed.
    pub fn prune(&self, now: OffsetDateTime) -> usize {
        match self.windows.lock() {
            Ok(mut windows) => {
                let before = windows.len();
                windows.retain(|_, w| now - w.started <= self.window);
                before - windows.len()
            }
            Err(e) => {
                error!("Failed to acquire rate limit lock: {}", e);
                0
            }
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}
