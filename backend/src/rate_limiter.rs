use std::collections::HashMap;
use std::sync::Mutex;
use time::{OffsetDateTime, Duration};
use tracing::{warn, error};

use crate::error::ApiError;

/// One week. Longer windows are clamped to this.
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug)]
struct Window {
    attempts: u32,
    started_at: OffsetDateTime,
}

/// Fixed-window attempt counter keyed by an arbitrary string.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_attempts: max_attempts.max(1),
            window: Duration::minutes(window_minutes.clamp(1, MAX_WINDOW_MINUTES)),
        }
    }

    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        self.check_at(key, OffsetDateTime::now_utc())
    }

    fn check_at(&self, key: &str, now: OffsetDateTime) -> Result<(), ApiError> {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to acquire rate limit lock: {}", e);
                return Err(ApiError::Internal("rate limiter lock poisoned".into()));
            }
        };

        let retention = self.window.saturating_mul(2);
        windows.retain(|_, w| now - w.started_at <= retention);

        let window = windows.entry(key.to_string()).or_insert(Window { attempts: 0, started_at: now });
        if now - window.started_at > self.window {
            *window = Window { attempts: 0, started_at: now };
        }

        if window.attempts >= self.max_attempts {
            let remaining = window
                .started_at
                .checked_add(self.window)
                .map_or(self.window, |ends_at| ends_at - now);
            let minutes_to_wait = remaining.whole_minutes().max(1);
            warn!("Rate limit triggered for key {}", key);
            return Err(ApiError::RateLimited(format!(
                "Rate limit exceeded. Please try again in {} minutes.",
                minutes_to_wait
            )));
        }

        window.attempts += 1;
        Ok(())
    }
}
