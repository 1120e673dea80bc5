//! Sliding-window state and the admission algorithm.

use std::time::{Duration, Instant};

use crate::error::{FloodgateError, Result};

/// Default window duration when none has been configured.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Default request limit when none has been configured.
pub const DEFAULT_LIMIT: u32 = 100;

/// A window duration and request limit pair.
///
/// Both fields are guaranteed strictly positive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Length of the sliding window
    pub window: Duration,
    /// Maximum requests admitted within the window
    pub limit: u32,
}

impl WindowConfig {
    /// Create a new window configuration.
    ///
    /// Returns [`FloodgateError::InvalidConfig`] if the window is zero or the
    /// limit is zero.
    pub fn new(window: Duration, limit: u32) -> Result<Self> {
        if window.is_zero() {
            return Err(FloodgateError::InvalidConfig(
                "window duration must be positive".to_string(),
            ));
        }
        if limit == 0 {
            return Err(FloodgateError::InvalidConfig(
                "request limit must be positive".to_string(),
            ));
        }
        Ok(Self { window, limit })
    }

    /// Create a window configuration from caller-supplied integers.
    ///
    /// Both values must be strictly positive. This is the validation point
    /// for the configure operations, so it accepts signed integers and
    /// rejects anything non-positive before state is touched.
    pub fn from_seconds(window_seconds: i64, limit: i64) -> Result<Self> {
        if window_seconds <= 0 {
            return Err(FloodgateError::InvalidConfig(format!(
                "window_seconds must be positive, got {}",
                window_seconds
            )));
        }
        if limit <= 0 || limit > u32::MAX as i64 {
            return Err(FloodgateError::InvalidConfig(format!(
                "limit must be a positive 32-bit integer, got {}",
                limit
            )));
        }
        Self::new(Duration::from_secs(window_seconds as u64), limit as u32)
    }

    /// Window duration in whole seconds.
    pub fn window_seconds(&self) -> u64 {
        self.window.as_secs()
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// The outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request was admitted
    pub allowed: bool,
    /// Requests left in the window after this decision
    pub remaining: u32,
    /// Whole seconds until capacity frees up, only set on denial.
    ///
    /// Rounded up and floored at 1, so a denied caller never sees a
    /// "retry immediately" signal.
    pub retry_after: Option<u64>,
}

/// Timestamp history of admitted requests for one client.
///
/// Entries are appended on admission and removed in bulk when they fall out
/// of the window, either during a check or by the eviction sweeper.
#[derive(Debug, Default)]
pub struct RequestLog {
    timestamps: Vec<Instant>,
}

impl RequestLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every timestamp that has fallen out of the window.
    ///
    /// A timestamp `t` is live while `now - t < window`, a strict sliding
    /// window relative to `now` with no bucketing.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        self.timestamps.retain(|&t| now.duration_since(t) < window);
    }

    /// Number of recorded timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the log holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The earliest recorded timestamp, if any.
    pub fn oldest(&self) -> Option<Instant> {
        self.timestamps.iter().min().copied()
    }

    /// Run the admission algorithm against this log.
    ///
    /// Prunes expired entries, counts the live ones, and either records
    /// `now` and admits or denies with a retry hint. The pruned view is kept
    /// on both branches so expired entries never linger past a check.
    pub fn admit(&mut self, config: &WindowConfig, now: Instant) -> Decision {
        self.prune(now, config.window);

        let live = self.timestamps.len() as u32;
        if live < config.limit {
            self.timestamps.push(now);
            return Decision {
                allowed: true,
                remaining: config.limit - (live + 1),
                retry_after: None,
            };
        }

        // Denied: the log is non-empty here since limit >= 1.
        let retry_after = self
            .oldest()
            .map(|oldest| {
                let wait = config.window.saturating_sub(now.duration_since(oldest));
                (wait.as_millis() as u64).div_ceil(1000).max(1)
            })
            .unwrap_or(1);

        Decision {
            allowed: false,
            remaining: 0,
            retry_after: Some(retry_after),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(window_ms: u64, limit: u32) -> WindowConfig {
        WindowConfig::new(Duration::from_millis(window_ms), limit).unwrap()
    }

    #[test]
    fn test_config_rejects_zero_window() {
        assert!(WindowConfig::new(Duration::ZERO, 10).is_err());
        assert!(WindowConfig::from_seconds(0, 10).is_err());
        assert!(WindowConfig::from_seconds(-5, 10).is_err());
    }

    #[test]
    fn test_config_rejects_zero_limit() {
        assert!(WindowConfig::new(Duration::from_secs(60), 0).is_err());
        assert!(WindowConfig::from_seconds(60, 0).is_err());
        assert!(WindowConfig::from_seconds(60, -1).is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.window, Duration::from_secs(60));
        assert_eq!(config.limit, 100);
    }

    #[test]
    fn test_remaining_decrements_per_admission() {
        let config = config(60_000, 5);
        let mut log = RequestLog::new();
        let now = Instant::now();

        for i in 1..=5u32 {
            let decision = log.admit(&config, now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, 5 - i);
        }
    }

    #[test]
    fn test_denied_at_limit() {
        let config = config(60_000, 2);
        let mut log = RequestLog::new();
        let now = Instant::now();

        assert!(log.admit(&config, now).allowed);
        assert!(log.admit(&config, now).allowed);

        let decision = log.admit(&config, now);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert!(decision.retry_after.unwrap() >= 1);
    }

    #[test]
    fn test_denied_does_not_record() {
        let config = config(60_000, 1);
        let mut log = RequestLog::new();
        let now = Instant::now();

        log.admit(&config, now);
        log.admit(&config, now);
        log.admit(&config, now);

        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_expired_entries_admit_again() {
        let config = config(1_000, 2);
        let mut log = RequestLog::new();
        let start = Instant::now();

        assert!(log.admit(&config, start).allowed);
        assert!(log.admit(&config, start).allowed);
        assert!(!log.admit(&config, start).allowed);

        // Just past the window, both entries expire.
        let later = start + Duration::from_millis(1_001);
        let decision = log.admit(&config, later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let config = config(60_000, 1);
        let mut log = RequestLog::new();
        let start = Instant::now();

        log.admit(&config, start);

        // 59.5s of the window left: rounds up to 60.
        let decision = log.admit(&config, start + Duration::from_millis(500));
        assert_eq!(decision.retry_after, Some(60));
    }

    #[test]
    fn test_retry_after_floors_at_one() {
        let config = config(1_000, 1);
        let mut log = RequestLog::new();
        let start = Instant::now();

        log.admit(&config, start);

        // 1ms of the window left still reports a whole second.
        let decision = log.admit(&config, start + Duration::from_millis(999));
        assert_eq!(decision.retry_after, Some(1));
    }

    #[test]
    fn test_prune_keeps_live_entries() {
        let config = config(1_000, 10);
        let mut log = RequestLog::new();
        let start = Instant::now();

        log.admit(&config, start);
        log.admit(&config, start + Duration::from_millis(800));

        log.prune(start + Duration::from_millis(1_100), config.window);
        assert_eq!(log.len(), 1);

        log.prune(start + Duration::from_millis(2_000), config.window);
        assert!(log.is_empty());
    }
}
