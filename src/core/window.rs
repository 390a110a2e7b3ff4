//! Offline window resolution.
//!
//! Clamps the raw time since the player was last active to the settlement
//! window and decides whether there is anything worth settling.

use chrono::{DateTime, Utc};

use super::config::EngineConfig;
use super::constants::SECONDS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineWindow {
    /// Raw `now - last_active_at`, negative when the timestamp is ahead of now
    pub elapsed_seconds: i64,
    /// Elapsed time clamped to `[0, max window]`
    pub effective_seconds: i64,
    min_settle_seconds: i64,
}

impl OfflineWindow {
    pub fn resolve(last_active_at: DateTime<Utc>, now: DateTime<Utc>, config: &EngineConfig) -> Self {
        let elapsed_seconds = (now - last_active_at).num_seconds();
        Self::from_elapsed(
            elapsed_seconds,
            config.max_offline_seconds(),
            config.min_settle_seconds,
        )
    }

    pub fn from_elapsed(elapsed_seconds: i64, max_seconds: i64, min_settle_seconds: i64) -> Self {
        Self {
            elapsed_seconds,
            effective_seconds: elapsed_seconds.clamp(0, max_seconds.max(0)),
            min_settle_seconds,
        }
    }

    pub fn effective_hours(&self) -> f64 {
        self.effective_seconds as f64 / SECONDS_PER_HOUR
    }

    /// True when the last-active timestamp lies after `now`.
    pub fn is_in_future(&self) -> bool {
        self.elapsed_seconds < 0
    }

    pub fn was_clamped(&self) -> bool {
        self.elapsed_seconds > self.effective_seconds
    }

    /// Short reconnects are not settled at all.
    pub fn needs_settlement(&self) -> bool {
        self.effective_seconds >= self.min_settle_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_clamps_to_24_hours() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let window = OfflineWindow::resolve(now - Duration::hours(30), now, &config);

        assert_eq!(window.effective_seconds, 24 * 3600);
        assert!(window.was_clamped());
        assert!((window.effective_hours() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_under_a_minute_is_not_settled() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let window = OfflineWindow::resolve(now - Duration::seconds(59), now, &config);

        assert_eq!(window.effective_seconds, 59);
        assert!(!window.needs_settlement());
    }

    #[test]
    fn test_window_exactly_one_minute_is_settled() {
        let window = OfflineWindow::from_elapsed(60, 86_400, 60);
        assert!(window.needs_settlement());
    }

    #[test]
    fn test_future_timestamp_has_zero_effective_time() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let window = OfflineWindow::resolve(now + Duration::hours(1), now, &config);

        assert!(window.is_in_future());
        assert_eq!(window.effective_seconds, 0);
        assert!(!window.needs_settlement());
    }
}
