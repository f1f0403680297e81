//! Operator-adjustable settings shared by every worker.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::Duration;

use crate::domain::task::Percentage;
use crate::port::outbound::store::OperatorSettings;

/// Smallest polling interval in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;
/// Largest polling interval in seconds.
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;
/// Polling interval used when nothing is configured.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Global polling interval and default percentage.
///
/// Workers read the interval once per tick, so a change applies from the next
/// sleep onward. The default percentage only seeds tasks created afterwards.
#[derive(Debug)]
pub struct RuntimeSettings {
    poll_interval_secs: AtomicU64,
    default_percentage: AtomicU8,
}

impl RuntimeSettings {
    /// Create settings, clamping both values into range.
    #[must_use]
    pub fn new(poll_interval_secs: u64, default_percentage: Percentage) -> Self {
        Self {
            poll_interval_secs: AtomicU64::new(clamp_interval(poll_interval_secs)),
            default_percentage: AtomicU8::new(default_percentage.get()),
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.load(Ordering::Relaxed))
    }

    /// Set the polling interval, clamped to `[1, 60]`. Returns the stored value.
    pub fn set_poll_interval_secs(&self, secs: u64) -> u64 {
        let secs = clamp_interval(secs);
        self.poll_interval_secs.store(secs, Ordering::Relaxed);
        secs
    }

    #[must_use]
    pub fn default_percentage(&self) -> Percentage {
        Percentage::clamped(i64::from(self.default_percentage.load(Ordering::Relaxed)))
    }

    pub fn set_default_percentage(&self, percentage: Percentage) {
        self.default_percentage
            .store(percentage.get(), Ordering::Relaxed);
    }

    /// Current values, for persisting.
    #[must_use]
    pub fn snapshot(&self) -> OperatorSettings {
        OperatorSettings {
            poll_interval_secs: self.poll_interval().as_secs(),
            default_percentage: self.default_percentage(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_SECS, Percentage::DEFAULT)
    }
}

fn clamp_interval(secs: u64) -> u64 {
    secs.clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_operator_defaults() {
        let settings = RuntimeSettings::default();
        assert_eq!(settings.poll_interval(), Duration::from_secs(3));
        assert_eq!(settings.default_percentage().get(), 70);
    }

    #[test]
    fn interval_is_clamped() {
        let settings = RuntimeSettings::default();
        assert_eq!(settings.set_poll_interval_secs(0), 1);
        assert_eq!(settings.set_poll_interval_secs(600), 60);
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn snapshot_reflects_latest_changes() {
        let settings = RuntimeSettings::default();
        settings.set_poll_interval_secs(12);
        settings.set_default_percentage(Percentage::clamped(40));
        assert_eq!(
            settings.snapshot(),
            OperatorSettings {
                poll_interval_secs: 12,
                default_percentage: Percentage::clamped(40),
            }
        );
    }

    #[test]
    fn default_percentage_round_trips() {
        let settings = RuntimeSettings::default();
        settings.set_default_percentage(Percentage::clamped(85));
        assert_eq!(settings.default_percentage().get(), 85);
    }
}
