//! Grab worker configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::grab::GrabTimings;
use crate::application::settings::{RuntimeSettings, DEFAULT_POLL_INTERVAL_SECS};
use crate::domain::task::Percentage;

/// `[grab]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GrabConfig {
    /// Seconds between polls, `[1, 60]`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Percentage given to new tasks, `[10, 100]`.
    #[serde(default = "default_percentage")]
    pub default_percentage: i64,
    /// Wake-up cadence of a paused worker.
    #[serde(default = "default_suspended_tick_ms")]
    pub suspended_tick_ms: u64,
    /// How long removal waits for a worker before aborting it.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
    /// Upper bound on each marketplace call made by a worker.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

const fn default_percentage() -> i64 {
    Percentage::DEFAULT.get() as i64
}

const fn default_suspended_tick_ms() -> u64 {
    1_000
}

const fn default_stop_grace_ms() -> u64 {
    1_000
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

impl GrabConfig {
    #[must_use]
    pub fn timings(&self) -> GrabTimings {
        GrabTimings {
            suspended_tick: Duration::from_millis(self.suspended_tick_ms),
            stop_grace: Duration::from_millis(self.stop_grace_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    #[must_use]
    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings::new(
            self.poll_interval_secs,
            Percentage::clamped(self.default_percentage),
        )
    }
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            default_percentage: default_percentage(),
            suspended_tick_ms: default_suspended_tick_ms(),
            stop_grace_ms: default_stop_grace_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
