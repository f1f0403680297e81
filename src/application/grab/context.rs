//! Process-scoped dependencies handed to the supervisor and its workers.

use std::sync::Arc;
use std::time::Duration;

use crate::application::settings::RuntimeSettings;
use crate::port::outbound::marketplace::MarketplaceClient;
use crate::port::outbound::store::TaskStore;

/// Fixed timing knobs for workers.
#[derive(Debug, Clone, Copy)]
pub struct GrabTimings {
    /// How often a suspended worker wakes up on its own.
    pub suspended_tick: Duration,
    /// How long `remove` waits for a worker before aborting it.
    pub stop_grace: Duration,
    /// Upper bound on each marketplace call.
    pub request_timeout: Duration,
}

impl Default for GrabTimings {
    fn default() -> Self {
        Self {
            suspended_tick: Duration::from_secs(1),
            stop_grace: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Everything a worker needs besides its own task.
///
/// Built once at startup and passed explicitly; cloning shares the same
/// client, store and settings.
#[derive(Clone)]
pub struct GrabContext {
    pub marketplace: Arc<dyn MarketplaceClient>,
    pub store: Arc<dyn TaskStore>,
    pub settings: Arc<RuntimeSettings>,
    pub timings: GrabTimings,
}

impl GrabContext {
    #[must_use]
    pub fn new(
        marketplace: Arc<dyn MarketplaceClient>,
        store: Arc<dyn TaskStore>,
        settings: Arc<RuntimeSettings>,
    ) -> Self {
        Self {
            marketplace,
            store,
            settings,
            timings: GrabTimings::default(),
        }
    }

    #[must_use]
    pub fn with_timings(mut self, timings: GrabTimings) -> Self {
        self.timings = timings;
        self
    }
}
