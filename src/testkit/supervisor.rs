//! Ready-made supervisor wiring for tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::adapter::outbound::store::MemoryTaskStore;
use crate::application::grab::{GrabContext, GrabTimings, WorkerSupervisor};
use crate::application::settings::RuntimeSettings;
use crate::domain::task::Percentage;
use crate::port::outbound::notifier::Event;

use super::marketplace::ScriptedMarketplace;

/// Timings short enough for paused-clock tests.
pub fn fast_timings() -> GrabTimings {
    GrabTimings {
        suspended_tick: Duration::from_millis(100),
        stop_grace: Duration::from_millis(200),
        request_timeout: Duration::from_secs(2),
    }
}

/// A supervisor over `marketplace` and an in-memory store.
pub struct Rig {
    pub supervisor: WorkerSupervisor,
    pub events: mpsc::UnboundedReceiver<Event>,
    pub marketplace: ScriptedMarketplace,
    pub store: Arc<MemoryTaskStore>,
}

impl Rig {
    /// One-second polling, default percentage 70.
    pub fn new(marketplace: ScriptedMarketplace) -> Self {
        Self::with_store(marketplace, Arc::new(MemoryTaskStore::new()))
    }

    pub fn with_store(marketplace: ScriptedMarketplace, store: Arc<MemoryTaskStore>) -> Self {
        let settings = Arc::new(RuntimeSettings::new(1, Percentage::DEFAULT));
        let ctx = GrabContext::new(Arc::new(marketplace.clone()), store.clone(), settings)
            .with_timings(fast_timings());
        let (supervisor, events) = WorkerSupervisor::new(ctx);
        Self {
            supervisor,
            events,
            marketplace,
            store,
        }
    }

    /// Drain every event emitted so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
