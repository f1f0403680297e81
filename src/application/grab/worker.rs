//! Per-task poll / evaluate / purchase loop.
//!
//! A worker owns nothing but its item id. Each tick it fetches listings,
//! takes a fresh snapshot of the task's policy from the supervisor, and
//! reports every state change back through the supervisor.
//!
//! ```text
//!            pause              resume
//!   Running ───────► Suspended ───────► Running
//!      │                 │
//!      │ stop / bought / │ stop
//!      │ rejected / bad  │
//!      ▼   listing       ▼
//!   Terminated ◄─────────┘
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::id::ItemId;
use crate::domain::listing::PurchaseResult;
use crate::domain::policy::{evaluate, BuyReason, Decision};
use crate::domain::task::TaskStatus;
use crate::error::{Error, MarketplaceError, Result};

use super::supervisor::Shared;

/// Control signal published by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSignal {
    Run,
    Suspend,
    Stop,
}

/// Why a worker loop ended.
#[derive(Debug)]
pub(super) enum WorkerExit {
    Purchased {
        name: String,
        price: Decimal,
        reason: BuyReason,
        result: PurchaseResult,
    },
    Rejected {
        name: String,
        message: String,
    },
    MissingListingId {
        name: String,
    },
    Stopped,
    /// Task was removed or already terminal.
    Retired,
}

impl WorkerExit {
    fn label(&self) -> &'static str {
        match self {
            Self::Purchased { .. } => "purchased",
            Self::Rejected { .. } => "rejected",
            Self::MissingListingId { .. } => "missing_listing_id",
            Self::Stopped => "stopped",
            Self::Retired => "retired",
        }
    }
}

enum Wake {
    Elapsed,
    Signalled,
    Stop,
}

pub(super) struct GrabWorker {
    item_id: ItemId,
    generation: u64,
    shared: Arc<Shared>,
    control: watch::Receiver<WorkerSignal>,
}

impl GrabWorker {
    pub(super) fn new(
        item_id: ItemId,
        generation: u64,
        shared: Arc<Shared>,
        control: watch::Receiver<WorkerSignal>,
    ) -> Self {
        Self {
            item_id,
            generation,
            shared,
            control,
        }
    }

    /// Run until terminated, then report the exit to the supervisor.
    pub(super) async fn run(self) {
        let span = info_span!(
            "grab_worker",
            item_id = %self.item_id,
            generation = self.generation
        );
        let mut worker = self;
        async move {
            info!("Worker started");
            let exit = {
                let _running = worker.shared.enter(&worker.item_id);
                worker.run_loop().await
            };
            info!(exit = exit.label(), "Worker terminated");
            worker
                .shared
                .finish(&worker.item_id, worker.generation, exit);
        }
        .instrument(span)
        .await;
    }

    async fn run_loop(&mut self) -> WorkerExit {
        loop {
            let signal = *self.control.borrow_and_update();
            match signal {
                WorkerSignal::Stop => return WorkerExit::Stopped,
                WorkerSignal::Suspend => {
                    let tick = self.shared.ctx.timings.suspended_tick;
                    if let Wake::Stop = self.idle(tick).await {
                        return WorkerExit::Stopped;
                    }
                    continue;
                }
                WorkerSignal::Run => {}
            }

            if let Some(exit) = self.tick().await {
                return exit;
            }

            let interval = self.shared.ctx.settings.poll_interval();
            if let Wake::Stop = self.idle(interval).await {
                return WorkerExit::Stopped;
            }
        }
    }

    /// Sleep for `duration`, waking early on any control change.
    async fn idle(&mut self, duration: Duration) -> Wake {
        tokio::select! {
            () = tokio::time::sleep(duration) => Wake::Elapsed,
            changed = self.control.changed() => match changed {
                // Supervisor gone: nobody can resume or stop us any more.
                Err(_) => Wake::Stop,
                Ok(()) if *self.control.borrow() == WorkerSignal::Stop => Wake::Stop,
                Ok(()) => Wake::Signalled,
            },
        }
    }

    /// Control change that arrived while a call was in flight.
    ///
    /// `Some(None)` skips the rest of the tick; the next idle wakes at once
    /// because the change is still unseen.
    fn interrupted(&self) -> Option<Option<WorkerExit>> {
        match *self.control.borrow() {
            WorkerSignal::Run => None,
            WorkerSignal::Suspend => {
                debug!("Suspended during fetch, skipping evaluation");
                Some(None)
            }
            WorkerSignal::Stop => Some(Some(WorkerExit::Stopped)),
        }
    }

    /// One poll. `None` means keep going.
    async fn tick(&mut self) -> Option<WorkerExit> {
        let ctx = &self.shared.ctx;
        let limit = ctx.timings.request_timeout;

        let listings = match bounded(
            limit,
            "list listings",
            ctx.marketplace.list_listings(&self.item_id),
        )
        .await
        {
            Ok(listings) => listings,
            Err(e) => {
                log_transient(&e, "Listing fetch failed");
                return None;
            }
        };

        if let Some(exit) = self.interrupted() {
            return exit;
        }

        // Policy is read after the fetch so an edit made meanwhile applies now.
        let Some(task) = self.shared.snapshot(&self.item_id) else {
            return Some(WorkerExit::Retired);
        };
        match task.status {
            TaskStatus::Succeeded => return Some(WorkerExit::Retired),
            TaskStatus::Paused => {
                debug!("Task paused during fetch, skipping evaluation");
                return None;
            }
            TaskStatus::Monitoring => {}
        }

        let Some(lowest) = listings.into_iter().next() else {
            info!(name = %task.name, "No listings, still watching");
            return None;
        };

        self.shared.record_min_price(&self.item_id, lowest.price);

        let Some(listing_id) = lowest.id else {
            error!(
                name = %task.name,
                price = %lowest.price,
                "Lowest listing has no id"
            );
            return Some(WorkerExit::MissingListingId { name: task.name });
        };

        let reason = match evaluate(&task.policy(), lowest.price) {
            Decision::Hold => {
                debug!(
                    price = %lowest.price,
                    target = ?task.target_price(),
                    percentage = task.target_percentage().get(),
                    join_price = %task.join_price(),
                    "Price above policy"
                );
                return None;
            }
            Decision::Buy(reason) => reason,
        };

        // Last point at which a pause or removal can still cancel the buy.
        if let Some(exit) = self.interrupted() {
            return exit;
        }

        info!(
            name = %task.name,
            listing_id = %listing_id,
            price = %lowest.price,
            reason = %reason,
            marketplace = ctx.marketplace.marketplace_name(),
            "Price matched, purchasing"
        );

        match bounded(limit, "purchase", ctx.marketplace.purchase(&listing_id)).await {
            Ok(result) if result.success => Some(WorkerExit::Purchased {
                name: task.name,
                price: lowest.price,
                reason,
                result,
            }),
            Ok(result) => Some(WorkerExit::Rejected {
                name: task.name,
                message: result
                    .message
                    .unwrap_or_else(|| "purchase rejected".to_string()),
            }),
            Err(e) => {
                log_transient(&e, "Purchase request failed");
                None
            }
        }
    }
}

/// Await `fut` for at most `limit`.
async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(MarketplaceError::Timeout { operation }.into()),
    }
}

fn log_transient(error: &Error, message: &'static str) {
    if error.is_transient() {
        warn!(error = %error, "{message}");
    } else {
        error!(error = %error, "{message}");
    }
}
