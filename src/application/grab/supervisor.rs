//! Task registry and worker lifecycle.
//!
//! The supervisor owns every [`GrabTask`] and at most one worker per task.
//! Workers are spawned on add or resume, suspended in place on pause, and
//! stopped on remove or shutdown. All task mutations go through here so that
//! persistence and notifications happen exactly once per change.
//!
//! Locking: the `workers` entry for an item is always taken before the
//! `tasks` entry for the same item, never the other way round.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::join_all;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::settings::RuntimeSettings;
use crate::domain::id::ItemId;
use crate::domain::task::{GrabTask, NewTask, Percentage, TaskStatus};
use crate::error::{Result, TaskError};
use crate::port::outbound::notifier::{Event, PauseEvent, PurchaseEvent};

use super::context::GrabContext;
use super::worker::{GrabWorker, WorkerExit, WorkerSignal};

/// Edit to a task's buy policy. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyUpdate {
    /// `Some(None)` clears the absolute target.
    pub target_price: Option<Option<Decimal>>,
    /// Clamped into `[10, 100]`.
    pub percentage: Option<i64>,
}

impl PolicyUpdate {
    #[must_use]
    pub fn target_price(price: Option<Decimal>) -> Self {
        Self {
            target_price: Some(price),
            percentage: None,
        }
    }

    #[must_use]
    pub fn percentage(percentage: i64) -> Self {
        Self {
            target_price: None,
            percentage: Some(percentage),
        }
    }
}

struct WorkerHandle {
    generation: u64,
    control: watch::Sender<WorkerSignal>,
    join: Option<JoinHandle<()>>,
    stopping: bool,
}

impl WorkerHandle {
    fn is_alive(&self) -> bool {
        !self.stopping && self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    fn signal(&self, signal: WorkerSignal) {
        self.control.send_if_modified(|current| {
            if *current == signal {
                false
            } else {
                *current = signal;
                true
            }
        });
    }
}

pub(super) struct Shared {
    pub(super) ctx: GrabContext,
    tasks: DashMap<ItemId, GrabTask>,
    workers: DashMap<ItemId, WorkerHandle>,
    generations: AtomicU64,
    /// Worker loops currently executing, per item. Includes stopping ones.
    running: DashMap<ItemId, usize>,
    peak_running: AtomicUsize,
    save_lock: Mutex<()>,
    events: mpsc::UnboundedSender<Event>,
}

/// Counts one executing worker loop until dropped, including on abort.
pub(super) struct RunningGuard {
    shared: Arc<Shared>,
    item_id: ItemId,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let emptied = match self.shared.running.get_mut(&self.item_id) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => false,
        };
        if emptied {
            self.shared.running.remove_if(&self.item_id, |_, count| *count == 0);
        }
    }
}

impl Shared {
    /// Consistent copy of one task.
    pub(super) fn snapshot(&self, id: &ItemId) -> Option<GrabTask> {
        self.tasks.get(id).map(|t| t.value().clone())
    }

    pub(super) fn record_min_price(&self, id: &ItemId, price: Decimal) {
        if let Some(mut task) = self.tasks.get_mut(id) {
            task.current_min_price = Some(price);
        }
    }

    pub(super) fn enter(self: &Arc<Self>, id: &ItemId) -> RunningGuard {
        let count = {
            let mut count = self.running.entry(id.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.peak_running.fetch_max(count, Ordering::SeqCst);
        if count > 1 {
            error!(item_id = %id, count, "More than one worker loop running");
        }
        RunningGuard {
            shared: Arc::clone(self),
            item_id: id.clone(),
        }
    }

    fn snapshot_all(&self) -> Vec<GrabTask> {
        let mut tasks: Vec<GrabTask> = self.tasks.iter().map(|t| t.value().clone()).collect();
        tasks.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id.cmp(&b.id))
        });
        tasks
    }

    /// Write the whole task list. Failures are logged, never propagated.
    fn persist(&self) {
        let _guard = self.save_lock.lock();
        let tasks = self.snapshot_all();
        match self.ctx.store.save(&tasks) {
            Ok(()) => debug!(count = tasks.len(), "Task list saved"),
            Err(e) => error!(
                error = %e,
                store = %self.ctx.store.describe(),
                "Failed to save task list"
            ),
        }
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }

    fn spawn_worker(self: &Arc<Self>, id: &ItemId) -> WorkerHandle {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let (control, rx) = watch::channel(WorkerSignal::Run);
        let worker = GrabWorker::new(id.clone(), generation, Arc::clone(self), rx);
        let join = tokio::spawn(worker.run());
        WorkerHandle {
            generation,
            control,
            join: Some(join),
            stopping: false,
        }
    }

    /// Called by a worker as its last act.
    pub(super) fn finish(&self, id: &ItemId, generation: u64, exit: WorkerExit) {
        let (changed, event) = {
            let entry = self.workers.entry(id.clone());
            let (registered, stopping) = match &entry {
                Entry::Occupied(e) => (e.get().generation == generation, e.get().stopping),
                Entry::Vacant(_) => (false, false),
            };

            let outcome = match exit {
                WorkerExit::Purchased {
                    name,
                    price,
                    reason,
                    result,
                } => {
                    // Money has moved; record it even if this worker was superseded.
                    let join_price = self.tasks.get_mut(id).map(|mut task| {
                        task.status = TaskStatus::Succeeded;
                        task.last_success_price = Some(price);
                        task.last_order_id.clone_from(&result.order_id);
                        task.join_price()
                    });
                    let event = Event::PurchaseSucceeded(PurchaseEvent {
                        item_id: id.clone(),
                        name,
                        price,
                        paid_price: result.paid_price,
                        join_price,
                        order_id: result.order_id,
                        reason: reason.to_string(),
                        completed_at: Utc::now(),
                    });
                    (true, Some(event))
                }
                WorkerExit::Rejected { name, message } if registered => {
                    (self.pause_task(id), Some(pause_event(id, name, message)))
                }
                WorkerExit::MissingListingId { name } if registered => (
                    self.pause_task(id),
                    Some(pause_event(
                        id,
                        name,
                        "lowest listing has no id".to_string(),
                    )),
                ),
                _ => (false, None),
            };

            if registered && !stopping {
                if let Entry::Occupied(e) = entry {
                    e.remove();
                }
            }
            outcome
        };

        if changed {
            self.persist();
        }
        if let Some(event) = event {
            self.emit(event);
        }
    }

    fn pause_task(&self, id: &ItemId) -> bool {
        match self.tasks.get_mut(id) {
            Some(mut task) if task.status == TaskStatus::Monitoring => {
                task.status = TaskStatus::Paused;
                true
            }
            _ => false,
        }
    }

    /// Mark the worker for `id` as stopping and take its join handle.
    fn begin_stop(&self, id: &ItemId) -> Option<JoinHandle<()>> {
        let mut handle = self.workers.get_mut(id)?;
        if handle.stopping {
            return None;
        }
        handle.stopping = true;
        handle.signal(WorkerSignal::Stop);
        handle.join.take()
    }

    /// Wait up to the grace period, then abort.
    async fn await_stop(&self, id: &ItemId, join: Option<JoinHandle<()>>) {
        if let Some(mut join) = join {
            let grace = self.ctx.timings.stop_grace;
            let outcome = tokio::time::timeout(grace, &mut join).await;
            match outcome {
                Ok(Ok(())) => debug!(item_id = %id, "Worker stopped"),
                Ok(Err(e)) => warn!(item_id = %id, error = %e, "Worker ended abnormally"),
                Err(_) => {
                    warn!(
                        item_id = %id,
                        grace_ms = grace.as_millis() as u64,
                        "Worker did not stop in time, aborting"
                    );
                    join.abort();
                    // Resolves once the task has been dropped.
                    let _ = join.await;
                }
            }
        }
    }
}

fn pause_event(id: &ItemId, name: String, reason: String) -> Event {
    Event::TaskPaused(PauseEvent {
        item_id: id.clone(),
        name,
        reason,
    })
}

/// Owner of all tasks and their workers.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct WorkerSupervisor {
    shared: Arc<Shared>,
}

impl WorkerSupervisor {
    /// Create a supervisor and the receiver for the events it emits.
    #[must_use]
    pub fn new(ctx: GrabContext) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            ctx,
            tasks: DashMap::new(),
            workers: DashMap::new(),
            generations: AtomicU64::new(0),
            running: DashMap::new(),
            peak_running: AtomicUsize::new(0),
            save_lock: Mutex::new(()),
            events,
        });
        (Self { shared }, rx)
    }

    /// Load persisted tasks. Nothing is started.
    ///
    /// Returns the number of tasks loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or parsed.
    pub fn restore(&self) -> Result<usize> {
        let loaded = self.shared.ctx.store.load()?;
        let mut count = 0;
        for task in loaded {
            let task = task.into_restored();
            match self.shared.tasks.entry(task.id.clone()) {
                Entry::Occupied(_) => {
                    warn!(item_id = %task.id, "Duplicate task in store, keeping first");
                }
                Entry::Vacant(slot) => {
                    slot.insert(task);
                    count += 1;
                }
            }
        }
        info!(
            count,
            store = %self.shared.ctx.store.describe(),
            "Tasks restored"
        );
        Ok(count)
    }

    /// Track a new item and start polling it.
    ///
    /// Returns `false` without changing anything if the item is already
    /// tracked.
    pub fn add_task(&self, request: NewTask) -> bool {
        let id = request.id.clone();
        let added = {
            let entry = self.shared.workers.entry(id.clone());
            if self.shared.tasks.contains_key(&id) {
                false
            } else {
                let percentage = self.shared.ctx.settings.default_percentage();
                let task = GrabTask::new(request, percentage, Utc::now());
                info!(
                    item_id = %id,
                    name = %task.name,
                    join_price = %task.join_price(),
                    percentage = percentage.get(),
                    "Task added"
                );
                self.shared.tasks.insert(id.clone(), task);
                let handle = self.shared.spawn_worker(&id);
                match entry {
                    Entry::Occupied(mut stale) => {
                        stale.insert(handle);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(handle);
                    }
                }
                true
            }
        };
        if added {
            self.shared.persist();
        } else {
            debug!(item_id = %id, "Task already tracked");
        }
        added
    }

    /// Stop the task's worker and forget the task.
    ///
    /// Waits up to the stop grace period for the worker, then aborts it.
    /// Returns `false` if the task was not tracked.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Removing`] if a removal is already in progress.
    pub async fn remove_task(&self, id: &ItemId) -> Result<bool> {
        let join = match self.shared.workers.entry(id.clone()) {
            Entry::Occupied(mut e) => {
                let handle = e.get_mut();
                if handle.stopping {
                    return Err(TaskError::Removing(id.clone()).into());
                }
                handle.stopping = true;
                handle.signal(WorkerSignal::Stop);
                Some(handle.join.take())
            }
            Entry::Vacant(slot) => {
                // Holding the vacant slot keeps a worker from being spawned meanwhile.
                let removed = self.shared.tasks.remove(id).is_some();
                drop(slot);
                if !removed {
                    return Ok(false);
                }
                None
            }
        };

        if let Some(join) = join {
            self.shared.await_stop(id, join).await;
            if let Entry::Occupied(e) = self.shared.workers.entry(id.clone()) {
                self.shared.tasks.remove(id);
                e.remove();
            }
        }

        info!(item_id = %id, "Task removed");
        self.shared.persist();
        Ok(true)
    }

    /// Suspend polling. A no-op for an already paused task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if the task is unknown, succeeded or being
    /// removed.
    pub fn pause(&self, id: &ItemId) -> Result<()> {
        let changed = {
            let handle = self.shared.workers.get(id);
            if handle.as_ref().is_some_and(|h| h.stopping) {
                return Err(TaskError::Removing(id.clone()).into());
            }
            let changed = {
                let mut task = self
                    .shared
                    .tasks
                    .get_mut(id)
                    .ok_or_else(|| TaskError::NotFound(id.clone()))?;
                match task.status {
                    TaskStatus::Succeeded => {
                        return Err(TaskError::AlreadySucceeded(id.clone()).into())
                    }
                    TaskStatus::Paused => false,
                    TaskStatus::Monitoring => {
                        task.status = TaskStatus::Paused;
                        true
                    }
                }
            };
            if let Some(handle) = handle {
                handle.signal(WorkerSignal::Suspend);
            }
            changed
        };
        if changed {
            info!(item_id = %id, "Task paused");
            self.shared.persist();
        }
        Ok(())
    }

    /// Resume polling, spawning a worker if none is alive.
    ///
    /// A no-op for a task that is already being polled.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if the task is unknown, succeeded or being
    /// removed.
    pub fn resume(&self, id: &ItemId) -> Result<()> {
        let changed = {
            let entry = self.shared.workers.entry(id.clone());
            if let Entry::Occupied(e) = &entry {
                if e.get().stopping {
                    return Err(TaskError::Removing(id.clone()).into());
                }
            }
            let previous = {
                let mut task = self
                    .shared
                    .tasks
                    .get_mut(id)
                    .ok_or_else(|| TaskError::NotFound(id.clone()))?;
                if task.status == TaskStatus::Succeeded {
                    return Err(TaskError::AlreadySucceeded(id.clone()).into());
                }
                std::mem::replace(&mut task.status, TaskStatus::Monitoring)
            };
            match entry {
                Entry::Occupied(e) if e.get().is_alive() => {
                    e.get().signal(WorkerSignal::Run);
                    previous != TaskStatus::Monitoring
                }
                Entry::Occupied(mut stale) => {
                    stale.insert(self.shared.spawn_worker(id));
                    true
                }
                Entry::Vacant(slot) => {
                    slot.insert(self.shared.spawn_worker(id));
                    true
                }
            }
        };
        if changed {
            info!(item_id = %id, "Task resumed");
            self.shared.persist();
        }
        Ok(())
    }

    /// Change a task's buy policy. The worker sees it on its next tick.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if the task is unknown or already succeeded.
    pub fn update_policy(&self, id: &ItemId, update: PolicyUpdate) -> Result<GrabTask> {
        let updated = {
            let mut task = self
                .shared
                .tasks
                .get_mut(id)
                .ok_or_else(|| TaskError::NotFound(id.clone()))?;
            if task.status == TaskStatus::Succeeded {
                return Err(TaskError::AlreadySucceeded(id.clone()).into());
            }
            if let Some(target) = update.target_price {
                task.set_target_price(target);
            }
            if let Some(percentage) = update.percentage {
                task.set_target_percentage(Percentage::clamped(percentage));
            }
            task.clone()
        };
        info!(
            item_id = %id,
            target_price = ?updated.target_price(),
            percentage = updated.target_percentage().get(),
            "Task policy updated"
        );
        self.shared.persist();
        Ok(updated)
    }

    /// Set the default percentage, optionally applying it to every
    /// unfinished task. Returns how many tasks were updated.
    pub fn set_default_percentage(&self, percentage: Percentage, apply_to_all: bool) -> usize {
        self.shared.ctx.settings.set_default_percentage(percentage);
        if !apply_to_all {
            return 0;
        }
        let mut updated = 0;
        for mut task in self.shared.tasks.iter_mut() {
            if !task.status.is_terminal() {
                task.set_target_percentage(percentage);
                updated += 1;
            }
        }
        if updated > 0 {
            self.shared.persist();
        }
        updated
    }

    /// All tasks in creation order.
    #[must_use]
    pub fn tasks(&self) -> Vec<GrabTask> {
        self.shared.snapshot_all()
    }

    #[must_use]
    pub fn task(&self, id: &ItemId) -> Option<GrabTask> {
        self.shared.snapshot(id)
    }

    /// True if a live worker is registered for `id`.
    #[must_use]
    pub fn has_worker(&self, id: &ItemId) -> bool {
        self.shared.workers.get(id).is_some_and(|h| h.is_alive())
    }

    /// Number of live workers.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.shared.workers.iter().filter(|h| h.is_alive()).count()
    }

    /// Worker loops still executing for `id`, stopping ones included.
    #[must_use]
    pub fn running_workers(&self, id: &ItemId) -> usize {
        self.shared.running.get(id).map_or(0, |count| *count)
    }

    /// Highest number of loops ever seen running at once for one item.
    #[cfg(test)]
    pub(super) fn peak_running_workers(&self) -> usize {
        self.shared.peak_running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn settings(&self) -> &RuntimeSettings {
        &self.shared.ctx.settings
    }

    /// Stop every worker, waiting up to the grace period for each.
    ///
    /// Task statuses are left as they are.
    pub async fn shutdown(&self) {
        let ids: Vec<ItemId> = self.shared.workers.iter().map(|h| h.key().clone()).collect();
        let stops: Vec<_> = ids
            .into_iter()
            .filter_map(|id| {
                let join = self.shared.begin_stop(&id)?;
                Some((id, join))
            })
            .collect();
        if stops.is_empty() {
            return;
        }

        info!(workers = stops.len(), "Stopping workers");
        let shared = &self.shared;
        join_all(stops.into_iter().map(|(id, join)| async move {
            shared.await_stop(&id, Some(join)).await;
            shared.workers.remove(&id);
        }))
        .await;
        self.shared.persist();
    }
}
