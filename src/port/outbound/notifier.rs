//! Notifier port for event notifications.
//!
//! This module defines the trait for sending notifications about completed
//! purchases and tasks that stopped on their own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::id::{ItemId, OrderId};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// A purchase completed. Emitted exactly once per purchase.
    PurchaseSucceeded(PurchaseEvent),
    /// A worker paused its task after a rejection or a bad listing.
    TaskPaused(PauseEvent),
}

/// Successful purchase.
#[derive(Debug, Clone)]
pub struct PurchaseEvent {
    pub item_id: ItemId,
    pub name: String,
    /// Price of the listing that triggered the buy.
    pub price: Decimal,
    /// Amount the marketplace reported as paid, if any.
    pub paid_price: Option<Decimal>,
    /// Lowest price when the task was added. `None` if the task was removed
    /// while the buy was in flight.
    pub join_price: Option<Decimal>,
    pub order_id: Option<OrderId>,
    /// Rendered buy reason.
    pub reason: String,
    pub completed_at: DateTime<Utc>,
}

/// Task paused by its worker.
#[derive(Debug, Clone)]
pub struct PauseEvent {
    pub item_id: ItemId,
    pub name: String,
    pub reason: String,
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget: `notify` should return quickly and
/// hand slow delivery off to a background task.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::PurchaseSucceeded(e) => {
                info!(
                    item_id = %e.item_id,
                    name = %e.name,
                    price = %e.price,
                    order_id = e.order_id.as_ref().map(|o| o.as_str()).unwrap_or("-"),
                    reason = %e.reason,
                    "Purchase succeeded"
                );
            }
            Event::TaskPaused(e) => {
                warn!(
                    item_id = %e.item_id,
                    name = %e.name,
                    reason = %e.reason,
                    "Task paused"
                );
            }
        }
    }
}
