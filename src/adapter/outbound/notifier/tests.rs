use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::id::ItemId;
use crate::port::outbound::notifier::{
    Event, LogNotifier, Notifier, NotifierRegistry, PauseEvent, PurchaseEvent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingNotifier {
    count: Arc<AtomicUsize>,
}

impl Notifier for CountingNotifier {
    fn notify(&self, _event: Event) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

fn paused() -> Event {
    Event::TaskPaused(PauseEvent {
        item_id: ItemId::from("g-1"),
        name: "Hades".into(),
        reason: "rejected".into(),
    })
}

#[test]
fn test_registry_notify_all() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut registry = NotifierRegistry::new();

    registry.register(Box::new(CountingNotifier {
        count: count.clone(),
    }));
    registry.register(Box::new(CountingNotifier {
        count: count.clone(),
    }));

    registry.notify_all(paused());

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_log_notifier_handles_every_event() {
    let notifier = LogNotifier;
    notifier.notify(paused());
    notifier.notify(Event::PurchaseSucceeded(PurchaseEvent {
        item_id: ItemId::from("g-1"),
        name: "Hades".into(),
        price: Decimal::from(69),
        paid_price: None,
        join_price: Some(Decimal::from(100)),
        order_id: None,
        reason: "price 69.00 <= target 70.00".into(),
        completed_at: Utc::now(),
    }));
}

#[test]
fn test_registry_len_and_is_empty() {
    let mut registry = NotifierRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);

    registry.register(Box::new(LogNotifier));
    assert!(!registry.is_empty());
    assert_eq!(registry.len(), 1);
}
