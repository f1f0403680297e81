//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the grab subsystem depends on:
//! the marketplace, durable task storage, and notifications.

pub mod marketplace;
pub mod notifier;
pub mod store;
