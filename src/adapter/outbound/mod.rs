//! Outbound adapters (driven side).

pub mod notifier;
pub mod steampy;
pub mod store;
