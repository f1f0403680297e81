//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`marketplace`] - [`ScriptedMarketplace`](marketplace::ScriptedMarketplace),
//!   a mock marketplace with queued replies and call counters.
//! - [`domain`] - Builders for tasks and listings.
//! - [`supervisor`] - A supervisor wired to the scripted marketplace and an
//!   in-memory store.

pub mod domain;
pub mod marketplace;
pub mod supervisor;
