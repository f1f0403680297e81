//! Keygrab - game-key marketplace price watcher.
//!
//! Tracks items on a key marketplace, polls their lowest listing, and buys
//! as soon as a per-item price policy is met.
//!
//! # Architecture
//!
//! - **`domain`** - Tasks, listings and the pure buy policy
//! - **`port`** - Traits for the marketplace, task and settings storage, and
//!   notifications
//! - **`application`** - Worker supervisor and shared runtime settings
//! - **`adapter`** - HTTP marketplace client, JSON task and settings files,
//!   Telegram and email notifiers, operator console and CLI
//! - **`infrastructure`** - Configuration, wiring and the foreground runtime
//!
//! # Features
//!
//! - `telegram` - Purchase and pause notifications through a Telegram bot
//! - `email` - Purchase emails over SMTP
//! - `testkit` - Scripted marketplace and test wiring for integration tests
//!
//! # Example
//!
//! ```
//! use keygrab::domain::policy::{evaluate, Decision};
//! use keygrab::domain::task::{Percentage, PricePolicy};
//! use rust_decimal_macros::dec;
//!
//! let policy = PricePolicy {
//!     join_price: dec!(100),
//!     target_price: None,
//!     target_percentage: Percentage::DEFAULT,
//! };
//! assert!(evaluate(&policy, dec!(69)).should_buy());
//! assert_eq!(evaluate(&policy, dec!(71)), Decision::Hold);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
