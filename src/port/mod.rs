//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │   (grab supervisor)     │
//!                    └─────────────────────────┘
//!                                │
//!     ┌──────────────────────────┼──────────────────────────┐
//!     ▼                          ▼                          ▼
//! ┌───────────┐           ┌─────────────┐            ┌───────────┐
//! │Marketplace│           │  TaskStore  │            │ Notifier  │
//! │  Adapter  │           │   Adapter   │            │  Adapter  │
//! └───────────┘           └─────────────┘            └───────────┘
//! ```

pub mod outbound;

pub use outbound::marketplace::{CatalogSearch, MarketplaceClient};
pub use outbound::notifier::{
    Event, LogNotifier, Notifier, NotifierRegistry, PauseEvent, PurchaseEvent,
};
pub use outbound::store::{OperatorSettings, SettingsStore, TaskStore};
