//! Marketplace-agnostic domain types and the buy policy.

pub mod error;
pub mod id;
pub mod listing;
pub mod policy;
pub mod task;

pub use id::{ItemId, ListingId, OrderId};
pub use listing::{ItemSummary, Listing, PurchaseResult};
pub use policy::{evaluate, BuyReason, Decision};
pub use task::{GrabTask, NewTask, Percentage, PricePolicy, TaskStatus};
