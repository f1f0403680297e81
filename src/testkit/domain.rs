//! Builders for domain values used across tests.

use rust_decimal::Decimal;

use crate::domain::id::ItemId;
use crate::domain::listing::Listing;
use crate::domain::task::NewTask;

/// A task request for item `id` with the given join price.
///
/// # Panics
///
/// Panics on a blank id or negative price.
pub fn new_task(id: &str, join_price: Decimal) -> NewTask {
    NewTask::try_new(id, format!("Game {id}"), join_price).expect("valid test task")
}

pub fn item(id: &str) -> ItemId {
    ItemId::from(id)
}

/// A listing with an id derived from its price, e.g. `l-49.50`.
pub fn listing(price: Decimal) -> Listing {
    Listing::new(format!("l-{price}"), price)
}

/// A listing the marketplace returned without an id.
pub fn anonymous_listing(price: Decimal) -> Listing {
    Listing::anonymous(price)
}
