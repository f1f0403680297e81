//! Marketplace port for listings, purchases and catalog search.
//!
//! Implementations are stateless request/response wrappers. Transport and
//! decoding failures come back as `Err`; a purchase the marketplace refuses
//! comes back as `Ok` with `success == false`.

use async_trait::async_trait;

use crate::domain::id::{ItemId, ListingId};
use crate::domain::listing::{ItemSummary, Listing, PurchaseResult};
use crate::error::Result;

/// Listing and purchase operations used by grab workers.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// Current listings for `item_id`, ascending by price.
    ///
    /// An empty list means nothing is for sale right now.
    async fn list_listings(&self, item_id: &ItemId) -> Result<Vec<Listing>>;

    /// Submit a purchase for one listing.
    async fn purchase(&self, listing_id: &ListingId) -> Result<PurchaseResult>;

    /// Marketplace name for logging.
    fn marketplace_name(&self) -> &'static str;
}

/// Keyword search used to seed new tasks.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<Vec<ItemSummary>>;
}
