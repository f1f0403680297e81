//! Steampy marketplace adapter.
//!
//! Implements [`MarketplaceClient`](crate::port::outbound::marketplace::MarketplaceClient)
//! and [`CatalogSearch`](crate::port::outbound::marketplace::CatalogSearch)
//! over the site's JSON endpoints.

mod client;
mod dto;
mod settings;

pub use client::SteampyClient;
pub use settings::SteampyConfig;
