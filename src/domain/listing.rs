//! Marketplace listings and purchase outcomes.

use rust_decimal::Decimal;
use serde::Serialize;

use super::id::{ItemId, ListingId, OrderId};

/// A sellable unit of an item at a specific price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Listing id. `None` when the marketplace omitted or blanked it.
    pub id: Option<ListingId>,
    pub price: Decimal,
    pub seller: Option<String>,
}

impl Listing {
    #[must_use]
    pub fn new(id: impl Into<ListingId>, price: Decimal) -> Self {
        let id = id.into();
        Self {
            id: (!id.is_blank()).then_some(id),
            price,
            seller: None,
        }
    }

    /// Listing without an identifier.
    #[must_use]
    pub fn anonymous(price: Decimal) -> Self {
        Self {
            id: None,
            price,
            seller: None,
        }
    }
}

/// Outcome of a purchase attempt that reached the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PurchaseResult {
    pub success: bool,
    pub order_id: Option<OrderId>,
    pub paid_price: Option<Decimal>,
    pub message: Option<String>,
}

impl PurchaseResult {
    #[must_use]
    pub fn succeeded(order_id: impl Into<OrderId>, paid_price: Decimal) -> Self {
        Self {
            success: true,
            order_id: Some(order_id.into()),
            paid_price: Some(paid_price),
            message: None,
        }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Catalog search hit, used to seed new tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    pub price: Option<Decimal>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}
