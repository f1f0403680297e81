//! Steampy response payloads.
//!
//! Every endpoint wraps its payload as
//! `{ "success": bool, "code": .., "message": .., "result": .. }`.
//! Prices and ids arrive as either numbers or strings.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::domain::id::ItemId;
use crate::domain::listing::{ItemSummary, Listing, PurchaseResult};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "loose_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    #[serde(default, deserialize_with = "loose_string")]
    pub sale_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub key_price: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_string")]
    pub seller: Option<String>,
}

impl SaleEntry {
    /// `None` when the entry carries no usable price.
    pub fn into_listing(self) -> Option<Listing> {
        let Some(price) = self.key_price else {
            debug!(
                sale_id = self.sale_id.as_deref().unwrap_or("-"),
                id = self.id.as_deref().unwrap_or("-"),
                "Dropping sale entry without keyPrice"
            );
            return None;
        };
        let id = self
            .sale_id
            .filter(|s| !s.trim().is_empty())
            .or(self.id)
            .unwrap_or_default();
        let mut listing = Listing::new(id, price);
        listing.seller = self.seller;
        Some(listing)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOrderResult {
    #[serde(default, deserialize_with = "loose_string")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub pay_price: Option<Decimal>,
}

impl Envelope<PayOrderResult> {
    pub fn into_purchase_result(self) -> PurchaseResult {
        if !self.success {
            let message = self.message.filter(|m| !m.is_empty()).unwrap_or_else(|| {
                format!("rejected with code {}", self.code.as_deref().unwrap_or("?"))
            });
            return PurchaseResult::rejected(message);
        }
        let result = self.result.unwrap_or_default();
        PurchaseResult {
            success: true,
            order_id: result.order_id.filter(|o| !o.is_empty()).map(Into::into),
            paid_price: result.pay_price,
            message: self.message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEntry {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub game_name_cn: Option<String>,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub key_price: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub game_price: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_string")]
    pub game_status: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub app_id: Option<String>,
}

impl GameEntry {
    /// `None` for entries without an id.
    pub fn into_summary(self) -> Option<ItemSummary> {
        let id = self.id.filter(|id| !id.trim().is_empty())?;
        let name = self
            .game_name_cn
            .filter(|n| !n.is_empty())
            .or(self.game_name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());
        Some(ItemSummary {
            id: ItemId::new(id),
            name,
            price: self.key_price.or(self.game_price),
            available: self.game_status.as_deref() == Some("1"),
            app_id: self.app_id,
        })
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn loose_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    })
}
