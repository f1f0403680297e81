//! Scripted [`MarketplaceClient`] for driving workers in tests.
//!
//! Listing fetches first pop from a global script queue; once it is empty
//! they return the standing listings configured for the item (empty when
//! none). Purchases pop from their own queue and default to success.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::id::{ItemId, ListingId};
use crate::domain::listing::{Listing, PurchaseResult};
use crate::error::Result;
use crate::port::outbound::marketplace::MarketplaceClient;

/// One scripted answer to `list_listings`.
pub enum ListingStep {
    Reply(Result<Vec<Listing>>),
    /// Answers after the delay has elapsed.
    Delayed(Duration, Result<Vec<Listing>>),
    /// Never completes.
    Hang,
}

/// One scripted answer to `purchase`.
pub enum PurchaseStep {
    Reply(Result<PurchaseResult>),
    Hang,
}

#[derive(Default)]
struct Script {
    listing_steps: VecDeque<ListingStep>,
    purchase_steps: VecDeque<PurchaseStep>,
    standing: HashMap<ItemId, Vec<Listing>>,
    purchased: Vec<ListingId>,
}

/// Marketplace whose answers are set up front or changed mid-test.
#[derive(Clone, Default)]
pub struct ScriptedMarketplace {
    script: Arc<Mutex<Script>>,
    list_calls: Arc<AtomicU32>,
    purchase_calls: Arc<AtomicU32>,
}

impl ScriptedMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standing listings for `item`, returned whenever the script queue is empty.
    pub fn with_listings(self, item: &str, listings: Vec<Listing>) -> Self {
        self.set_listings(item, listings);
        self
    }

    pub fn with_listing_steps(self, steps: Vec<ListingStep>) -> Self {
        self.script.lock().listing_steps.extend(steps);
        self
    }

    pub fn with_purchase_steps(self, steps: Vec<PurchaseStep>) -> Self {
        self.script.lock().purchase_steps.extend(steps);
        self
    }

    /// Replace the standing listings for `item`.
    pub fn set_listings(&self, item: &str, listings: Vec<Listing>) {
        self.script
            .lock()
            .standing
            .insert(ItemId::from(item), listings);
    }

    pub fn push_purchase(&self, step: PurchaseStep) {
        self.script.lock().purchase_steps.push_back(step);
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn purchase_calls(&self) -> u32 {
        self.purchase_calls.load(Ordering::SeqCst)
    }

    /// Listing ids passed to `purchase`, in call order.
    pub fn purchased(&self) -> Vec<ListingId> {
        self.script.lock().purchased.clone()
    }
}

#[async_trait]
impl MarketplaceClient for ScriptedMarketplace {
    async fn list_listings(&self, item_id: &ItemId) -> Result<Vec<Listing>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut script = self.script.lock();
            match script.listing_steps.pop_front() {
                Some(step) => step,
                None => ListingStep::Reply(Ok(script
                    .standing
                    .get(item_id)
                    .cloned()
                    .unwrap_or_default())),
            }
        };
        match step {
            ListingStep::Reply(result) => result,
            ListingStep::Delayed(delay, result) => {
                tokio::time::sleep(delay).await;
                result
            }
            ListingStep::Hang => std::future::pending().await,
        }
    }

    async fn purchase(&self, listing_id: &ListingId) -> Result<PurchaseResult> {
        let n = self.purchase_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let step = {
            let mut script = self.script.lock();
            script.purchased.push(listing_id.clone());
            script.purchase_steps.pop_front()
        };
        match step {
            Some(PurchaseStep::Reply(result)) => result,
            Some(PurchaseStep::Hang) => std::future::pending().await,
            None => Ok(PurchaseResult {
                success: true,
                order_id: Some(format!("order-{n}").into()),
                ..PurchaseResult::default()
            }),
        }
    }

    fn marketplace_name(&self) -> &'static str {
        "scripted"
    }
}
