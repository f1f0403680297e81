use async_trait::async_trait;

use keygrab::domain::ItemSummary;
use keygrab::error::Result;
use keygrab::port::CatalogSearch;

/// Catalog that answers every search with the same hits.
#[derive(Default)]
pub struct StaticCatalog {
    pub items: Vec<ItemSummary>,
}

#[async_trait]
impl CatalogSearch for StaticCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<ItemSummary>> {
        Ok(self.items.clone())
    }
}
