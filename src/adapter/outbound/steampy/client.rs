//! Steampy REST client.
//!
//! Three endpoints under `xboot/`:
//! - `steamKeySale/listSale` - open listings for a game, cheapest first
//! - `steamKeyOrder/payOrder` - buy one listing
//! - `steamGame/keyByName` - keyword search over the game catalog

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::dto::{Envelope, GameEntry, Page, PayOrderResult, SaleEntry};
use super::settings::SteampyConfig;
use crate::application::session::SessionStore;
use crate::domain::id::{ItemId, ListingId};
use crate::domain::listing::{ItemSummary, Listing, PurchaseResult};
use crate::error::{MarketplaceError, Result};
use crate::port::outbound::marketplace::{CatalogSearch, MarketplaceClient};

const LIST_SALE_PATH: &str = "xboot/steamKeySale/listSale";
const PAY_ORDER_PATH: &str = "xboot/steamKeyOrder/payOrder";
const SEARCH_PATH: &str = "xboot/steamGame/keyByName";
const SEARCH_PAGE_SIZE: u32 = 30;
const TOKEN_HEADER: &str = "accessToken";

/// HTTP client for the Steampy key marketplace.
///
/// Reads the access token from the shared [`SessionStore`] on every request.
pub struct SteampyClient {
    http: HttpClient,
    base_url: Url,
    page_size: u32,
    pay_type: String,
    session: Arc<SessionStore>,
}

impl SteampyClient {
    /// Build a client from the `[marketplace]` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &SteampyConfig, session: Arc<SessionStore>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(concat!("keygrab/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url(&config.base_url)?,
            page_size: config.page_size,
            pay_type: config.pay_type.clone(),
            session,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let session = self.session.current();
        match session.access_token() {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send<T>(&self, request: RequestBuilder, operation: &'static str) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.authorize(request).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(MarketplaceError::Unauthorized.into());
        }
        let body = response.error_for_status()?.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| MarketplaceError::Malformed(format!("{operation}: {e}")).into())
    }
}

#[async_trait]
impl MarketplaceClient for SteampyClient {
    async fn list_listings(&self, item_id: &ItemId) -> Result<Vec<Listing>> {
        let page_size = self.page_size.to_string();
        let request = self.http.get(self.endpoint(LIST_SALE_PATH)?).query(&[
            ("pageNumber", "1"),
            ("pageSize", page_size.as_str()),
            ("sort", "keyPrice"),
            ("order", "asc"),
            ("gameId", item_id.as_str()),
        ]);

        let envelope: Envelope<Page<SaleEntry>> = self.send(request, "listSale").await?;
        if !envelope.success {
            return Err(MarketplaceError::Rejected {
                code: envelope.code.unwrap_or_default(),
                message: envelope.message.unwrap_or_default(),
            }
            .into());
        }

        let mut listings: Vec<Listing> = envelope
            .result
            .unwrap_or_default()
            .content
            .into_iter()
            .filter_map(SaleEntry::into_listing)
            .collect();
        listings.sort_by(|a, b| a.price.cmp(&b.price));

        debug!(item_id = %item_id, count = listings.len(), "Fetched listings");
        Ok(listings)
    }

    async fn purchase(&self, listing_id: &ListingId) -> Result<PurchaseResult> {
        let request = self.http.post(self.endpoint(PAY_ORDER_PATH)?).form(&[
            ("saleId", listing_id.as_str()),
            ("payType", self.pay_type.as_str()),
            ("promoCodeId", ""),
            ("walletFlag", ""),
        ]);

        info!(listing_id = %listing_id, "Submitting order");
        let envelope: Envelope<PayOrderResult> = self.send(request, "payOrder").await?;
        Ok(envelope.into_purchase_result())
    }

    fn marketplace_name(&self) -> &'static str {
        "steampy"
    }
}

#[async_trait]
impl CatalogSearch for SteampyClient {
    async fn search(&self, keyword: &str) -> Result<Vec<ItemSummary>> {
        let page_size = SEARCH_PAGE_SIZE.to_string();
        let request = self.http.get(self.endpoint(SEARCH_PATH)?).query(&[
            ("pageNumber", "1"),
            ("pageSize", page_size.as_str()),
            ("sort", "keyTx"),
            ("order", "asc"),
            ("gameName", keyword),
        ]);

        let envelope: Envelope<Page<GameEntry>> = self.send(request, "keyByName").await?;
        if !envelope.success {
            return Err(MarketplaceError::Rejected {
                code: envelope.code.unwrap_or_default(),
                message: envelope.message.unwrap_or_default(),
            }
            .into());
        }

        let items: Vec<ItemSummary> = envelope
            .result
            .unwrap_or_default()
            .content
            .into_iter()
            .filter_map(GameEntry::into_summary)
            .collect();
        info!(keyword, count = items.len(), "Catalog search finished");
        Ok(items)
    }
}

/// Parse `raw` so that relative joins append to its path.
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn base_url_keeps_path_prefix() {
        let url = base_url("https://example.com/api").unwrap();
        assert_eq!(
            url.join(LIST_SALE_PATH).unwrap().as_str(),
            "https://example.com/api/xboot/steamKeySale/listSale"
        );
        let url = base_url("https://steampy.com").unwrap();
        assert_eq!(
            url.join(PAY_ORDER_PATH).unwrap().as_str(),
            "https://steampy.com/xboot/steamKeyOrder/payOrder"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(base_url("not a url"), Err(Error::Url(_))));
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..split]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= split + 4 + length
    }

    fn client(base: String, token: Option<&str>) -> SteampyClient {
        let config = SteampyConfig {
            base_url: base,
            ..SteampyConfig::default()
        };
        let session = Arc::new(SessionStore::new(token.map(str::to_string)));
        SteampyClient::from_config(&config, session).unwrap()
    }

    #[tokio::test]
    async fn list_listings_sends_token_and_query() {
        let (base, request) = serve_once(
            "200 OK",
            r#"{"success":true,"result":{"content":[{"saleId":"s2","keyPrice":"52"},{"saleId":"s1","keyPrice":"48"}]}}"#,
        )
        .await;

        let listings = client(base, Some("tok-1"))
            .list_listings(&ItemId::from("g-9"))
            .await
            .unwrap();
        assert_eq!(listings[0].id.as_ref().unwrap().as_str(), "s1");

        let raw = request.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /xboot/steamkeysale/listsale?"));
        assert!(raw.contains("gameid=g-9"));
        assert!(raw.contains("sort=keyprice"));
        assert!(raw.contains("accesstoken: tok-1"));
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_unauthorized() {
        let (base, _request) = serve_once("401 Unauthorized", "{}").await;
        let err = client(base, None)
            .list_listings(&ItemId::from("g"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Marketplace(MarketplaceError::Unauthorized)));
    }

    #[tokio::test]
    async fn unsuccessful_listing_response_is_rejected() {
        let (base, _request) =
            serve_once("200 OK", r#"{"success":false,"code":"500","message":"busy"}"#).await;
        let err = client(base, None)
            .list_listings(&ItemId::from("g"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(
            err,
            Error::Marketplace(MarketplaceError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn purchase_posts_form_and_reads_rejection() {
        let (base, request) = serve_once(
            "200 OK",
            r#"{"success":false,"code":"10001","message":"sold out"}"#,
        )
        .await;
        let result = client(base, Some("t"))
            .purchase(&ListingId::from("s-7"))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("sold out"));

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /xboot/steamKeyOrder/payOrder"));
        assert!(raw.contains("saleId=s-7&payType=AL&promoCodeId=&walletFlag="));
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let (base, _request) = serve_once("200 OK", "<html>").await;
        let err = client(base, None).search("hades").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Marketplace(MarketplaceError::Malformed(_))
        ));
    }
}
