use async_trait::async_trait;
use reqwest::Client;

use crate::api::PriceFeed;
use crate::error::Result;
use crate::models::{PairInfo, Ticker};

const ZAIF_API_BASE: &str = "https://api.zaif.jp/api/1";

/// Client for the Zaif public API.
///
/// No retry logic here: a failed request fails the caller's tick, which is
/// logged and abandoned; the next scheduled tick fetches fresh.
#[derive(Clone)]
pub struct ZaifClient {
    client: Client,
    base_url: String,
}

impl Default for ZaifClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ZaifClient {
    pub fn new() -> Self {
        Self::with_base_url(ZAIF_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PriceFeed for ZaifClient {
    /// Current ask/bid quote for one pair.
    async fn ticker(&self, pair: &str) -> Result<Ticker> {
        let url = format!("{}/ticker/{}", self.base_url, pair);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let ticker: Ticker = response.json().await?;
        Ok(ticker)
    }

    /// Every currency pair the exchange lists, including inactive ones;
    /// callers filter with [`PairInfo::is_active`].
    async fn currency_pairs(&self) -> Result<Vec<PairInfo>> {
        let url = format!("{}/currency_pairs/all", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let pairs: Vec<PairInfo> = response.json().await?;
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_parses_quote() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ticker/eth_jpy")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"last":20500.0,"high":21000.0,"low":20000.0,"vwap":20400.5,
                    "volume":1250.3,"ask":20510.0,"bid":20480.0}"#,
            )
            .create_async()
            .await;

        let client = ZaifClient::with_base_url(server.url());
        let ticker = client.ticker("eth_jpy").await.unwrap();
        assert_eq!(ticker.ask, 20510.0);
        assert_eq!(ticker.bid, 20480.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_currency_pairs_parses_listing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/currency_pairs/all")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"currency_pair":"btc_jpy","name":"BTC/JPY","event_number":0,
                     "item_unit_min":0.0001,"item_unit_step":0.0001},
                    {"currency_pair":"eth_btc","name":"ETH/BTC","event_number":0,
                     "item_unit_min":0.01,"item_unit_step":0.01},
                    {"currency_pair":"zaif_jpy","name":"ZAIF/JPY","event_number":1,
                     "item_unit_min":0.1,"item_unit_step":0.1}
                ]"#,
            )
            .create_async()
            .await;

        let client = ZaifClient::with_base_url(server.url());
        let pairs = client.currency_pairs().await.unwrap();
        assert_eq!(pairs.len(), 3);

        let tradable: Vec<&PairInfo> = pairs
            .iter()
            .filter(|p| p.is_active() && p.is_quoted_in("jpy"))
            .collect();
        assert_eq!(tradable.len(), 1);
        assert_eq!(tradable[0].currency_pair, "btc_jpy");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker/btc_jpy")
            .with_status(502)
            .create_async()
            .await;

        let client = ZaifClient::with_base_url(server.url());
        assert!(client.ticker("btc_jpy").await.is_err());
    }
}
