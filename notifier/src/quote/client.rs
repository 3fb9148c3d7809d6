use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::QuoteSource;
use super::errors::QuoteError;
use super::types::{PriceQuote, SimplePriceResponse};

/// CoinGecko `simple/price` client for a fixed pair of asset ids.
#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    url: String,
    asset_a_id: String,
    asset_b_id: String,
}

impl CoinGeckoClient {
    pub fn new(
        url: String,
        asset_a_id: String,
        asset_b_id: String,
        timeout: Duration,
    ) -> Result<Self, QuoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url,
            asset_a_id,
            asset_b_id,
        })
    }
}

#[async_trait]
impl QuoteSource for CoinGeckoClient {
    #[instrument(
        skip(self),
        fields(a = %self.asset_a_id, b = %self.asset_b_id),
        level = "debug"
    )]
    async fn fetch_prices(&self) -> Result<PriceQuote, QuoteError> {
        let ids = format!("{},{}", self.asset_a_id, self.asset_b_id);

        let resp = self
            .http
            .get(&self.url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?;

        let body: SimplePriceResponse = resp.json().await?;
        let quote = PriceQuote::from_response(&body, &self.asset_a_id, &self.asset_b_id)?;

        debug!(asset_a = quote.asset_a, asset_b = quote.asset_b, "prices fetched");

        Ok(quote)
    }
}
