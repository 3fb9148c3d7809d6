pub mod client;
pub mod errors;
pub mod types;

pub use client::CoinGeckoClient;
pub use errors::QuoteError;
pub use types::PriceQuote;

/// Source of current USD prices for the two tracked assets. Either both
/// prices are returned or the call fails.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_prices(&self) -> Result<PriceQuote, QuoteError>;
}
