use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no usd price for {0} in quote response")]
    MissingPrice(String),

    #[error("invalid price for {asset}: {price}")]
    InvalidPrice { asset: String, price: f64 },
}
