use std::collections::HashMap;

use super::QuoteError;

/// `{"bitcoin": {"usd": 101234.0}, "ethereum": {"usd": 3456.7}}`
pub type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub asset_a: f64,
    pub asset_b: f64,
}

impl PriceQuote {
    /// Pulls both USD prices out of a response. Fails unless both are
    /// present, finite and positive.
    pub fn from_response(
        resp: &SimplePriceResponse,
        asset_a_id: &str,
        asset_b_id: &str,
    ) -> Result<Self, QuoteError> {
        Ok(Self {
            asset_a: usd_price(resp, asset_a_id)?,
            asset_b: usd_price(resp, asset_b_id)?,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.asset_a / self.asset_b
    }
}

fn usd_price(resp: &SimplePriceResponse, id: &str) -> Result<f64, QuoteError> {
    let price = resp
        .get(id)
        .and_then(|m| m.get("usd"))
        .copied()
        .ok_or_else(|| QuoteError::MissingPrice(id.to_string()))?;

    if !(price.is_finite() && price > 0.0) {
        return Err(QuoteError::InvalidPrice {
            asset: id.to_string(),
            price,
        });
    }

    Ok(price)
}
