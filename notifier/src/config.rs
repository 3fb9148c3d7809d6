use std::str::FromStr;
use std::time::Duration;

use tracker::Series;
use tracker::types::{HOUR_MS, Period};

use crate::error::AppError;

pub const DEFAULT_BARK_BASE: &str = "https://api.day.app";
pub const DEFAULT_QUOTE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Immutable process configuration, built once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Notification sink
    // =========================
    /// Bark server root, e.g. `https://api.day.app`.
    pub bark_base: String,

    /// Bark device key. Required; there is no usable default.
    pub bark_key: String,

    // =========================
    // Quote source
    // =========================
    /// CoinGecko-compatible `simple/price` endpoint.
    pub quote_url: String,

    /// Quote-source ids of the two assets (`bitcoin`, `ethereum`).
    pub asset_a_id: String,
    pub asset_b_id: String,

    /// Ticker symbols used in notification texts (`BTC`, `ETH`).
    pub asset_a_symbol: String,
    pub asset_b_symbol: String,

    /// Per-request timeout for both the quote source and the sink.
    pub http_timeout: Duration,

    // =========================
    // Slot tracking
    // =========================
    /// Asset A step in USD. A notification fires whenever the price moves
    /// into a different multiple of this value.
    pub step_size_asset_a: f64,

    /// Asset B step in USD.
    pub step_size_asset_b: f64,

    /// Step of the A/B ratio.
    pub step_size_ratio: f64,

    // =========================
    // Loop + persistence
    // =========================
    pub poll_interval: Duration,

    /// Maximum sample age kept in history. Must cover the longest lookback
    /// period (144h).
    pub retention_hours: u64,

    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset keys take their
    /// defaults; set-but-unparsable keys are errors.
    pub fn from_lookup<F>(get: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bark_key = get("BARK_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("BARK_KEY must be set".into()))?;

        let cfg = Self {
            bark_base: get("BARK_BASE").unwrap_or_else(|| DEFAULT_BARK_BASE.to_string()),
            bark_key,

            quote_url: get("QUOTE_URL").unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string()),
            asset_a_id: get("ASSET_A_ID").unwrap_or_else(|| "bitcoin".to_string()),
            asset_b_id: get("ASSET_B_ID").unwrap_or_else(|| "ethereum".to_string()),
            asset_a_symbol: get("ASSET_A_SYMBOL").unwrap_or_else(|| "BTC".to_string()),
            asset_b_symbol: get("ASSET_B_SYMBOL").unwrap_or_else(|| "ETH".to_string()),
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 8u64)?),

            step_size_asset_a: parse_or(&get, "BTC_STEP", 1000.0)?,
            step_size_asset_b: parse_or(&get, "ETH_STEP", 100.0)?,
            step_size_ratio: parse_or(&get, "RATIO_STEP", 0.5)?,

            poll_interval: Duration::from_secs(parse_or(&get, "INTERVAL", 30u64)?),
            retention_hours: parse_or(&get, "RETENTION_HOURS", 145u64)?,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite://notifier.db".to_string()),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), AppError> {
        for (name, step) in [
            ("BTC_STEP", self.step_size_asset_a),
            ("ETH_STEP", self.step_size_asset_b),
            ("RATIO_STEP", self.step_size_ratio),
        ] {
            if !(step.is_finite() && step > 0.0) {
                return Err(AppError::Configuration(format!(
                    "{name} must be a positive number, got {step}"
                )));
            }
        }

        if self.poll_interval.is_zero() {
            return Err(AppError::Configuration("INTERVAL must be > 0".into()));
        }
        if self.http_timeout.is_zero() {
            return Err(AppError::Configuration("HTTP_TIMEOUT_SECS must be > 0".into()));
        }

        let longest = Period::H144.hours() as u64;
        if self.retention_hours < longest {
            return Err(AppError::Configuration(format!(
                "RETENTION_HOURS must be at least {longest}, got {}",
                self.retention_hours
            )));
        }

        Ok(())
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention_hours as i64 * HOUR_MS
    }

    /// `"BTC/ETH"`.
    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.asset_a_symbol, self.asset_b_symbol)
    }

    pub fn step_for(&self, series: Series) -> f64 {
        match series {
            Series::AssetA => self.step_size_asset_a,
            Series::AssetB => self.step_size_asset_b,
            Series::Ratio => self.step_size_ratio,
        }
    }

    pub fn label_for(&self, series: Series) -> String {
        match series {
            Series::AssetA => self.asset_a_symbol.clone(),
            Series::AssetB => self.asset_b_symbol.clone(),
            Series::Ratio => self.pair_label(),
        }
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Configuration(format!("invalid {key}={raw:?}: {e}"))),
    }
}
