use std::sync::Arc;

use common::init_logger;
use notifier::{
    config::AppConfig,
    driver::Driver,
    error::AppError,
    push::BarkSink,
    quote::CoinGeckoClient,
    time::now_ms,
};
use tracker::ExtremumTracker;
use tracker::store::SqliteHistoryStore;

/// Opens the durable store and rebuilds the extremum tracker from it.
async fn init_extremes(cfg: &AppConfig) -> Result<ExtremumTracker, AppError> {
    let store = SqliteHistoryStore::new(&cfg.database_url)
        .await
        .map_err(AppError::Storage)?;

    let tracker = ExtremumTracker::restore(
        Arc::new(store),
        cfg.retention_ms(),
        now_ms(),
        cfg.pair_label(),
    )
    .await?;

    Ok(tracker)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_logger("notifier", is_production);

    tracing::info!("Starting price notifier...");

    let cfg = Arc::new(AppConfig::from_env()?);

    tracing::info!(
        pair = %cfg.pair_label(),
        step_a = cfg.step_size_asset_a,
        step_b = cfg.step_size_asset_b,
        step_ratio = cfg.step_size_ratio,
        interval_s = cfg.poll_interval.as_secs(),
        retention_h = cfg.retention_hours,
        database = %cfg.database_url,
        "configuration loaded"
    );

    let extremes = init_extremes(&cfg).await?;

    let quotes = CoinGeckoClient::new(
        cfg.quote_url.clone(),
        cfg.asset_a_id.clone(),
        cfg.asset_b_id.clone(),
        cfg.http_timeout,
    )?;
    let sink = BarkSink::new(cfg.bark_base.clone(), cfg.bark_key.clone(), cfg.http_timeout)?;

    let driver = Driver::new(cfg, Arc::new(quotes), Arc::new(sink), extremes);

    driver
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!("Shutdown signal received");

    Ok(())
}
