use thiserror::Error;

use crate::push::PushError;
use crate::quote::QuoteError;
use tracker::TrackerError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Fatal; only raised before the polling loop starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("quote fetch failed: {0}")]
    QuoteFetch(#[from] QuoteError),

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(#[from] PushError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
