#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use notifier::push::{NotificationSink, PushError};
use notifier::quote::{PriceQuote, QuoteError, QuoteSource};
use tracker::Notification;
use tracker::store::{HistoryStore, InMemoryHistoryStore};
use tracker::types::Sample;

/// Replays a fixed sequence of fetch results.
#[derive(Default)]
pub struct ScriptedQuotes {
    script: Mutex<VecDeque<Result<PriceQuote, QuoteError>>>,
}

impl ScriptedQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_ok(&self, asset_a: f64, asset_b: f64) {
        self.script
            .lock()
            .await
            .push_back(Ok(PriceQuote { asset_a, asset_b }));
    }

    pub async fn push_err(&self) {
        self.script
            .lock()
            .await
            .push_back(Err(QuoteError::MissingPrice("ethereum".into())));
    }
}

#[async_trait]
impl QuoteSource for ScriptedQuotes {
    async fn fetch_prices(&self) -> Result<PriceQuote, QuoteError> {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(QuoteError::MissingPrice("script exhausted".into())))
    }
}

/// Records everything it is asked to deliver; can be switched to failing.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: AtomicBool,
}

impl RecordingSink {
    pub async fn titles(&self) -> Vec<String> {
        self.sent.lock().await.iter().map(|n| n.title.clone()).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn push(&self, notification: &Notification) -> Result<(), PushError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PushError::Status(503));
        }
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}

/// In-memory store whose writes can be made to fail.
#[derive(Default, Clone)]
pub struct FlakyStore {
    pub inner: InMemoryHistoryStore,
    pub fail: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("disk unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for FlakyStore {
    async fn load_history(&self, since_ms: i64) -> anyhow::Result<Vec<Sample>> {
        self.check()?;
        self.inner.load_history(since_ms).await
    }

    async fn append(&self, sample: &Sample, evict_before_ms: i64) -> anyhow::Result<()> {
        self.check()?;
        self.inner.append(sample, evict_before_ms).await
    }

    async fn load_last_alerted(&self) -> anyhow::Result<Vec<(String, f64)>> {
        self.check()?;
        self.inner.load_last_alerted().await
    }

    async fn save_last_alerted(&self, key: &str, value: f64) -> anyhow::Result<()> {
        self.check()?;
        self.inner.save_last_alerted(key, value).await
    }
}
