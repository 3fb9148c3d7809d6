use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::HistoryStore;
use crate::types::Sample;

/// Process-local store. Cloning shares the same data, which lets tests
/// "restart" a tracker against the state a previous instance left behind.
#[derive(Default, Clone)]
pub struct InMemoryHistoryStore {
    pub history: Arc<Mutex<Vec<Sample>>>,
    pub last_alerted: Arc<Mutex<HashMap<String, f64>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load_history(&self, since_ms: i64) -> anyhow::Result<Vec<Sample>> {
        Ok(self
            .history
            .lock()
            .await
            .iter()
            .filter(|s| s.ts_ms >= since_ms)
            .copied()
            .collect())
    }

    async fn append(&self, sample: &Sample, evict_before_ms: i64) -> anyhow::Result<()> {
        let mut history = self.history.lock().await;
        history.push(*sample);
        history.retain(|s| s.ts_ms >= evict_before_ms);
        Ok(())
    }

    async fn load_last_alerted(&self) -> anyhow::Result<Vec<(String, f64)>> {
        Ok(self
            .last_alerted
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect())
    }

    async fn save_last_alerted(&self, key: &str, value: f64) -> anyhow::Result<()> {
        self.last_alerted.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
