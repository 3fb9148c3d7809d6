pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::InMemoryHistoryStore;
pub use sqlite_store::SqliteHistoryStore;

use crate::types::Sample;

/// Durable backing for the extremum tracker: price history plus the
/// last-alerted registry.
///
/// Implementations must make `append` (insert + eviction) and
/// `save_last_alerted` atomic.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Samples with `ts_ms >= since_ms`, oldest first.
    async fn load_history(&self, since_ms: i64) -> anyhow::Result<Vec<Sample>>;

    /// Inserts `sample` and deletes every row with `ts_ms < evict_before_ms`.
    async fn append(&self, sample: &Sample, evict_before_ms: i64) -> anyhow::Result<()>;

    /// Raw `(key, value)` registry rows.
    async fn load_last_alerted(&self) -> anyhow::Result<Vec<(String, f64)>>;

    /// Upsert by key.
    async fn save_last_alerted(&self, key: &str, value: f64) -> anyhow::Result<()>;
}
