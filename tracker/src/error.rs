use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("non-finite value: {0}")]
    NonFiniteValue(f64),

    #[error("sample at {ts_ms} is older than newest retained sample at {newest_ms}")]
    OutOfOrder { ts_ms: i64, newest_ms: i64 },

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
