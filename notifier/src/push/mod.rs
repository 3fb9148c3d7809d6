pub mod bark;
pub mod errors;

pub use bark::BarkSink;
pub use errors::PushError;

use tracker::Notification;

/// Fire-and-forget delivery of a (title, body) pair. Failures are reported
/// once; the sink does not retry.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn push(&self, notification: &Notification) -> Result<(), PushError>;
}
