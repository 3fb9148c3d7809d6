use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::NotificationSink;
use super::errors::PushError;
use tracker::Notification;

/// Bark push client: `GET {base}/{key}/{title}/{body}`.
#[derive(Clone)]
pub struct BarkSink {
    http: Client,
    base: String,
    key: String,
}

impl BarkSink {
    pub fn new(base: String, key: String, timeout: Duration) -> Result<Self, PushError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base, key })
    }

    /// Every path segment is percent-encoded; a `/` in a title must not
    /// split it into two segments.
    pub fn push_url(&self, notification: &Notification) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base.trim_end_matches('/'),
            urlencoding::encode(&self.key),
            urlencoding::encode(&notification.title),
            urlencoding::encode(&notification.body),
        )
    }
}

#[async_trait]
impl NotificationSink for BarkSink {
    #[instrument(skip_all, fields(title = %notification.title), level = "debug")]
    async fn push(&self, notification: &Notification) -> Result<(), PushError> {
        let resp = self.http.get(self.push_url(notification)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PushError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sink(base: String) -> BarkSink {
        BarkSink::new(base, "device-key".into(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn url_encodes_reserved_characters() {
        let s = sink("https://api.day.app/".into());
        let n = Notification::new("BTC/ETH 24h low", "ratio ≈ 28.5000");

        assert_eq!(
            s.push_url(&n),
            "https://api.day.app/device-key/BTC%2FETH%2024h%20low/ratio%20%E2%89%88%2028.5000"
        );
    }

    #[tokio::test]
    async fn delivers_with_single_get() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let n = Notification::new("BTC up to $101,000", "now ≈ $101,234");
        sink(server.uri()).push(&n).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.path(),
            "/device-key/BTC%20up%20to%20%24101%2C000/now%20%E2%89%88%20%24101%2C234"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_a_delivery_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1) // no retry
            .mount(&server)
            .await;

        let err = sink(server.uri())
            .push(&Notification::new("t", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::Status(500)));
    }
}
