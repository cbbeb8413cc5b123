//! Remote destination: one JSON POST per payload.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use modbot_core::{Headers, Payload, QueueError, Queuer};
use reqwest::Client;
use tracing::debug;

/// Prefix for metadata entries sent as HTTP headers.
pub const METADATA_HEADER_PREFIX: &str = "X-Modbot-";

pub struct HttpQueue {
    client: Client,
    url: String,
    timeout: Duration,
    static_headers: BTreeMap<String, String>,
}

impl HttpQueue {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, QueueError> {
        let client = Client::builder()
            .build()
            .map_err(|e| QueueError::Config(format!("unable to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
            static_headers: BTreeMap::new(),
        })
    }

    /// Headers sent with every request, e.g. `Authorization`.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.static_headers = headers;
        self
    }
}

#[async_trait]
impl Queuer for HttpQueue {
    fn name(&self) -> &str {
        &self.url
    }

    async fn queue(&self, headers: &Headers, payload: &Payload) -> Result<(), QueueError> {
        let mut request = self.client.post(&self.url).timeout(self.timeout).json(payload);
        for (key, value) in &self.static_headers {
            request = request.header(key.as_str(), value.as_str());
        }
        for (key, value) in headers {
            request = request.header(format!("{METADATA_HEADER_PREFIX}{key}"), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                QueueError::Timeout(self.timeout.as_millis() as u64)
            } else {
                QueueError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(url = %self.url, status = status.as_u16(), "Payload posted");
        Ok(())
    }
}
