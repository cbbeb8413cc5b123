use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An inbound HTTP callback, independent of the server that received it.
///
/// Header names are stored lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub http_method: String,
    #[serde(default)]
    headers: HashMap<String, String>,
    /// Path discriminator selecting the sub-protocol (`event`, `command`, `action`).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Raw request body, exactly as received.
    #[serde(default)]
    pub body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new(http_method: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            http_method: http_method.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_post(&self) -> bool {
        self.http_method.eq_ignore_ascii_case("POST")
    }
}
