/// HTTP-style responses returned for every routed request.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Response in the shape an API gateway proxy integration expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

// Field order is part of the wire contract.
#[derive(Serialize)]
struct Body<'a> {
    status: String,
    message: &'a str,
}

impl WebhookResponse {
    pub fn error(message: &str, status: u16) -> Self {
        Self::build(message, status)
    }

    pub fn success(message: &str) -> Self {
        Self::build(message, 202)
    }

    fn build(message: &str, status: u16) -> Self {
        let body = Body {
            status: status.to_string(),
            message,
        };
        // Two string fields always serialize.
        let body = serde_json::to_string(&body).unwrap_or_default();
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        Self {
            status_code: status,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
