//! modbot runtime configuration schema.
//!
//! Typed for serde YAML/JSON deserialization with camelCase keys. Leaf values
//! are optional so a file only needs to name what it changes; see
//! [`crate::defaults`] for the values filled in after loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_BASE_PATH, DEFAULT_BIND, DEFAULT_DISPATCH_TIMEOUT_MS, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_LOG_LEVEL, DEFAULT_PORT, DEFAULT_QUEUE_BUFFER,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModbotConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Slack app credentials and request checks
    #[serde(default)]
    pub slack: SlackConfig,

    /// Enqueue behaviour shared by all routes
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Action kind to destination pairs
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Flag-message worker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagging: Option<FlaggingConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Prefix for the `/{type}` webhook route, e.g. `/slack`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}

impl ServerConfig {
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH)
    }
}

// ---------------------------------------------------------------------------
// Slack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// Usually `${SLACK_SIGNING_SECRET}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,
    /// Freshness window for `X-Slack-Request-Timestamp`. Unset disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_clock_skew_secs: Option<u64>,
}

impl SlackConfig {
    pub fn signing_secret(&self) -> &str {
        self.signing_secret.as_deref().unwrap_or_default()
    }

    pub fn max_clock_skew(&self) -> Option<Duration> {
        self.max_clock_skew_secs.map(Duration::from_secs)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Capacity of each in-process queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_buffer: Option<usize>,
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_DISPATCH_TIMEOUT_MS))
    }

    pub fn queue_buffer(&self) -> usize {
        self.queue_buffer.unwrap_or(DEFAULT_QUEUE_BUFFER)
    }
}

// ---------------------------------------------------------------------------
// Routes and destinations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Action kind (`callback_id`), matched exactly.
    pub action: String,
    pub destination: DestinationConfig,
}

/// Where payloads for a route (or the flagging worker's output) go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DestinationConfig {
    /// Named in-process queue, consumed by a worker in this process.
    Memory { queue: String },

    /// JSON POST to a remote endpoint.
    #[serde(rename_all = "camelCase")]
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },

    /// Write payloads to the log and drop them.
    Log {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl DestinationConfig {
    pub fn http_timeout(&self) -> Option<Duration> {
        match self {
            Self::Http { timeout_ms, .. } => Some(Duration::from_millis(
                timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS),
            )),
            _ => None,
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self::Log { name: None }
    }
}

// ---------------------------------------------------------------------------
// Flagging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Memory queue the worker consumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Destination for the notifications the worker produces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<DestinationConfig>,
    /// Team ID to admin channel ID.
    #[serde(default)]
    pub admin_channels: BTreeMap<String, String>,
}

impl FlaggingConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON files. Unset logs to stdout only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
