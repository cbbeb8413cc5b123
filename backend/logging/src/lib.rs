//! Structured logging for modbot.
//!
//! Console output, optional rolling NDJSON files, and free-text redaction for
//! anything that may carry Slack credentials.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogGuard};
pub use redact::redact_sensitive_data;
