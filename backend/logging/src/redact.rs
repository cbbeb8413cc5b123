//! Log Redaction
//!
//! Scrubs Slack tokens, bearer credentials and request signatures from strings
//! prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static SLACK_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"xox[abposr]-[A-Za-z0-9-]+").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"v0=[0-9a-fA-F]{16,}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = SLACK_TOKEN_RE.replace_all(input, "[REDACTED_TOKEN]");
    let redacted = BEARER_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    SIGNATURE_RE
        .replace_all(&redacted, "[REDACTED_SIGNATURE]")
        .into_owned()
}
