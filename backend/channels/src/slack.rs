/// Slack request signing.
///
/// Every callback carries `X-Slack-Request-Timestamp` and
/// `X-Slack-Signature: v0=<hex>`, where the hex is an HMAC-SHA256 over
/// `v0:<timestamp>:<raw body>` keyed by the app's signing secret.
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use modbot_core::WebhookRequest;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Signature scheme version prefix.
pub const SIGNATURE_VERSION: &str = "v0";

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

/// Checks inbound requests against a signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: String,
    max_clock_skew: Option<Duration>,
}

impl SignatureVerifier {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            max_clock_skew: None,
        }
    }

    /// Also reject requests whose timestamp is further than `skew` from now.
    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = Some(skew);
        self
    }

    pub fn is_valid(&self, req: &WebhookRequest) -> bool {
        if !is_valid(req, &self.signing_secret) {
            return false;
        }
        match self.max_clock_skew {
            Some(skew) => req
                .header(TIMESTAMP_HEADER)
                .is_some_and(|ts| is_fresh(ts, Utc::now().timestamp(), skew)),
            None => true,
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("signing_secret", &"***")
            .field("max_clock_skew", &self.max_clock_skew)
            .finish()
    }
}

/// Report whether `req` is a POST carrying a valid Slack signature for `signing_secret`.
///
/// Missing headers, a wrong method, a bad prefix or undecodable hex all yield
/// `false`; nothing here returns an error.
pub fn is_valid(req: &WebhookRequest, signing_secret: &str) -> bool {
    if !req.is_post() {
        debug!(method = %req.http_method, "Rejecting non-POST request");
        return false;
    }
    let Some(timestamp) = req.header(TIMESTAMP_HEADER) else {
        debug!("Missing {} header", TIMESTAMP_HEADER);
        return false;
    };
    let Some(signature) = req.header(SIGNATURE_HEADER) else {
        debug!("Missing {} header", SIGNATURE_HEADER);
        return false;
    };
    check_hmac(&req.body, timestamp, signature, signing_secret)
}

/// Produce the `v0=<hex>` signature Slack would send for this body.
pub fn sign(signing_secret: &str, timestamp: &str, body: impl AsRef<[u8]>) -> Option<String> {
    let mac = base_mac(signing_secret, timestamp, body.as_ref())?;
    Some(format!(
        "{SIGNATURE_VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn base_mac(signing_secret: &str, timestamp: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(signing_secret.as_bytes()).ok()?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Some(mac)
}

fn check_hmac(body: &[u8], timestamp: &str, signature: &str, signing_secret: &str) -> bool {
    let Some(sig_hex) = signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|rest| rest.strip_prefix('='))
    else {
        return false;
    };
    let Ok(provided) = hex::decode(sig_hex) else {
        return false;
    };
    let Some(mac) = base_mac(signing_secret, timestamp, body) else {
        return false;
    };
    // Constant-time comparison.
    mac.verify_slice(&provided).is_ok()
}

fn is_fresh(timestamp: &str, now: i64, skew: Duration) -> bool {
    let Ok(ts) = timestamp.trim().parse::<i64>() else {
        return false;
    };
    now.abs_diff(ts) <= skew.as_secs()
}
