//! Slack message actions
//!
//! Interactive callbacks arrive as `application/x-www-form-urlencoded` bodies
//! with the action itself JSON-encoded in the `payload` field.

use modbot_core::Action;
use thiserror::Error;

/// Any reason a callback body could not be turned into an [`Action`].
///
/// Callers only need to know the body is unusable; the variant keeps the cause
/// for logging.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse request body: {0}")]
    Form(String),

    #[error("failed to parse request body: missing payload field")]
    MissingPayload,

    #[error("failed to parse request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse request body: {0} must not be empty")]
    MissingField(&'static str),
}

/// Decode a raw callback body into an [`Action`].
pub fn parse_action(body: impl AsRef<[u8]>) -> Result<Action, ParseError> {
    let body = std::str::from_utf8(body.as_ref())
        .map_err(|e| ParseError::Form(format!("body is not UTF-8: {e}")))?;
    let payload = form_value(body, "payload")?.ok_or(ParseError::MissingPayload)?;
    let action: Action = serde_json::from_str(&payload)?;

    if action.kind.is_empty() {
        return Err(ParseError::MissingField("callback_id"));
    }
    if action.team.id.is_empty() {
        return Err(ParseError::MissingField("team.id"));
    }
    Ok(action)
}

/// First value for `key` in a form-encoded body.
///
/// The whole body is validated, not just the matching pair, so a malformed
/// body is rejected even when the wanted key decodes cleanly.
fn form_value(body: &str, key: &str) -> Result<Option<String>, ParseError> {
    let mut found = None;
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        if pair.contains(';') {
            return Err(ParseError::Form("invalid semicolon separator in query".into()));
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let k = decode_component(raw_key)?;
        let v = decode_component(raw_value)?;
        if found.is_none() && k == key {
            found = Some(v);
        }
    }
    Ok(found)
}

fn decode_component(raw: &str) -> Result<String, ParseError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                let end = (i + 3).min(raw.len());
                return Err(ParseError::Form(format!(
                    "invalid URL escape {:?}",
                    raw.get(i..end).unwrap_or("%")
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|cow| cow.into_owned())
        .map_err(|e| ParseError::Form(e.to_string()))
}
