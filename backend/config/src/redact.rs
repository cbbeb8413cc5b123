//! Config redaction: produce safe-to-share config snapshots by masking
//! sensitive fields.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "signingSecret",
    "signing_secret",
    "botToken",
    "bot_token",
    "accessToken",
    "access_token",
    "authorization",
    "token",
    "secret",
    "password",
    "apiKey",
    "api_key",
];

/// Redact a config JSON value, replacing sensitive string fields with a
/// four-character hint followed by `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    let hint = if s.chars().count() > 8 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    };
    Value::String(hint)
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// Collect all field paths that [`redact`] would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, key: &str, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() && is_sensitive_key(key) => out.push(path.to_string()),
        Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                collect_paths_recursive(v, key, &format!("{path}[{i}]"), out);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, k, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_signing_secret() {
        let v = json!({ "slack": { "signingSecret": "8f742231b10e8888abcd99yyyzzz85a5" } });
        let redacted = redact(&v);
        assert_eq!(redacted["slack"]["signingSecret"], "8f74***");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let v = json!({ "secret": "abc" });
        assert_eq!(redact(&v)["secret"], "***");
    }

    #[test]
    fn redacts_http_authorization_header() {
        let v = json!({ "routes": [{ "destination": { "headers": { "Authorization": "Bearer abcdefghijk" } } }] });
        let redacted = redact(&v);
        assert_eq!(redacted["routes"][0]["destination"]["headers"]["Authorization"], "Bear***");
        assert_eq!(
            collect_redacted_paths(&v),
            vec!["routes[0].destination.headers.Authorization".to_string()]
        );
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "routes": [{ "action": "flagMessage" }] });
        assert_eq!(redact(&v), v);
        assert!(collect_redacted_paths(&v).is_empty());
    }
}
