//! Message actions: the normalized record of a user invoking an action on a
//! chat message (e.g. "flag this message").

use std::fmt;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampError;
use crate::message::Message;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A platform timestamp such as `1535885531.310842`.
///
/// Timestamps double as message identifiers, so the exact decimal text is
/// kept. It is never converted to a float.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(String);

impl Timestamp {
    /// Validate and wrap a decimal string (`digits` or `digits.digits`).
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        if raw.is_empty() {
            return Err(TimestampError::Empty);
        }
        let (whole, frac) = match raw.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (raw, None),
        };
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(whole) || frac.is_some_and(|f| !digits(f)) {
            return Err(TimestampError::Malformed(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whole seconds, if they fit in an `i64`.
    pub fn seconds(&self) -> Option<i64> {
        let whole = self.0.split('.').next().unwrap_or_default();
        whole.parse().ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    /// Accepts a JSON string or number. Numbers keep their literal text, so
    /// `1535813905.000100` is not rounded through a float.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => text,
            serde_json::Value::Number(number) => number.to_string(),
            other => {
                return Err(de::Error::custom(format!(
                    "expected a decimal timestamp, found {other}"
                )))
            }
        };
        Timestamp::parse(&raw).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A workspace on the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A user-triggered action on a message, as delivered by the platform.
///
/// `kind` carries the wire `callback_id` and selects the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default)]
    pub payload_type: String,
    #[serde(rename = "callback_id")]
    pub kind: String,
    pub team: Team,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default)]
    pub user: User,
    #[serde(rename = "action_ts")]
    pub action_timestamp: Timestamp,
    #[serde(rename = "message_ts")]
    pub message_timestamp: Timestamp,
    #[serde(default)]
    pub message: Message,
    #[serde(default)]
    pub response_url: String,
    #[serde(default)]
    pub trigger_id: String,
}

impl Action {
    pub fn team_id(&self) -> &str {
        &self.team.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_keeps_trailing_zeros() {
        let ts = Timestamp::parse("1535813905.000100").unwrap();
        assert_eq!(ts.as_str(), "1535813905.000100");
        assert_eq!(ts.seconds(), Some(1535813905));
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert_eq!(Timestamp::parse(""), Err(TimestampError::Empty));
        for bad in ["abc", "1.", ".5", "1.2.3", "-1", "1e9", " 1"] {
            assert!(Timestamp::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn timestamp_from_json_string_and_integer() {
        let ts: Timestamp = serde_json::from_str("\"1531420618.123456\"").unwrap();
        assert_eq!(ts.as_str(), "1531420618.123456");

        let ts: Timestamp = serde_json::from_str("1531420618").unwrap();
        assert_eq!(ts.as_str(), "1531420618");
    }

    #[test]
    fn timestamp_from_json_fraction_keeps_literal_text() {
        let ts: Timestamp = serde_json::from_str("1535813905.000100").unwrap();
        assert_eq!(ts.as_str(), "1535813905.000100");
    }

    #[test]
    fn timestamp_rejects_other_json() {
        for bad in ["-5", "1e9", "true", "null", "[]", "\"x\""] {
            assert!(serde_json::from_str::<Timestamp>(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn action_requires_kind_and_timestamps() {
        let missing_kind = r#"{"team":{"id":"T1"},"action_ts":"1","message_ts":"2"}"#;
        assert!(serde_json::from_str::<Action>(missing_kind).is_err());

        let missing_ts = r#"{"callback_id":"flagMessage","team":{"id":"T1"}}"#;
        assert!(serde_json::from_str::<Action>(missing_ts).is_err());
    }
}
