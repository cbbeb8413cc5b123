use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Action;
use crate::envelope::Envelope;

/// Metadata attached to an enqueued payload (`Team`, `Action`, ...).
pub type Headers = BTreeMap<String, String>;

/// Metadata key carrying the workspace ID.
pub const HEADER_TEAM: &str = "Team";

/// Metadata key carrying the action kind.
pub const HEADER_ACTION: &str = "Action";

/// Anything a destination can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Action(Action),
    Notification(Envelope),
}

impl Payload {
    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Payload::Action(a) => Some(a),
            Payload::Notification(_) => None,
        }
    }

    pub fn team_id(&self) -> &str {
        match self {
            Payload::Action(a) => a.team_id(),
            Payload::Notification(e) => &e.destination.team_id,
        }
    }
}

impl From<Action> for Payload {
    fn from(action: Action) -> Self {
        Payload::Action(action)
    }
}

impl From<Envelope> for Payload {
    fn from(envelope: Envelope) -> Self {
        Payload::Notification(envelope)
    }
}

/// One payload in flight on an in-process queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub queued_at: DateTime<Utc>,
    pub headers: Headers,
    pub payload: Payload,
}

impl Delivery {
    pub fn new(headers: Headers, payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            queued_at: Utc::now(),
            headers,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Address, OutboundMessage};

    #[test]
    fn notification_payload_serializes_bare() {
        let envelope = Envelope {
            destination: Address {
                team_id: "T1".into(),
                channel_id: "C1".into(),
                user_id: String::new(),
            },
            ephemeral: false,
            message: OutboundMessage::text("hi"),
        };
        let payload = Payload::from(envelope);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["destination"]["team_id"], "T1");
        assert_eq!(payload.team_id(), "T1");
        assert!(payload.as_action().is_none());
    }

    fn round_trip(action_json: &str) {
        let action: Action = serde_json::from_str(action_json).unwrap();
        let payload = Payload::from(action.clone());

        let wire = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&wire).unwrap();

        let restored = back.as_action().expect("action payload stays an action");
        assert_eq!(restored, &action);
        assert_eq!(restored.kind, "flagMessage");
        assert_eq!(restored.team_id(), "TBLG57ECT");
        assert_eq!(restored.action_timestamp, action.action_timestamp);
        assert_eq!(restored.message_timestamp, action.message_timestamp);
    }

    #[test]
    fn bot_message_action_survives_serialization() {
        round_trip(
            r#"{"type":"message_action","callback_id":"flagMessage","team":{"id":"TBLG57ECT","domain":"buddybotdev"},"channel":{"id":"CBLPRTX3P","name":"general"},"user":{"id":"UBLKAG9K4","name":"bill"},"action_ts":"1536060699.383687","message_ts":"1533595230.000090","message":{"text":"Score now at 8","username":"buddybot","bot_id":"BBL3GSL7K","type":"message","subtype":"bot_message","ts":"1533595230.000090"}}"#,
        );
    }

    #[test]
    fn nested_message_action_survives_serialization() {
        round_trip(
            r#"{"type":"message_action","callback_id":"flagMessage","team":{"id":"TBLG57ECT"},"action_ts":1535885531.310842,"message_ts":"1535813905.000100","message":{"type":"message","subtype":"message_changed","ts":"1535813905.000100","message":{"user":"UBLKAG9K4","text":"edited","ts":"1535813900.000200","thread_ts":"1535813800.000300"}}}"#,
        );
    }
}
