use serde::{Deserialize, Serialize};

use crate::action::Timestamp;

/// A chat message attached to an [`crate::Action`].
///
/// The wire format carries user and bot messages in one loosely-typed object;
/// the author variant is decided once here, on deserialization: a `bot_id`
/// field means a bot posted it. A nested `message` object (replies, shares)
/// becomes `quoted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMessage", into = "RawMessage")]
pub struct Message {
    pub common: MessageCommon,
    pub author: MessageAuthor,
    pub quoted: Option<Box<Message>>,
}

/// Fields shared by every message shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCommon {
    pub message_type: Option<String>,
    pub text: String,
    pub timestamp: Option<Timestamp>,
    pub subtype: Option<String>,
    pub hidden: bool,
    pub deleted_timestamp: Option<Timestamp>,
    pub event_timestamp: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAuthor {
    User {
        user_id: String,
        thread_timestamp: Option<Timestamp>,
    },
    Bot {
        bot_id: String,
        bot_name: Option<String>,
    },
}

impl Default for MessageAuthor {
    fn default() -> Self {
        MessageAuthor::User {
            user_id: String::new(),
            thread_timestamp: None,
        }
    }
}

impl Message {
    pub fn is_bot(&self) -> bool {
        matches!(self.author, MessageAuthor::Bot { .. })
    }

    /// The posting user's ID, or `None` for bot messages.
    pub fn user_id(&self) -> Option<&str> {
        match &self.author {
            MessageAuthor::User { user_id, .. } if !user_id.is_empty() => Some(user_id.as_str()),
            _ => None,
        }
    }

    /// Name to show for the author: the user ID, or the bot's display name.
    pub fn author_label(&self) -> &str {
        match &self.author {
            MessageAuthor::User { user_id, .. } => user_id.as_str(),
            MessageAuthor::Bot { bot_id, bot_name } => bot_name.as_deref().unwrap_or(bot_id.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawMessage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    message_type: Option<String>,
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "ts", default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<Timestamp>,
    #[serde(rename = "thread_ts", default, skip_serializing_if = "Option::is_none")]
    thread_timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtype: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    hidden: bool,
    #[serde(rename = "deleted_ts", default, skip_serializing_if = "Option::is_none")]
    deleted_timestamp: Option<Timestamp>,
    #[serde(rename = "event_ts", default, skip_serializing_if = "Option::is_none")]
    event_timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bot_id: Option<String>,
    #[serde(rename = "username", default, skip_serializing_if = "Option::is_none")]
    bot_name: Option<String>,
    #[serde(rename = "message", default, skip_serializing_if = "Option::is_none")]
    quoted: Option<Box<RawMessage>>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let author = match raw.bot_id {
            Some(bot_id) => MessageAuthor::Bot {
                bot_id,
                bot_name: raw.bot_name,
            },
            None => MessageAuthor::User {
                user_id: raw.user_id.unwrap_or_default(),
                thread_timestamp: raw.thread_timestamp,
            },
        };
        Self {
            common: MessageCommon {
                message_type: raw.message_type,
                text: raw.text.unwrap_or_default(),
                timestamp: raw.timestamp,
                subtype: raw.subtype,
                hidden: raw.hidden,
                deleted_timestamp: raw.deleted_timestamp,
                event_timestamp: raw.event_timestamp,
            },
            author,
            quoted: raw.quoted.map(|q| Box::new(Message::from(*q))),
        }
    }
}

impl From<Message> for RawMessage {
    fn from(msg: Message) -> Self {
        let common = msg.common;
        let mut raw = RawMessage {
            message_type: common.message_type,
            text: (!common.text.is_empty()).then_some(common.text),
            timestamp: common.timestamp,
            subtype: common.subtype,
            hidden: common.hidden,
            deleted_timestamp: common.deleted_timestamp,
            event_timestamp: common.event_timestamp,
            quoted: msg.quoted.map(|q| Box::new(RawMessage::from(*q))),
            ..RawMessage::default()
        };
        match msg.author {
            MessageAuthor::User {
                user_id,
                thread_timestamp,
            } => {
                raw.user_id = (!user_id.is_empty()).then_some(user_id);
                raw.thread_timestamp = thread_timestamp;
            }
            MessageAuthor::Bot { bot_id, bot_name } => {
                raw.bot_id = Some(bot_id);
                raw.bot_name = bot_name;
            }
        }
        raw
    }
}
