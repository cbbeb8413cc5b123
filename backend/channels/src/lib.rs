//! Inbound Slack plumbing: request signing and message-action decoding.

pub mod slack;
pub mod slack_actions;

pub use slack::{is_valid, sign, SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use slack_actions::{parse_action, ParseError};
