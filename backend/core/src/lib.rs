pub mod action;
pub mod delivery;
pub mod envelope;
pub mod error;
pub mod message;
pub mod traits;
pub mod webhook;

pub use action::{Action, Channel, Team, Timestamp, User};
pub use delivery::{Delivery, Headers, Payload, HEADER_ACTION, HEADER_TEAM};
pub use envelope::{Address, Attachment, Envelope, Field, OutboundMessage};
pub use error::{QueueError, TimestampError};
pub use message::{Message, MessageAuthor, MessageCommon};
pub use traits::{Component, Queuer};
pub use webhook::WebhookRequest;
