use thiserror::Error;

/// Failure to place a payload onto a destination queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue closed: {0}")]
    Closed(String),

    #[error("enqueue timed out after {0} ms")]
    Timeout(u64),

    #[error("destination rejected payload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unable to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A timestamp string that is not a plain decimal number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,

    #[error("timestamp {0:?} is not a decimal number")]
    Malformed(String),
}
