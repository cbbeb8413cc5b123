use async_trait::async_trait;
use modbot_core::{Headers, Payload, QueueError, Queuer};
use modbot_logging::redact_sensitive_data;
use tracing::info;

/// Writes each payload to the log and drops it.
///
/// Useful as the flagging worker's outbound leg until a platform client is
/// wired in, and for dry runs.
#[derive(Debug, Clone)]
pub struct LogQueue {
    name: String,
}

impl LogQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Queuer for LogQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn queue(&self, headers: &Headers, payload: &Payload) -> Result<(), QueueError> {
        let json = serde_json::to_string(payload)?;
        info!(
            destination = %self.name,
            headers = ?headers,
            payload = %redact_sensitive_data(&json),
            "Payload logged"
        );
        Ok(())
    }
}
