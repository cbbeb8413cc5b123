use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::delivery::{Delivery, Headers, Payload};
use crate::error::QueueError;

/// A destination that accepts payloads for at-least-once delivery.
///
/// The transport owns serialization; callers hand over typed payloads.
#[async_trait]
pub trait Queuer: Send + Sync {
    /// Human-readable destination name for logging.
    fn name(&self) -> &str;

    /// Place a payload on the destination. No retries happen here.
    async fn queue(&self, headers: &Headers, payload: &Payload) -> Result<(), QueueError>;
}

/// A background worker consuming deliveries from an in-process queue.
///
/// Each component runs in its own Tokio task until its receiver closes.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Human-readable name of this component.
    fn name(&self) -> &str;

    /// Run the consume loop.
    async fn start(&self, rx: mpsc::Receiver<Delivery>) -> Result<()>;
}
