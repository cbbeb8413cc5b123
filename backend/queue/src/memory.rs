use async_trait::async_trait;
use modbot_core::{Delivery, Headers, Payload, QueueError, Queuer};
use tokio::sync::mpsc;
use tracing::debug;

/// Producer side of a [`crate::QueueBus`] queue.
#[derive(Clone, Debug)]
pub struct MemoryQueue {
    name: String,
    tx: mpsc::Sender<Delivery>,
}

impl MemoryQueue {
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<Delivery>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

#[async_trait]
impl Queuer for MemoryQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn queue(&self, headers: &Headers, payload: &Payload) -> Result<(), QueueError> {
        let delivery = Delivery::new(headers.clone(), payload.clone());
        let id = delivery.id;
        self.tx
            .send(delivery)
            .await
            .map_err(|_| QueueError::Closed(self.name.clone()))?;
        debug!(queue = %self.name, delivery_id = %id, "Delivery queued");
        Ok(())
    }
}
