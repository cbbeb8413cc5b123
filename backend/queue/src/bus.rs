use std::collections::HashMap;

use modbot_core::Delivery;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::memory::MemoryQueue;

/// Default channel buffer size for in-process queues.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Named in-process queues connecting the router to local workers.
///
/// Each queue is a bounded Tokio mpsc channel. Producers get a cloneable
/// [`MemoryQueue`]; the single consumer takes the receiver once.
pub struct QueueBus {
    buffer: usize,
    senders: HashMap<String, mpsc::Sender<Delivery>>,
    receivers: HashMap<String, mpsc::Receiver<Delivery>>,
}

impl QueueBus {
    /// Create a new bus with default buffer sizes.
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new bus with a custom buffer size. Zero is raised to one.
    pub fn with_buffer_size(buffer: usize) -> Self {
        let buffer = buffer.max(1);
        info!(buffer_size = buffer, "QueueBus initialized");
        Self {
            buffer,
            senders: HashMap::new(),
            receivers: HashMap::new(),
        }
    }

    /// Producer handle for `name`, creating the queue on first use.
    pub fn queue(&mut self, name: &str) -> MemoryQueue {
        let tx = match self.senders.get(name) {
            Some(tx) => tx.clone(),
            None => {
                let (tx, rx) = mpsc::channel(self.buffer);
                self.senders.insert(name.to_string(), tx.clone());
                self.receivers.insert(name.to_string(), rx);
                debug!(queue = name, "Created in-process queue");
                tx
            }
        };
        MemoryQueue::new(name, tx)
    }

    /// Take the receiver for `name` (can only be called once).
    ///
    /// Creates the queue if nothing has produced to it yet.
    pub fn take_receiver(&mut self, name: &str) -> Option<mpsc::Receiver<Delivery>> {
        if !self.senders.contains_key(name) {
            self.queue(name);
        }
        let rx = self.receivers.remove(name);
        if rx.is_some() {
            debug!(queue = name, "Receiver taken");
        }
        rx
    }

    /// Queues whose receiver nobody has taken, sorted.
    pub fn unconsumed(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.receivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for QueueBus {
    fn default() -> Self {
        Self::new()
    }
}
