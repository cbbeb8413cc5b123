use std::sync::Arc;

use modbot_config::DestinationConfig;
use modbot_core::{QueueError, Queuer};
use tracing::debug;

use crate::bus::QueueBus;
use crate::http::HttpQueue;
use crate::log::LogQueue;

/// Build the destination a config block describes.
///
/// Memory destinations are attached to `bus`, which must outlive them for
/// their consumers to be reachable.
pub fn build_destination(
    config: &DestinationConfig,
    bus: &mut QueueBus,
) -> Result<Arc<dyn Queuer>, QueueError> {
    let destination: Arc<dyn Queuer> = match config {
        DestinationConfig::Memory { queue } => {
            if queue.trim().is_empty() {
                return Err(QueueError::Config("memory queue name is empty".into()));
            }
            Arc::new(bus.queue(queue))
        }
        DestinationConfig::Http { url, headers, .. } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(QueueError::Config(format!("unsupported URL '{url}'")));
            }
            let timeout = config.http_timeout().unwrap_or_default();
            Arc::new(HttpQueue::new(url.clone(), timeout)?.with_headers(headers.clone()))
        }
        DestinationConfig::Log { name } => {
            Arc::new(LogQueue::new(name.clone().unwrap_or_else(|| "log".to_string())))
        }
    };
    debug!(destination = destination.name(), "Built destination");
    Ok(destination)
}
