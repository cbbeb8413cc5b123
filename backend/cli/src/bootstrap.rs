//! Wires configuration into a running router and its workers.

use std::sync::Arc;

use anyhow::{Context, Result};
use modbot_config::ModbotConfig;
use modbot_core::Component;
use modbot_flagging::{FlagWorker, StaticAdminDirectory};
use modbot_queue::{build_destination, QueueBus};
use modbot_routing::{RouteTable, Router, RouterConfig};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Everything `serve` keeps alive for the life of the process.
pub struct Runtime {
    pub router: Arc<Router>,
    pub workers: Vec<JoinHandle<()>>,
    /// Owns receivers of queues nobody consumes, so producers see backpressure
    /// rather than a closed queue.
    pub bus: QueueBus,
}

/// Build the route table, router and in-process workers from `config`.
///
/// Must run inside a Tokio runtime; workers are spawned immediately.
pub fn build_runtime(config: &ModbotConfig) -> Result<Runtime> {
    let mut bus = QueueBus::with_buffer_size(config.dispatch.queue_buffer());

    let mut table = RouteTable::new();
    for route in &config.routes {
        let destination = build_destination(&route.destination, &mut bus)
            .with_context(|| format!("Failed to build destination for action '{}'", route.action))?;
        table
            .register_route(route.action.clone(), destination)
            .with_context(|| format!("Failed to register route for action '{}'", route.action))?;
    }

    let router_config = RouterConfig {
        signing_secret: config.slack.signing_secret().to_string(),
        max_clock_skew: config.slack.max_clock_skew(),
        dispatch_timeout: config.dispatch.timeout(),
    };
    let router = Router::new(router_config, table).context("Failed to build router")?;

    let mut workers = Vec::new();
    if let Some(handle) = spawn_flag_worker(config, &mut bus)? {
        workers.push(handle);
    }

    for queue in bus.unconsumed() {
        warn!(queue, "No worker consumes this in-process queue; deliveries will back up");
    }

    Ok(Runtime {
        router: Arc::new(router),
        workers,
        bus,
    })
}

fn spawn_flag_worker(config: &ModbotConfig, bus: &mut QueueBus) -> Result<Option<JoinHandle<()>>> {
    let Some(flagging) = config.flagging.as_ref().filter(|f| f.is_enabled()) else {
        return Ok(None);
    };

    let source = flagging
        .source
        .clone()
        .unwrap_or_else(|| modbot_config::defaults::DEFAULT_FLAG_SOURCE.to_string());
    let outbound = build_destination(&flagging.outbound.clone().unwrap_or_default(), bus)
        .context("Failed to build flagging outbound destination")?;
    let rx = bus
        .take_receiver(&source)
        .with_context(|| format!("Queue '{source}' already has a consumer"))?;

    let directory = Arc::new(StaticAdminDirectory::new(flagging.admin_channels.clone()));
    let worker = FlagWorker::new(outbound, directory).with_send_timeout(config.dispatch.timeout());
    info!(source = %source, "Starting flag worker");

    Ok(Some(tokio::spawn(async move {
        if let Err(e) = worker.start(rx).await {
            error!(error = %e, "Flag worker failed");
        }
    })))
}
