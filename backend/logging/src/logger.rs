//! Structured Logger
//!
//! `RUST_LOG` overrides the configured level when set.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the file writer flushing. Hold it for the life of the process.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the global logger.
///
/// With `log_dir` set, NDJSON records are also written to a daily-rolling
/// `modbot.log.YYYY-MM-DD` there. `json` switches the console layer to JSON.
/// A second call is a no-op.
pub fn init_logger(level: &str, log_dir: Option<&Path>, json: bool) -> LogGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_ansi(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "modbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    LogGuard { _file: guard }
}
