mod bootstrap;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use modbot_config::{
    collect_redacted_paths, collect_referenced_vars, config_file_path, load_and_prepare,
    load_config_value, redact, validate, ModbotConfig,
};
use modbot_gateway::{build_app, shutdown_signal, start_server, GatewayState};

#[derive(Parser)]
#[command(name = "modbot")]
#[command(about = "modbot — signed Slack webhook router for a moderation bot")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $MODBOT_CONFIG, ./modbot.yaml, ~/.modbot/modbot.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Load and validate the config, then print it with secrets masked
    Check,
    /// Print the signature Slack would send for a request body
    Sign {
        #[arg(long, env = "SLACK_SIGNING_SECRET", hide_env_values = true)]
        secret: String,
        /// Unix seconds; defaults to now
        #[arg(long)]
        timestamp: Option<String>,
        #[arg(long)]
        body: String,
    },
    /// Query a running server's health endpoint
    Status {
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let path = config_file_path(cli.config.as_deref());
            let mut config = load_and_prepare(&path).await?;
            if let Some(port) = port {
                config.server.port = Some(port);
            }
            let _guard = modbot_logging::init_logger(
                config.logging.level(),
                config.logging.dir.as_deref(),
                config.logging.json.unwrap_or(false),
            );
            // Loading ran before the subscriber existed.
            for warning in validate(&config).warnings {
                warn!(path = %warning.path, message = %warning.message, "Config warning");
            }
            run_server(config).await?;
        }
        Commands::Check => {
            let _guard = modbot_logging::init_logger("info", None, false);
            let path = config_file_path(cli.config.as_deref());
            check(&path).await?;
        }
        Commands::Sign {
            secret,
            timestamp,
            body,
        } => {
            let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp().to_string());
            let signature = modbot_channels::sign(&secret, &timestamp, &body)
                .context("Unable to sign with the given secret")?;
            println!("X-Slack-Request-Timestamp: {timestamp}");
            println!("X-Slack-Signature: {signature}");
        }
        Commands::Status { url } => {
            let client = reqwest::Client::new();
            let health_url = format!("{}/health", url.trim_end_matches('/'));
            match client.get(&health_url).send().await {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("modbot is not reachable at {url}");
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: ModbotConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind(), config.server.port())
        .parse()
        .context("Invalid server bind address")?;
    info!(
        addr = %addr,
        base_path = config.server.base_path(),
        routes = config.routes.len(),
        "Starting modbot"
    );

    let runtime = bootstrap::build_runtime(&config)?;
    let app = build_app(
        config.server.base_path(),
        GatewayState::new(runtime.router.clone()),
    );

    start_server(addr, app, shutdown_signal()).await?;

    for worker in runtime.workers {
        worker.abort();
    }
    info!("modbot stopped");
    Ok(())
}

async fn check(path: &Path) -> Result<()> {
    let raw = load_config_value(path).await?;
    let vars = collect_referenced_vars(&raw);
    if !vars.is_empty() {
        println!("Environment variables referenced: {}", vars.join(", "));
    }

    let config = load_and_prepare(path).await?;
    let report = validate(&config);
    println!(
        "Config OK: {} route(s), {} warning(s)",
        config.routes.len(),
        report.warnings.len()
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }

    let value = serde_json::to_value(&config).context("Failed to serialize config")?;
    let masked = collect_redacted_paths(&value);
    if !masked.is_empty() {
        println!("Masked: {}", masked.join(", "));
    }
    println!("{}", serde_json::to_string_pretty(&redact(&value))?);
    Ok(())
}
