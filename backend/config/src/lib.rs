//! `modbot-config` — modbot runtime configuration.
//!
//! Provides:
//! - Typed config schema (server, Slack, dispatch, routes, flagging, logging)
//! - YAML loading and config file discovery
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with errors and warnings
//! - Config redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config_value, parse_config_str};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{
    DestinationConfig, DispatchConfig, FlaggingConfig, LoggingConfig, ModbotConfig, RouteConfig,
    ServerConfig, SlackConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, apply defaults, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Warnings are
/// logged; any validation error aborts the load.
pub async fn load_and_prepare(path: &Path) -> Result<ModbotConfig> {
    let raw = load_config_value(path).await?;
    prepare(&raw)
}

/// The [`load_and_prepare`] pipeline over an already parsed value tree.
pub fn prepare(raw: &Value) -> Result<ModbotConfig> {
    let value = resolve_env_vars(raw).context("Failed to resolve env vars in config")?;

    let config: ModbotConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{} config error(s); first: {first}", report.errors.len());
    }

    Ok(config)
}
