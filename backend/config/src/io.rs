//! Config file discovery and loading.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "modbot.yaml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "MODBOT_CONFIG";

/// Resolve the modbot config directory: `~/.modbot/`.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".modbot"))
        .unwrap_or_else(|| PathBuf::from(".modbot"))
}

/// Resolve which config file to load.
///
/// Priority: explicit path > `MODBOT_CONFIG` > `./modbot.yaml` if present >
/// `~/.modbot/modbot.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    config_dir().join(CONFIG_FILE_NAME)
}

/// Read a YAML config file into an untyped value tree.
///
/// Substitution and typing happen afterwards, so `${VAR}` references survive
/// to this point untouched.
pub async fn load_config_value(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    debug!(path = %path.display(), bytes = raw.len(), "Read config file");

    let value = parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Parse YAML text into a value tree. An empty document is an empty mapping.
pub fn parse_config_str(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_yaml::from_str(raw)?;
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}
