//! Config defaults: fills unset values after loading so the effective
//! configuration can be printed and inspected.

use crate::schema::{DestinationConfig, ModbotConfig};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BASE_PATH: &str = "/slack";

/// Upper bound on a single enqueue, in milliseconds.
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_QUEUE_BUFFER: usize = 256;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Memory queue the flagging worker reads when none is named.
pub const DEFAULT_FLAG_SOURCE: &str = "flag-message";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ModbotConfig) -> ModbotConfig {
    let config = apply_server_defaults(config);
    let config = apply_dispatch_defaults(config);
    let config = apply_flagging_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: ModbotConfig) -> ModbotConfig {
    let server = &mut config.server;
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server
        .base_path
        .get_or_insert_with(|| DEFAULT_BASE_PATH.to_string());
    config
}

fn apply_dispatch_defaults(mut config: ModbotConfig) -> ModbotConfig {
    config
        .dispatch
        .timeout_ms
        .get_or_insert(DEFAULT_DISPATCH_TIMEOUT_MS);
    config.dispatch.queue_buffer.get_or_insert(DEFAULT_QUEUE_BUFFER);
    config
}

fn apply_flagging_defaults(mut config: ModbotConfig) -> ModbotConfig {
    if let Some(flagging) = &mut config.flagging {
        flagging.enabled.get_or_insert(true);
        flagging
            .source
            .get_or_insert_with(|| DEFAULT_FLAG_SOURCE.to_string());
        flagging.outbound.get_or_insert_with(DestinationConfig::default);
    }
    config
}

fn apply_logging_defaults(mut config: ModbotConfig) -> ModbotConfig {
    let logging = &mut config.logging;
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FlaggingConfig;

    #[test]
    fn fills_server_and_dispatch() {
        let cfg = apply_all_defaults(ModbotConfig::default());
        assert_eq!(cfg.server.port, Some(DEFAULT_PORT));
        assert_eq!(cfg.server.base_path.as_deref(), Some(DEFAULT_BASE_PATH));
        assert_eq!(cfg.dispatch.timeout_ms, Some(DEFAULT_DISPATCH_TIMEOUT_MS));
        assert_eq!(cfg.logging.level.as_deref(), Some(DEFAULT_LOG_LEVEL));
    }

    #[test]
    fn does_not_override_user_values() {
        let mut cfg = ModbotConfig::default();
        cfg.server.port = Some(9999);
        cfg.dispatch.timeout_ms = Some(10);
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.server.port, Some(9999));
        assert_eq!(cfg.dispatch.timeout_ms, Some(10));
    }

    #[test]
    fn flagging_defaults_only_when_present() {
        let cfg = apply_all_defaults(ModbotConfig::default());
        assert!(cfg.flagging.is_none());

        let mut cfg = ModbotConfig::default();
        cfg.flagging = Some(FlaggingConfig::default());
        let flagging = apply_all_defaults(cfg).flagging.unwrap();
        assert_eq!(flagging.source.as_deref(), Some(DEFAULT_FLAG_SOURCE));
        assert_eq!(flagging.outbound, Some(DestinationConfig::Log { name: None }));
        assert_eq!(flagging.enabled, Some(true));
    }
}
