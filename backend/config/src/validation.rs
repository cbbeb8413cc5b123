//! Config validation: deep schema checks with user-friendly error messages.

use crate::schema::{DestinationConfig, ModbotConfig};
use std::collections::HashSet;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ModbotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_slack(config, &mut report);
    validate_dispatch(config, &mut report);
    validate_routes(config, &mut report);
    validate_flagging(config, &mut report);
    report
}

fn validate_server(config: &ModbotConfig, report: &mut ValidationReport) {
    if config.server.port == Some(0) {
        report.error("server.port", "port must be > 0");
    }
    if let Some(base) = &config.server.base_path {
        if !base.is_empty() && !base.starts_with('/') {
            report.error("server.basePath", "basePath must start with '/'");
        }
    }
}

fn validate_slack(config: &ModbotConfig, report: &mut ValidationReport) {
    if config.slack.signing_secret().trim().is_empty() {
        report.error("slack.signingSecret", "Slack signing secret is required");
    }
    match config.slack.max_clock_skew_secs {
        None => report.warn(
            "slack.maxClockSkewSecs",
            "No freshness window configured; replayed requests will be accepted",
        ),
        Some(0) => report.error("slack.maxClockSkewSecs", "maxClockSkewSecs must be > 0"),
        Some(_) => {}
    }
}

fn validate_dispatch(config: &ModbotConfig, report: &mut ValidationReport) {
    if config.dispatch.timeout_ms == Some(0) {
        report.error("dispatch.timeoutMs", "timeoutMs must be > 0");
    }
    if config.dispatch.queue_buffer == Some(0) {
        report.error("dispatch.queueBuffer", "queueBuffer must be >= 1");
    }
}

fn validate_routes(config: &ModbotConfig, report: &mut ValidationReport) {
    if config.routes.is_empty() {
        report.error("routes", "At least one route is required");
    }
    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let path = format!("routes[{i}]");
        if route.action.trim().is_empty() {
            report.error(format!("{path}.action"), "Action kind cannot be empty");
        } else if !seen.insert(route.action.as_str()) {
            report.error(
                format!("{path}.action"),
                format!("Duplicate route for action '{}'", route.action),
            );
        }
        validate_destination(&route.destination, &format!("{path}.destination"), report);
    }
}

fn validate_destination(dest: &DestinationConfig, path: &str, report: &mut ValidationReport) {
    match dest {
        DestinationConfig::Memory { queue } => {
            if queue.trim().is_empty() {
                report.error(format!("{path}.queue"), "Queue name cannot be empty");
            }
        }
        DestinationConfig::Http { url, timeout_ms, .. } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                report.error(
                    format!("{path}.url"),
                    format!("URL '{url}' must use http or https"),
                );
            }
            if *timeout_ms == Some(0) {
                report.error(format!("{path}.timeoutMs"), "timeoutMs must be > 0");
            }
        }
        DestinationConfig::Log { .. } => {}
    }
}

fn validate_flagging(config: &ModbotConfig, report: &mut ValidationReport) {
    let Some(flagging) = &config.flagging else { return };
    if !flagging.is_enabled() {
        return;
    }

    if let Some(source) = &flagging.source {
        let fed = config.routes.iter().any(|r| {
            matches!(&r.destination, DestinationConfig::Memory { queue } if queue == source)
        });
        if !fed {
            report.warn(
                "flagging.source",
                format!("No memory route feeds queue '{source}'; the worker will stay idle"),
            );
        }
    }
    if let Some(outbound) = &flagging.outbound {
        if let DestinationConfig::Memory { queue } = outbound {
            if flagging.source.as_deref() == Some(queue.as_str()) {
                report.error(
                    "flagging.outbound.queue",
                    "Outbound queue cannot be the worker's own source",
                );
            }
        }
        validate_destination(outbound, "flagging.outbound", report);
    }
    if flagging.admin_channels.is_empty() {
        report.warn(
            "flagging.adminChannels",
            "No admin channels configured; admin notifications will fail",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{FlaggingConfig, RouteConfig};

    fn memory(queue: &str) -> DestinationConfig {
        DestinationConfig::Memory { queue: queue.into() }
    }

    fn valid() -> ModbotConfig {
        let mut cfg = ModbotConfig::default();
        cfg.slack.signing_secret = Some("secret".into());
        cfg.slack.max_clock_skew_secs = Some(300);
        cfg.routes.push(RouteConfig {
            action: "flagMessage".into(),
            destination: memory("flag-message"),
        });
        apply_all_defaults(cfg)
    }

    #[test]
    fn minimal_config_is_valid() {
        let report = validate(&valid());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn missing_secret_and_routes_are_errors() {
        let report = validate(&ModbotConfig::default());
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"slack.signingSecret"));
        assert!(paths.contains(&"routes"));
    }

    #[test]
    fn duplicate_and_empty_actions_are_errors() {
        let mut cfg = valid();
        cfg.routes.push(RouteConfig {
            action: "flagMessage".into(),
            destination: memory("other"),
        });
        cfg.routes.push(RouteConfig {
            action: " ".into(),
            destination: memory("x"),
        });
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].message.contains("Duplicate"));
        assert_eq!(report.errors[1].path, "routes[2].action");
    }

    #[test]
    fn bad_destinations_are_errors() {
        let mut cfg = valid();
        cfg.routes.push(RouteConfig {
            action: "share".into(),
            destination: DestinationConfig::Http {
                url: "ftp://example.com".into(),
                timeout_ms: Some(0),
                headers: Default::default(),
            },
        });
        cfg.routes.push(RouteConfig {
            action: "other".into(),
            destination: memory(""),
        });
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "routes[1].destination.url",
                "routes[1].destination.timeoutMs",
                "routes[2].destination.queue"
            ]
        );
    }

    #[test]
    fn zero_limits_are_errors() {
        let mut cfg = valid();
        cfg.server.port = Some(0);
        cfg.dispatch.timeout_ms = Some(0);
        cfg.dispatch.queue_buffer = Some(0);
        assert_eq!(validate(&cfg).errors.len(), 3);
    }

    #[test]
    fn no_freshness_window_warns() {
        let mut cfg = valid();
        cfg.slack.max_clock_skew_secs = None;
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "slack.maxClockSkewSecs");
    }

    #[test]
    fn flagging_warnings() {
        let mut cfg = valid();
        cfg.flagging = Some(FlaggingConfig {
            source: Some("nowhere".into()),
            ..Default::default()
        });
        let report = validate(&apply_all_defaults(cfg));
        assert!(report.is_valid());
        let paths: Vec<_> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["flagging.source", "flagging.adminChannels"]);
    }

    #[test]
    fn flagging_cannot_feed_itself() {
        let mut cfg = valid();
        cfg.flagging = Some(FlaggingConfig {
            source: Some("flag-message".into()),
            outbound: Some(memory("flag-message")),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert_eq!(report.errors[0].path, "flagging.outbound.queue");
    }
}
