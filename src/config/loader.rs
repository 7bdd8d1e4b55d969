//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then process
/// environment overrides. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Unset and empty variables leave the current value in place.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("BIND_ADDRESS") {
        config.listener.bind_address = v.trim().to_string();
    }
    if let Some(v) = get("REDIS_NODES") {
        config.cache.nodes = split_list(&v);
    }
    // An explicitly empty password clears one set in the file.
    if let Some(v) = lookup("REDIS_PASSWORD") {
        config.cache.password = Some(v).filter(|p| !p.is_empty());
    }
    if let Some(v) = get("KAFKA_BROKERS") {
        config.messaging.brokers = split_list(&v);
    }
    if let Some(v) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.observability.otlp_endpoint = v.trim().to_string();
    }
    if let Some(v) = get("OTEL_SERVICE_NAME") {
        config.service.name = v.trim().to_string();
    }
    if let Some(v) = get("ENVIRONMENT") {
        config.service.environment = v.trim().to_string();
    }
    if let Some(v) = get("LOG_LEVEL") {
        config.observability.log_level = v.trim().to_lowercase();
    }
    if let Some(v) = get("LOG_FORMAT") {
        config.observability.log_format = v.parse().map_err(|_| ConfigError::Env {
            var: "LOG_FORMAT",
            value: v.clone(),
        })?;
    }
    if let Some(v) = get("TRACING_ENABLED") {
        config.observability.tracing_enabled = parse_bool(&v).ok_or(ConfigError::Env {
            var: "TRACING_ENABLED",
            value: v.clone(),
        })?;
    }
    if let Some(v) = get("WORKERS") {
        let count = v.trim().parse::<usize>().map_err(|_| ConfigError::Env {
            var: "WORKERS",
            value: v.clone(),
        })?;
        config.workers = Some(count);
    }

    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config.cache.nodes.len(), 3);
        assert_eq!(config.messaging.default_topic, "nginx-test-events");
        assert_eq!(config.workers, None);
    }

    #[test]
    fn lists_are_split_and_trimmed() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("REDIS_NODES", "10.0.0.1:7000, 10.0.0.2:7001,,"),
                ("KAFKA_BROKERS", "broker:9092"),
            ]),
        )
        .unwrap();
        assert_eq!(config.cache.nodes, vec!["10.0.0.1:7000", "10.0.0.2:7001"]);
        assert_eq!(config.messaging.brokers, vec!["broker:9092"]);
    }

    #[test]
    fn scalar_overrides_apply() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("OTEL_SERVICE_NAME", "was-7-canary"),
                ("ENVIRONMENT", "staging"),
                ("LOG_LEVEL", "DEBUG"),
                ("LOG_FORMAT", "pretty"),
                ("WORKERS", "4"),
                ("REDIS_PASSWORD", "secret"),
                ("TRACING_ENABLED", "false"),
            ]),
        )
        .unwrap();
        assert_eq!(config.service.name, "was-7-canary");
        assert_eq!(config.service.environment, "staging");
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert_eq!(config.worker_count(), 4);
        assert_eq!(config.cache.password(), Some("secret"));
        assert!(!config.observability.tracing_enabled);
    }

    #[test]
    fn empty_password_means_none() {
        let mut config = AppConfig::default();
        config.cache.password = Some("from-file".into());
        apply_env_overrides(&mut config, env(&[("REDIS_PASSWORD", "")])).unwrap();
        assert_eq!(config.cache.password(), None);
    }

    #[test]
    fn bad_worker_count_is_an_error() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("WORKERS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "WORKERS", .. }));
    }

    #[test]
    fn toml_sections_are_optional() {
        let config: AppConfig = toml::from_str(
            r#"
            workers = 2

            [cache]
            nodes = ["localhost:7000"]
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.nodes, vec!["localhost:7000"]);
        assert_eq!(config.cache.default_ttl_secs, 3600);
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
        assert_eq!(config.worker_count(), 2);
    }
}
