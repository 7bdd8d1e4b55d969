//! Configuration validation.
//!
//! Serde handles syntax; this module checks the merged configuration for
//! values the service cannot start with. All problems are collected and
//! returned together.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),
    #[error("{section} must list at least one host:port entry")]
    EmptyNodeList { section: &'static str },
    #[error("{section} entry '{entry}' is not host:port")]
    NodeAddress { section: &'static str, entry: String },
    #[error("observability.otlp_endpoint '{0}' is not an absolute URL")]
    OtlpEndpoint(String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    check_nodes("cache.nodes", &config.cache.nodes, &mut errors);
    check_nodes("messaging.brokers", &config.messaging.brokers, &mut errors);

    if config.observability.tracing_enabled {
        let endpoint = &config.observability.otlp_endpoint;
        if url::Url::parse(endpoint).map(|u| u.cannot_be_a_base()).unwrap_or(true) {
            errors.push(ValidationError::OtlpEndpoint(endpoint.clone()));
        }
    }

    let positives = [
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("listener.graceful_timeout_secs", config.listener.graceful_timeout_secs),
        ("listener.max_body_bytes", config.listener.max_body_bytes as u64),
        ("cache.default_ttl_secs", config.cache.default_ttl_secs),
        ("messaging.metadata_timeout_secs", config.messaging.metadata_timeout_secs),
    ];
    for (field, value) in positives {
        if value == 0 {
            errors.push(ValidationError::NotPositive(field));
        }
    }
    if config.workers == Some(0) {
        errors.push(ValidationError::NotPositive("workers"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_nodes(section: &'static str, nodes: &[String], errors: &mut Vec<ValidationError>) {
    if nodes.is_empty() {
        errors.push(ValidationError::EmptyNodeList { section });
        return;
    }
    for entry in nodes {
        let valid = entry
            .rsplit_once(':')
            .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::NodeAddress {
                section,
                entry: entry.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.cache.nodes = vec!["redis-1".into()];
        config.messaging.brokers.clear();
        config.cache.default_ttl_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::NodeAddress {
            section: "cache.nodes",
            entry: "redis-1".into(),
        }));
        assert!(errors.contains(&ValidationError::EmptyNodeList {
            section: "messaging.brokers"
        }));
        assert!(errors.contains(&ValidationError::NotPositive("cache.default_ttl_secs")));
    }

    #[test]
    fn otlp_endpoint_only_checked_when_tracing_enabled() {
        let mut config = AppConfig::default();
        config.observability.otlp_endpoint = "jaeger".into();
        assert!(validate_config(&config).is_err());

        config.observability.tracing_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let mut config = AppConfig::default();
        config.workers = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NotPositive("workers")]);
    }
}
