//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses (socket addresses, backend URL shape)
//! - Validate value ranges (byte bounds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    SocketAddress { field: &'static str, value: String },

    #[error("backend address '{value}': {reason}")]
    BackendAddress { value: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Parse a WebDriver base URL. Only absolute `http` URLs with a host are
/// accepted, since the upstream client speaks plain HTTP.
pub fn parse_backend_address(value: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::BackendAddress {
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(url)
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::SocketAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if let Err(e) = parse_backend_address(&config.backend.selenium_address) {
        errors.push(e);
    }

    if config.stabilization.max_response_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "stabilization.max_response_bytes",
        });
    }

    if config.admin.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "admin.max_body_bytes",
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::SocketAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "nope".into();
        config.backend.selenium_address = "https://grid:4444/wd/hub".into();
        config.admin.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[1], ValidationError::BackendAddress { .. }));
    }

    #[test]
    fn backend_address_shapes() {
        assert!(parse_backend_address("http://localhost:4444/wd/hub").is_ok());
        assert!(parse_backend_address("http://x:1/y").is_ok());
        assert!(parse_backend_address("localhost:4444").is_err());
        assert!(parse_backend_address("not a url").is_err());
        assert!(parse_backend_address("http://grid/wd/hub?x=1").is_err());
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
