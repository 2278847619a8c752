//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the stability proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream WebDriver server.
    pub backend: BackendConfig,

    /// Stabilization probe settings.
    pub stabilization: StabilizationConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Admin namespace settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8111").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8111".to_string(),
        }
    }
}

/// Upstream WebDriver server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the WebDriver server, including its base path.
    pub selenium_address: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            selenium_address: "http://localhost:4444/wd/hub".to_string(),
        }
    }
}

/// Which applications on the page the readiness check waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitStrategy {
    /// The single application rooted at `root_selector`.
    #[default]
    Root,
    /// Every application registered on the page.
    All,
}

/// Stabilization probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// Initial value of the runtime enabled flag.
    pub enabled: bool,

    pub strategy: WaitStrategy,

    /// CSS selector of the element hosting the application.
    pub root_selector: String,

    /// Replaces the built-in readiness check when set.
    pub script: Option<String>,

    /// Upper bound on a probe response body.
    pub max_response_bytes: usize,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: WaitStrategy::Root,
            root_selector: "body".to_string(),
            script: None,
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration. Zero disables a timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole probe exchange, including reading its response.
    pub probe_secs: u64,

    /// Wait for response headers of a forwarded command.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe_secs: 30,
            upstream_secs: 300,
        }
    }
}

impl TimeoutConfig {
    pub fn probe(&self) -> Option<Duration> {
        non_zero_secs(self.probe_secs)
    }

    pub fn upstream(&self) -> Option<Duration> {
        non_zero_secs(self.upstream_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Admin namespace configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Upper bound on an admin request body.
    pub max_body_bytes: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "stability_proxy=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9111".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8111");
        assert_eq!(config.backend.selenium_address, "http://localhost:4444/wd/hub");
        assert!(config.stabilization.enabled);
        assert_eq!(config.stabilization.strategy, WaitStrategy::Root);
        assert_eq!(config.timeouts.probe(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [stabilization]
            enabled = false
            strategy = "all"

            [timeouts]
            upstream_secs = 0
            "#,
        )
        .unwrap();
        assert!(!config.stabilization.enabled);
        assert_eq!(config.stabilization.strategy, WaitStrategy::All);
        assert_eq!(config.stabilization.root_selector, "body");
        assert_eq!(config.timeouts.upstream(), None);
        assert_eq!(config.timeouts.probe_secs, 30);
    }
}
