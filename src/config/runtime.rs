//! Runtime-mutable proxy settings.
//!
//! # Responsibilities
//! - Hold the backend address and the stabilization flag
//! - Hand out consistent per-request snapshots
//! - Accept last-write-wins updates from the admin namespace
//!
//! # Design Decisions
//! - Owned by the server and shared via Arc, never global
//! - Lock-free: ArcSwap for the address, AtomicBool for the flag
//! - The address is kept exactly as accepted; only forwarding uses the
//!   parsed URL
//! - In-flight exchanges keep the snapshot taken at dispatch

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

use crate::config::validation::{parse_backend_address, ValidationError};

/// A WebDriver base URL as it was configured, with its parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAddress {
    raw: String,
    url: Url,
}

impl BackendAddress {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            url: parse_backend_address(raw)?,
            raw: raw.to_string(),
        })
    }

    /// The address exactly as accepted.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Settings every forwarding decision reads.
#[derive(Debug)]
pub struct RuntimeConfig {
    backend: ArcSwap<BackendAddress>,
    stabilization_enabled: AtomicBool,
}

/// Point-in-time view of [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub backend: Arc<BackendAddress>,
    pub stabilization_enabled: bool,
}

impl RuntimeConfig {
    pub fn new(backend: BackendAddress, stabilization_enabled: bool) -> Self {
        Self {
            backend: ArcSwap::from_pointee(backend),
            stabilization_enabled: AtomicBool::new(stabilization_enabled),
        }
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            backend: self.backend.load_full(),
            stabilization_enabled: self.stabilization_enabled(),
        }
    }

    pub fn backend(&self) -> Arc<BackendAddress> {
        self.backend.load_full()
    }

    pub fn set_backend(&self, backend: BackendAddress) {
        self.backend.store(Arc::new(backend));
    }

    pub fn stabilization_enabled(&self) -> bool {
        self.stabilization_enabled.load(Ordering::Acquire)
    }

    pub fn set_stabilization_enabled(&self, enabled: bool) {
        self.stabilization_enabled.store(enabled, Ordering::Release);
    }
}
