//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults ← config file (TOML) ← command-line flags
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → runtime.rs seeds RuntimeConfig (backend address, enabled flag)
//!
//! Admin write:
//!     admin handler → RuntimeConfig::set_backend / set_stabilization_enabled
//!     → next request's snapshot observes the new values
//! ```
//!
//! # Design Decisions
//! - Startup config is immutable once loaded
//! - Only the two admin-writable values live in RuntimeConfig
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod runtime;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use runtime::{BackendAddress, ConfigSnapshot, RuntimeConfig};
pub use schema::{
    AdminConfig, BackendConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    StabilizationConfig, TimeoutConfig, WaitStrategy,
};
pub use validation::{parse_backend_address, validate_config, ValidationError};
