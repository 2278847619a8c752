//! Stabilization subsystem.
//!
//! # Data Flow
//! ```text
//! Command that needs a stable page
//!     → coordinator.rs (derive probe path, POST execute_async)
//!     → script.rs (readiness-check payload)
//!     → upstream connector
//!     → coordinator.rs (read bounded body, interpret `value`)
//!     → Return: StabilizationOutcome::{Stable, Failed}
//! ```
//!
//! # Design Decisions
//! - One probe per qualifying command; no "already stable" cache
//! - Fails closed: anything but a falsy `value` blocks the command
//! - Probe response bodies are small JSON and read fully, with a cap

pub mod coordinator;
pub mod script;

pub use coordinator::{interpret_probe_response, ProbeFailure, StabilizationOutcome, Stabilizer};
pub use script::{readiness_script, ProbePayload};
