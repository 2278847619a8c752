//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler, stabilizer, admin handler produce:
//!     → logging.rs (structured log events, request IDs)
//!     → metrics.rs (request and probe counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted strings
//! - Request ID (x-request-id) appears on every request-scoped event
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
