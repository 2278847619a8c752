//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → handler.rs (classify, then one of:)
//!         admin namespace        → admin::handlers
//!         stabilized command     → stabilizer probe → upstream connector
//!         any other command      → upstream connector
//!     → upstream response streamed back unchanged
//! ```

pub mod handler;
pub mod server;

pub use handler::{proxy_handler, Dispatch};
pub use server::{AppState, HttpServer};
