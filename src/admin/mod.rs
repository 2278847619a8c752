//! Admin namespace (`/stabilize_proxy/{subcommand}`).
//!
//! Requests here configure the proxy itself and are never forwarded.

pub mod handlers;

pub use handlers::{handle_admin, AdminCommand};
