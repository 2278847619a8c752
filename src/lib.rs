//! WebDriver stabilization proxy library.
//!
//! Forwards JSON wire protocol commands to a WebDriver server, first
//! waiting for the page to finish pending asynchronous work before any
//! command that may observe rendered state.

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod stabilize;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
