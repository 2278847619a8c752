//! Command classification subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path ("/session/{id}/{command}/...")
//!     → path.rs (split into ordered segments)
//!     → classifier.rs (admin? needs a stabilization probe? probe path)
//!     → Return: plain booleans / derived path, never an error
//! ```
//!
//! # Design Decisions
//! - Pure functions, no state; config values are passed in
//! - Segment indices follow a leading-slash split, so segment 0 is
//!   usually empty and segment 1 is `session` or the admin marker
//! - Malformed or short paths degrade to "not admin, no probe"

pub mod classifier;
pub mod path;

pub use classifier::{
    admin_subcommand, derive_probe_path, is_admin_command, requires_stabilization,
    ADMIN_MARKER, PROBE_COMMAND, STABILIZED_COMMANDS,
};
pub use path::CommandPath;
