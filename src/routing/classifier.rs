//! Command classification.
//!
//! # Responsibilities
//! - Recognize the reserved admin namespace
//! - Decide whether a command must wait for the page to stabilize
//! - Derive the `execute_async` path used for the stabilization probe
//!
//! # Design Decisions
//! - Total functions: no path is malformed enough to fail
//! - The allow-list names every command that may observe rendered or
//!   asynchronous page state

use super::path::CommandPath;

/// First path segment of the admin namespace (`/stabilize_proxy/...`).
pub const ADMIN_MARKER: &str = "stabilize_proxy";

/// Command name the probe is sent as.
pub const PROBE_COMMAND: &str = "execute_async";

/// Commands that are preceded by a stabilization probe.
pub const STABILIZED_COMMANDS: &[&str] = &[
    "execute",
    "execute_async",
    "screenshot",
    "source",
    "title",
    "element",
    "elements",
    "keys",
    "moveto",
    "click",
    "buttondown",
    "buttonup",
    "doubleclick",
    "touch",
];

/// Index of the operative command name in a session path.
const COMMAND_SEGMENT: usize = 3;

/// True iff segment 1 is the admin marker.
pub fn is_admin_command(path: &str) -> bool {
    CommandPath::parse(path).segment(1) == ADMIN_MARKER
}

/// Admin sub-command name (segment 2). Empty when absent.
pub fn admin_subcommand(path: &str) -> &str {
    CommandPath::parse(path).segment(2)
}

/// Decide whether `path` needs a stabilization probe before forwarding.
pub fn requires_stabilization(path: &str, stabilization_enabled: bool) -> bool {
    if !stabilization_enabled {
        return false;
    }

    let path = CommandPath::parse(path);
    if path.segment(1) == ADMIN_MARKER {
        return false;
    }

    // No page to wait for until the session has a concrete command.
    if path.len() <= COMMAND_SEGMENT {
        return false;
    }

    STABILIZED_COMMANDS.contains(&path.segment(COMMAND_SEGMENT))
}

/// Replace segment 3 with `execute_async` and drop everything after it.
///
/// `/session/abc123/element/ELEM/click` becomes `/session/abc123/execute_async`.
pub fn derive_probe_path(original: &str) -> String {
    CommandPath::parse(original).join_prefix(COMMAND_SEGMENT, PROBE_COMMAND)
}
