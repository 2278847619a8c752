//! Request path decomposition.

use std::fmt;

/// The path of an inbound request, split on `/` into ordered segments.
///
/// Splitting keeps empty segments, so `/session/abc/title` becomes
/// `["", "session", "abc", "title"]`. Lookups past the end yield `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> CommandPath<'a> {
    /// Split a raw path. Any query string must already be stripped.
    pub fn parse(path: &'a str) -> Self {
        Self {
            segments: path.split('/').collect(),
        }
    }

    /// Segment at `index`, or the empty string when absent.
    pub fn segment(&self, index: usize) -> &'a str {
        self.segments.get(index).copied().unwrap_or("")
    }

    /// Number of segments, including a leading empty one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.is_empty())
    }

    /// Rejoin the first `count` segments (padding with empty ones) and
    /// append `tail`.
    pub fn join_prefix(&self, count: usize, tail: &str) -> String {
        let mut parts: Vec<&str> = (0..count).map(|i| self.segment(i)).collect();
        parts.push(tail);
        parts.join("/")
    }
}

impl fmt::Display for CommandPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
