//! Identity: the opaque key of one client session

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Session token a transport hands back on every request.
///
/// Freshly issued tokens are random v4 UUID strings, but any string a client
/// sends back is accepted as-is apart from surrounding whitespace. On the wire
/// it is a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Issue a token for a new session
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a token sent back by a client. Whitespace picked up from
    /// copy/paste or form fields is trimmed so it keys the same session.
    pub fn from_string(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.trim() {
            trimmed if trimmed.len() == id.len() => Self(id),
            trimmed => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}
