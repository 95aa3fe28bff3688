//! Contract events
//!
//! Mutating operations return their events alongside the result: an
//! explicit append-only log per invocation, not an ambient stream. Callers
//! read them off the receipt (e.g. to learn a freshly assigned slot).

use serde::{Deserialize, Serialize};

/// A single emitted event: a name plus a JSON-encoded argument string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_name: String,
    pub event_arg: String,
}

impl Event {
    /// Build an event from a name and a JSON value argument.
    pub fn new(name: &str, arg: serde_json::Value) -> Self {
        Self {
            event_name: name.to_string(),
            event_arg: arg.to_string(),
        }
    }

    /// Parse the argument back into JSON.
    pub fn arg_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.event_arg).ok()
    }
}
