// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Event` value type: an immutable record flowing from collectors and
//! agents through the bus.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An immutable event record.
///
/// Unlike a closed set of named variants, `Event` carries an open `type`
/// string and an arbitrary `payload` map, because the event namespace grows
/// as new collectors and agents are added (see the namespace list in the
/// schema) without requiring a core release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Reserved for forward-compatible payload changes.
    #[serde(default = "schema_version")]
    pub schema_version: u32,

    /// Event type, e.g. `file:save`, `git:pre-commit`, `agent:linter:completed`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Arbitrary key-value payload. Ordered for stable serialization.
    #[serde(default)]
    pub payload: BTreeMap<String, Value>,

    /// Label of the collector or agent that produced this event.
    pub source: String,

    /// Wall-clock timestamp, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

fn schema_version() -> u32 {
    1
}

impl Event {
    /// Builds a new event with an empty payload.
    pub fn new(kind: impl Into<String>, source: impl Into<String>, timestamp: u64) -> Self {
        Self {
            schema_version: schema_version(),
            kind: kind.into(),
            payload: BTreeMap::new(),
            source: source.into(),
            timestamp,
        }
    }

    /// Builder-style payload insertion.
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// The `:`-delimited segments of the event type, used by `Pattern` matching.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.kind.split(':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_payload() {
        let ev = Event::new("file:save", "fs-collector", 1_000).with_payload("path", "/a/b.rs");
        assert_eq!(ev.payload.get("path").unwrap(), "/a/b.rs");
    }

    #[test]
    fn segments_split_on_colon() {
        let ev = Event::new("agent:linter:completed", "linter", 0);
        let segs: Vec<&str> = ev.segments().collect();
        assert_eq!(segs, vec!["agent", "linter", "completed"]);
    }

    #[test]
    fn serde_roundtrip_preserves_fields() {
        let ev = Event::new("file:modified", "fs-collector", 42).with_payload("size", 128);
        let json = serde_json::to_string(&ev).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn missing_schema_version_defaults_to_one() {
        let json = r#"{"type":"file:save","source":"x","timestamp":1}"#;
        let ev: Event = serde_json::from_str(json).unwrap();
        assert_eq!(ev.schema_version, 1);
    }
}
