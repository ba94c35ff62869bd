// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription pattern grammar used by the event bus to match events
//! against consumer subscriptions.

use serde::{Deserialize, Serialize};

/// A subscription pattern over `:`-delimited event types.
///
/// Grammar:
/// - an exact string matches only that exact event type,
/// - a single wildcard segment `*` matches any one `:`-delimited segment
///   at that position,
/// - the literal `*` on its own matches every event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this pattern matches the given event type string.
    pub fn matches(&self, kind: &str) -> bool {
        if self.0 == "*" {
            return true;
        }
        let pattern_segs: Vec<&str> = self.0.split(':').collect();
        let kind_segs: Vec<&str> = kind.split(':').collect();
        if pattern_segs.len() != kind_segs.len() {
            return false;
        }
        pattern_segs
            .iter()
            .zip(kind_segs.iter())
            .all(|(p, k)| *p == "*" || p == k)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
