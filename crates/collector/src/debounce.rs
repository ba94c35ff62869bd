// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coalesces bursts of `modified` notifications for the same path into a
//! single emitted event.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// The kind of raw filesystem change observed for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Created,
    Modified,
    Deleted,
}

struct Pending {
    kind: RawKind,
    due: Instant,
}

/// Debounces `modified` notifications; `created`/`deleted` pass through
/// immediately since they are not chatty the way successive writes are.
pub struct Debouncer {
    window: Duration,
    pending: HashMap<PathBuf, Pending>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// Records a raw change observed at `now`. Returns an event to emit
    /// immediately for non-`Modified` kinds; `Modified` is always deferred.
    pub fn record(&mut self, path: PathBuf, kind: RawKind, now: Instant) -> Option<(PathBuf, RawKind)> {
        match kind {
            RawKind::Modified => {
                self.pending.insert(
                    path,
                    Pending {
                        kind,
                        due: now + self.window,
                    },
                );
                None
            }
            RawKind::Created | RawKind::Deleted => {
                self.pending.remove(&path);
                Some((path, kind))
            }
        }
    }

    /// Returns the paths whose debounce window has elapsed as of `now`,
    /// removing them from the pending set.
    pub fn ready(&mut self, now: Instant) -> Vec<(PathBuf, RawKind)> {
        let due_paths: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due_paths
            .into_iter()
            .filter_map(|path| self.pending.remove(&path).map(|p| (path, p.kind)))
            .collect()
    }

    /// Soonest instant at which a pending entry will become ready, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.due).min()
    }
}
