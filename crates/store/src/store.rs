// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The context store: the single writer for tier files and the index.

use crate::atomic::write_atomic;
use crate::error::StoreError;
use crate::model::{Index, TierFile};
use crate::scoring::{assign_tier, is_recently_touched, relevance_score};
use devloop_bus::EventBus;
use devloop_core::{Clock, Finding, Tier};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default retention window for `cleanup_old_findings`.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

struct State {
    tiers: BTreeMap<Tier, Vec<Finding>>,
    /// Last-observed `file:*` timestamp per file path, for the "recently
    /// touched" scoring bonus.
    recent_touch: HashMap<String, u64>,
}

/// Single-writer, file-backed persistence for findings, tiered by
/// relevance and durability.
#[derive(Clone)]
pub struct ContextStore {
    dir: PathBuf,
    state: Arc<Mutex<State>>,
}

impl ContextStore {
    /// Loads existing tier files from `dir` (quarantining any that fail to
    /// parse) and subscribes to the bus for file-touch recency hints.
    pub fn load(dir: impl Into<PathBuf>, bus: &EventBus, clock: &impl Clock) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut tiers = BTreeMap::new();
        for tier in Tier::ALL {
            let path = dir.join(tier.file_name());
            let findings = match std::fs::read(&path) {
                Ok(bytes) => match serde_json::from_slice::<TierFile>(&bytes) {
                    Ok(parsed) => parsed.findings,
                    Err(source) => {
                        quarantine(&path, clock.epoch_ms());
                        tracing::warn!(tier = ?tier, path = %path.display(), error = %source, "quarantined corrupt tier file");
                        Vec::new()
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(source) => return Err(StoreError::Io { path, source }),
            };
            tiers.insert(tier, findings);
        }

        let store = Self {
            dir,
            state: Arc::new(Mutex::new(State {
                tiers,
                recent_touch: HashMap::new(),
            })),
        };
        store.track_file_touches(bus);
        Ok(store)
    }

    fn track_file_touches(&self, bus: &EventBus) {
        let (_id, queue) = bus.subscribe("file:*");
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            loop {
                let event = queue.recv().await;
                if let Some(path) = event.payload.get("path").and_then(|v| v.as_str()) {
                    state.lock().recent_touch.insert(path.to_string(), event.timestamp);
                }
            }
        });
    }

    /// Ingests a new or updated finding, assigning its tier and relevance
    /// score, then persists the affected tier and the index atomically.
    pub fn add_finding(&self, mut finding: Finding, now_ms: u64) -> Result<Finding, StoreError> {
        finding.validate()?;

        let affected_tier;
        {
            let mut state = self.state.lock();

            let key = finding.identity_key();
            let mut existing_first_seen = None;
            for (_tier, findings) in state.tiers.iter_mut() {
                if let Some(pos) = findings.iter().position(|f| f.identity_key() == key) {
                    let existing = findings.remove(pos);
                    existing_first_seen = existing
                        .context
                        .get("first_seen")
                        .and_then(|v| v.as_u64())
                        .or(Some(existing.timestamp));
                    break;
                }
            }
            if let Some(first_seen) = existing_first_seen {
                finding
                    .context
                    .insert("first_seen".into(), serde_json::json!(first_seen));
            } else {
                finding
                    .context
                    .entry("first_seen".into())
                    .or_insert_with(|| serde_json::json!(finding.timestamp));
            }

            let same_triple_count = state
                .tiers
                .values()
                .flatten()
                .filter(|f| {
                    f.agent == finding.agent && f.file == finding.file && f.category == finding.category
                })
                .count();

            let last_touch = state.recent_touch.get(&finding.file).copied();
            let recently_touched = is_recently_touched(last_touch, now_ms);

            finding.relevance_score = relevance_score(&finding, recently_touched, same_triple_count);
            finding.tier = assign_tier(&finding);
            affected_tier = finding.tier;

            state
                .tiers
                .entry(affected_tier)
                .or_default()
                .push(finding.clone());
        }

        self.persist_tier(affected_tier, now_ms)?;
        self.persist_index(now_ms)?;
        Ok(finding)
    }

    pub fn read_index(&self, now_ms: u64) -> Index {
        let state = self.state.lock();
        Index::from_tiers(now_ms, &state.tiers)
    }

    pub fn read_tier(&self, tier: Tier) -> Vec<Finding> {
        self.state
            .lock()
            .tiers
            .get(&tier)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes findings older than `max_age` (default 7 days) from all
    /// tiers and rewrites the affected tier files and the index.
    pub fn cleanup_old_findings(&self, max_age: Duration, now_ms: u64) -> Result<(), StoreError> {
        let max_age_ms = max_age.as_millis() as u64;
        let mut changed_tiers = Vec::new();
        {
            let mut state = self.state.lock();
            for (tier, findings) in state.tiers.iter_mut() {
                let before = findings.len();
                findings.retain(|f| now_ms.saturating_sub(f.timestamp) <= max_age_ms);
                if findings.len() != before {
                    changed_tiers.push(*tier);
                }
            }
        }
        for tier in changed_tiers {
            self.persist_tier(tier, now_ms)?;
        }
        self.persist_index(now_ms)?;
        Ok(())
    }

    fn persist_tier(&self, tier: Tier, now_ms: u64) -> Result<(), StoreError> {
        let findings = self.state.lock().tiers.get(&tier).cloned().unwrap_or_default();
        let tier_file = TierFile::new(now_ms, findings);
        let path = self.dir.join(tier.file_name());
        let bytes = serde_json::to_vec_pretty(&tier_file).map_err(|source| StoreError::Serialize { tier, source })?;
        write_atomic(&path, &bytes).map_err(|source| StoreError::Io { path, source })
    }

    fn persist_index(&self, now_ms: u64) -> Result<(), StoreError> {
        let index = {
            let state = self.state.lock();
            Index::from_tiers(now_ms, &state.tiers)
        };
        let path = self.dir.join("index.json");
        let bytes = serde_json::to_vec_pretty(&index).map_err(|source| StoreError::Serialize {
            tier: Tier::Background,
            source,
        })?;
        write_atomic(&path, &bytes).map_err(|source| StoreError::Io { path, source })
    }
}

fn quarantine(path: &Path, now_ms: u64) {
    if !path.exists() {
        return;
    }
    let quarantined = path.with_extension(format!(
        "{}.corrupt.{now_ms}",
        path.extension().and_then(|e| e.to_str()).unwrap_or("json")
    ));
    let _ = std::fs::rename(path, quarantined);
}

#[cfg(test)]
mod tests {
    use super::*;
    use devloop_core::Severity;
    use std::collections::BTreeMap as Map;

    fn finding(id: &str, file: &str, severity: Severity, ts: u64) -> Finding {
        Finding {
            schema_version: 1,
            id: id.into(),
            agent: "linter".into(),
            timestamp: ts,
            file: file.into(),
            line: Some(1),
            column: None,
            severity,
            blocking: false,
            category: "lint_F401".into(),
            message: "unused import".into(),
            detail: None,
            suggestion: None,
            auto_fixable: true,
            relevance_score: 0.0,
            tier: Tier::Background,
            context: Map::new(),
        }
    }

    #[tokio::test]
    async fn add_finding_assigns_tier_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new();
        let store = ContextStore::load(dir.path(), &bus, &devloop_core::SystemClock).unwrap();

        let stored = store
            .add_finding(finding("f1", "src/lib.rs", Severity::Error, 1000), 2000)
            .unwrap();
        assert_eq!(stored.tier, Tier::Immediate);
        assert!(dir.path().join("immediate.json").exists());
        assert!(dir.path().join("index.json").exists());
    }

    #[tokio::test]
    async fn duplicate_identity_key_updates_in_place_and_preserves_first_seen() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new();
        let store = ContextStore::load(dir.path(), &bus, &devloop_core::SystemClock).unwrap();

        store
            .add_finding(finding("f1", "src/lib.rs", Severity::Warning, 1000), 1000)
            .unwrap();
        let updated = store
            .add_finding(finding("f1", "src/lib.rs", Severity::Warning, 5000), 5000)
            .unwrap();

        assert_eq!(
            updated.context.get("first_seen").and_then(|v| v.as_u64()),
            Some(1000)
        );
        assert_eq!(store.read_tier(Tier::Relevant).len(), 1);
    }

    #[tokio::test]
    async fn moving_tiers_removes_from_old_tier() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new();
        let store = ContextStore::load(dir.path(), &bus, &devloop_core::SystemClock).unwrap();

        store
            .add_finding(finding("f1", "src/lib.rs", Severity::Warning, 1000), 1000)
            .unwrap();
        assert_eq!(store.read_tier(Tier::Relevant).len(), 1);

        let mut escalated = finding("f1", "src/lib.rs", Severity::Error, 1000);
        escalated.blocking = true;
        store.add_finding(escalated, 1000).unwrap();

        assert_eq!(store.read_tier(Tier::Relevant).len(), 0);
        assert_eq!(store.read_tier(Tier::Immediate).len(), 1);
    }

    #[tokio::test]
    async fn cleanup_removes_findings_past_retention() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new();
        let store = ContextStore::load(dir.path(), &bus, &devloop_core::SystemClock).unwrap();

        store
            .add_finding(finding("old", "a.rs", Severity::Info, 0), 0)
            .unwrap();
        store
            .cleanup_old_findings(Duration::from_secs(1), 10_000)
            .unwrap();

        assert_eq!(store.read_tier(Tier::Relevant).len(), 0);
    }

    #[tokio::test]
    async fn quarantines_corrupt_tier_file_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("immediate.json"), b"{ not json").unwrap();
        let bus = EventBus::new();
        let store = ContextStore::load(dir.path(), &bus, &devloop_core::SystemClock).unwrap();

        assert!(store.read_tier(Tier::Immediate).is_empty());
        let has_quarantine = std::fs::read_dir(dir.path())
            .unwrap()
            .any(|e| e.unwrap().file_name().to_string_lossy().contains(".corrupt."));
        assert!(has_quarantine);
    }
}
