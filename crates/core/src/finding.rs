// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Finding` entity and its `Severity`/`Tier` enumerations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Severity of a finding, as reported by the producing agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Base relevance contribution for this severity, per the scoring table.
    pub fn base_score(self) -> f64 {
        match self {
            Severity::Error => 0.8,
            Severity::Warning => 0.5,
            Severity::Info => 0.3,
            Severity::Hint => 0.15,
        }
    }
}

/// Tier a finding has been assigned to by the context store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Immediate,
    Relevant,
    Background,
    AutoFixed,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Immediate,
        Tier::Relevant,
        Tier::Background,
        Tier::AutoFixed,
    ];

    /// Filename (without directory) this tier is persisted under.
    pub fn file_name(self) -> &'static str {
        match self {
            Tier::Immediate => "immediate.json",
            Tier::Relevant => "relevant.json",
            Tier::Background => "background.json",
            Tier::AutoFixed => "auto_fixed.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum FindingError {
    #[error("finding id must not be empty")]
    EmptyId,
    #[error("finding agent must not be empty")]
    EmptyAgent,
    #[error("finding file must not be empty")]
    EmptyFile,
    #[error("relevance_score must be finite, got {0}")]
    NonFiniteScore(f64),
    #[error("relevance_score must be in [0, 1], got {0}")]
    ScoreOutOfRange(f64),
}

/// A single issue surfaced by an agent, en route to the context store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default = "schema_version")]
    pub schema_version: u32,

    pub id: String,
    pub agent: String,
    pub timestamp: u64,

    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    pub severity: Severity,
    pub blocking: bool,
    pub category: String,

    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    pub auto_fixable: bool,

    /// Assigned by the context store; `0.0` until scored.
    #[serde(default)]
    pub relevance_score: f64,
    /// Assigned by the context store; defaults to `background` until tiered.
    #[serde(default = "default_tier")]
    pub tier: Tier,

    #[serde(default)]
    pub context: BTreeMap<String, Value>,
}

fn schema_version() -> u32 {
    1
}

fn default_tier() -> Tier {
    Tier::Background
}

impl Finding {
    /// Validates invariants that must hold regardless of where a `Finding`
    /// came from (constructed fresh or deserialized from a tier file).
    pub fn validate(&self) -> Result<(), FindingError> {
        if self.id.trim().is_empty() {
            return Err(FindingError::EmptyId);
        }
        if self.agent.trim().is_empty() {
            return Err(FindingError::EmptyAgent);
        }
        if self.file.trim().is_empty() {
            return Err(FindingError::EmptyFile);
        }
        if !self.relevance_score.is_finite() {
            return Err(FindingError::NonFiniteScore(self.relevance_score));
        }
        if !(0.0..=1.0).contains(&self.relevance_score) {
            return Err(FindingError::ScoreOutOfRange(self.relevance_score));
        }
        Ok(())
    }

    /// `true` if the caller has recorded that an auto-fix was applied for
    /// this finding, via `context.fix_applied`.
    pub fn fix_applied(&self) -> bool {
        matches!(self.context.get("fix_applied"), Some(Value::Bool(true)))
    }

    /// The `(agent, file, line, category, id)` identity key used for
    /// deduplication by the context store.
    pub fn identity_key(&self) -> (String, String, Option<u32>, String, String) {
        (
            self.agent.clone(),
            self.file.clone(),
            self.line,
            self.category.clone(),
            self.id.clone(),
        )
    }
}
