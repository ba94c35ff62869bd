// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk shapes: one file per tier, plus an aggregated index.

use devloop_core::{Finding, Severity, Tier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The persisted contents of one `<tier>.json` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierFile {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub last_updated: u64,
    pub count: usize,
    pub findings: Vec<Finding>,
}

fn schema_version() -> u32 {
    1
}

impl TierFile {
    pub fn new(last_updated: u64, mut findings: Vec<Finding>) -> Self {
        // Sort order within a tier: relevance_score descending, then
        // timestamp descending.
        findings.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        Self {
            schema_version: schema_version(),
            last_updated,
            count: findings.len(),
            findings,
        }
    }
}

/// Full per-tier summary, used for `check_now` (the only tier whose
/// index entry carries severity/file breakdown, not just a headline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSummary {
    pub count: usize,
    pub severity_breakdown: BTreeMap<Severity, usize>,
    pub files: BTreeSet<String>,
    pub preview: String,
}

/// Brief per-tier summary used for the three tiers that don't warrant a
/// full breakdown in the index (`mention_if_relevant`, `deferred`,
/// `auto_fixed`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefSummary {
    pub count: usize,
    pub summary: String,
}

/// Aggregated summary derived from the four tier files; consumers read
/// this first to decide whether a tier file is worth opening.
///
/// Field names follow the stable on-disk contract: `check_now` maps to
/// `Tier::Immediate`, `mention_if_relevant` to `Tier::Relevant`,
/// `deferred` to `Tier::Background`, `auto_fixed` to `Tier::AutoFixed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub last_updated: u64,
    pub check_now: TierSummary,
    pub mention_if_relevant: BriefSummary,
    pub deferred: BriefSummary,
    pub auto_fixed: BriefSummary,
}

impl Index {
    pub fn from_tiers(last_updated: u64, tiers: &BTreeMap<Tier, Vec<Finding>>) -> Self {
        let empty = Vec::new();
        let findings_for = |tier: Tier| tiers.get(&tier).unwrap_or(&empty);

        Self {
            schema_version: schema_version(),
            last_updated,
            check_now: full_summary(findings_for(Tier::Immediate)),
            mention_if_relevant: brief_summary(findings_for(Tier::Relevant)),
            deferred: brief_summary(findings_for(Tier::Background)),
            auto_fixed: brief_summary(findings_for(Tier::AutoFixed)),
        }
    }
}

fn full_summary(findings: &[Finding]) -> TierSummary {
    let mut severity_breakdown: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut files = BTreeSet::new();
    for finding in findings {
        *severity_breakdown.entry(finding.severity).or_insert(0) += 1;
        files.insert(finding.file.clone());
    }
    TierSummary {
        count: findings.len(),
        severity_breakdown,
        files,
        preview: preview_for(findings),
    }
}

fn brief_summary(findings: &[Finding]) -> BriefSummary {
    BriefSummary {
        count: findings.len(),
        summary: preview_for(findings),
    }
}

fn preview_for(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "no findings".to_string();
    }
    let head = &findings[0];
    if findings.len() == 1 {
        format!("{}: {}", head.file, head.message)
    } else {
        format!(
            "{}: {} (+{} more)",
            head.file,
            head.message,
            findings.len() - 1
        )
    }
}

// `Severity` needs to be a map key in `severity_breakdown`; devloop-core
// derives Ord for it so BTreeMap<Severity, _> works directly.

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn finding(file: &str, score: f64, ts: u64) -> Finding {
        Finding {
            schema_version: 1,
            id: format!("{file}-{ts}"),
            agent: "linter".into(),
            timestamp: ts,
            file: file.into(),
            line: None,
            column: None,
            severity: Severity::Warning,
            blocking: false,
            category: "lint".into(),
            message: "issue".into(),
            detail: None,
            suggestion: None,
            auto_fixable: false,
            relevance_score: score,
            tier: Tier::Relevant,
            context: Map::new(),
        }
    }

    #[test]
    fn tier_file_sorts_by_score_desc_then_timestamp_desc() {
        let findings = vec![finding("a.rs", 0.3, 10), finding("b.rs", 0.8, 5), finding("c.rs", 0.8, 20)];
        let tier_file = TierFile::new(100, findings);
        assert_eq!(tier_file.findings[0].file, "c.rs");
        assert_eq!(tier_file.findings[1].file, "b.rs");
        assert_eq!(tier_file.findings[2].file, "a.rs");
        assert_eq!(tier_file.count, 3);
    }

    #[test]
    fn index_aggregates_counts_and_files() {
        let mut tiers = Map::new();
        tiers.insert(Tier::Relevant, vec![finding("a.rs", 0.5, 1), finding("b.rs", 0.4, 2)]);
        let index = Index::from_tiers(100, &tiers);
        assert_eq!(index.mention_if_relevant.count, 2);
        assert_eq!(index.check_now.count, 0);
    }

    #[test]
    fn index_gives_check_now_a_full_breakdown() {
        let mut tiers = Map::new();
        tiers.insert(
            Tier::Immediate,
            vec![{
                let mut f = finding("a.rs", 0.9, 1);
                f.severity = Severity::Error;
                f.tier = Tier::Immediate;
                f
            }],
        );
        let index = Index::from_tiers(100, &tiers);
        assert_eq!(index.check_now.count, 1);
        assert_eq!(index.check_now.severity_breakdown[&Severity::Error], 1);
        assert_eq!(index.check_now.files.len(), 1);
    }
}
