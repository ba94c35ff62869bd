// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier assignment and relevance scoring, kept free of I/O so the policy
//! itself is exhaustively unit-testable.

use devloop_core::{Finding, Severity, Tier};

/// More than this many findings for the same `(agent, file, category)`
/// triple already on file triggers the anti-spam clamp.
const ANTI_SPAM_THRESHOLD: usize = 5;
const RECENTLY_TOUCHED_WINDOW_MS: u64 = 10 * 60 * 1000;

/// Deterministic tier assignment, applied in order; the first matching
/// rule wins.
pub fn assign_tier(finding: &Finding) -> Tier {
    if finding.auto_fixable && finding.fix_applied() {
        return Tier::AutoFixed;
    }
    if finding.severity == Severity::Error || finding.blocking {
        return Tier::Immediate;
    }
    if matches!(finding.severity, Severity::Warning | Severity::Info) {
        return Tier::Relevant;
    }
    Tier::Background
}

/// Computes the [0, 1] relevance score for `finding`.
///
/// `recently_touched` should be `true` if the finding's file had a
/// `file:*` event within the last 10 minutes. `same_triple_count` is the
/// number of other findings already on file for the same
/// `(agent, file, category)` triple, prior to this one being added.
pub fn relevance_score(finding: &Finding, recently_touched: bool, same_triple_count: usize) -> f64 {
    let mut score = finding.severity.base_score();
    if finding.blocking {
        score += 0.15;
    }
    if recently_touched {
        score += 0.10;
    }
    if !finding.auto_fixable {
        score += 0.05;
    }
    if same_triple_count >= ANTI_SPAM_THRESHOLD {
        score -= 0.10;
    }
    score.clamp(0.0, 1.0)
}

/// Whether `file` was touched within the recency window as of `now_ms`.
pub fn is_recently_touched(last_touch_ms: Option<u64>, now_ms: u64) -> bool {
    match last_touch_ms {
        Some(touched) => now_ms.saturating_sub(touched) <= RECENTLY_TOUCHED_WINDOW_MS,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn finding(severity: Severity, blocking: bool, auto_fixable: bool) -> Finding {
        Finding {
            schema_version: 1,
            id: "f1".into(),
            agent: "linter".into(),
            timestamp: 0,
            file: "src/lib.rs".into(),
            line: None,
            column: None,
            severity,
            blocking,
            category: "lint".into(),
            message: "msg".into(),
            detail: None,
            suggestion: None,
            auto_fixable,
            relevance_score: 0.0,
            tier: Tier::Background,
            context: BTreeMap::new(),
        }
    }

    #[test]
    fn auto_fixed_wins_when_applied() {
        let mut f = finding(Severity::Warning, false, true);
        f.context.insert("fix_applied".into(), serde_json::json!(true));
        assert_eq!(assign_tier(&f), Tier::AutoFixed);
    }

    #[test]
    fn auto_fixable_without_applied_flag_is_not_auto_fixed() {
        let f = finding(Severity::Warning, false, true);
        assert_eq!(assign_tier(&f), Tier::Relevant);
    }

    #[test]
    fn error_severity_is_immediate() {
        let f = finding(Severity::Error, false, false);
        assert_eq!(assign_tier(&f), Tier::Immediate);
    }

    #[test]
    fn blocking_non_error_is_immediate() {
        let f = finding(Severity::Info, true, false);
        assert_eq!(assign_tier(&f), Tier::Immediate);
    }

    #[test]
    fn warning_and_info_are_relevant() {
        assert_eq!(assign_tier(&finding(Severity::Warning, false, false)), Tier::Relevant);
        assert_eq!(assign_tier(&finding(Severity::Info, false, false)), Tier::Relevant);
    }

    #[test]
    fn hint_is_background() {
        assert_eq!(assign_tier(&finding(Severity::Hint, false, false)), Tier::Background);
    }

    #[test]
    fn score_combines_bonuses_and_clamps() {
        let f = finding(Severity::Error, true, false);
        let score = relevance_score(&f, true, 0);
        assert_eq!(score, 1.0); // 0.8 + 0.15 + 0.10 + 0.05 clamped to 1.0
    }

    #[test]
    fn anti_spam_clamp_reduces_score() {
        let f = finding(Severity::Warning, false, true);
        let without_spam = relevance_score(&f, false, 0);
        let with_spam = relevance_score(&f, false, 6);
        assert!(with_spam < without_spam);
    }

    #[test]
    fn sixth_finding_in_a_triple_is_clamped() {
        // same_triple_count excludes the finding being scored, so the 6th
        // finding for a triple is scored with same_triple_count == 5.
        let f = finding(Severity::Warning, false, true);
        let fifth = relevance_score(&f, false, 4);
        let sixth = relevance_score(&f, false, 5);
        assert_eq!(fifth - sixth, 0.10);
    }

    #[test]
    fn recently_touched_within_window() {
        assert!(is_recently_touched(Some(1_000), 1_000 + 5 * 60 * 1000));
        assert!(!is_recently_touched(Some(1_000), 1_000 + 11 * 60 * 1000));
        assert!(!is_recently_touched(None, 1_000));
    }
}
