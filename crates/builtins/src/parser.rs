// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure stdout/stderr parsers for each built-in agent's underlying tool.
//! Kept I/O-free so every parsing rule is independently unit-testable.

use crate::diagnostic::RawDiagnostic;
use devloop_core::Severity;
use devloop_runner::CommandOutput;
use regex::Regex;
use std::sync::LazyLock;

// Regex patterns below are constant literals checked at write time; `.expect`
// here can never panic at runtime.
#[allow(clippy::expect_used)]
static LINT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>[^:\n]+):(?P<line>\d+):(?P<col>\d+):\s+(?P<code>[A-Z]+\d+)\s+(?P<message>.+)$")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static TYPECHECK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>[^:\n]+):(?P<line>\d+):(?:\d+:)?\s*(?P<level>error|warning|note):\s*(?P<message>[^\[]+?)\s*(?:\[(?P<code>[\w-]+)\])?$",
    )
    .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static TEST_FAILURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^FAILED\s+(?P<test>\S+)(?:\s*-\s*(?P<message>.+))?$")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static SECURITY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>[^:\n]+):(?P<line>\d+):\s*\[(?P<level>\w+)\]\s*(?P<rule>[\w.-]+):\s*(?P<message>.+)$")
        .expect("constant regex pattern is valid")
});

/// Parses a lint tool's compact `file:line:col: CODE message` output.
pub fn parse_lint_output(output: &CommandOutput, autofix_advertised: bool) -> Vec<RawDiagnostic> {
    let text = output.stdout_lossy();
    text.lines()
        .filter_map(|line| LINT_LINE.captures(line))
        .map(|caps| RawDiagnostic {
            file: caps["file"].to_string(),
            line: caps["line"].parse().ok(),
            column: caps["col"].parse().ok(),
            severity: Severity::Warning,
            category: format!("lint_{}", &caps["code"]),
            message: caps["message"].trim().to_string(),
            auto_fixable: autofix_advertised,
        })
        .collect()
}

/// Parses a `prettier --check`-style list of out-of-format file paths, one
/// per line, with no line/column information.
pub fn parse_formatter_output(output: &CommandOutput) -> Vec<RawDiagnostic> {
    output
        .stdout_lossy()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|file| RawDiagnostic {
            file: file.to_string(),
            line: None,
            column: None,
            severity: Severity::Info,
            category: "formatting".to_string(),
            message: "file is not formatted".to_string(),
            auto_fixable: true,
        })
        .collect()
}

/// Parses a `mypy`-style `file:line: level: message [code]` stream.
pub fn parse_type_check_output(output: &CommandOutput) -> Vec<RawDiagnostic> {
    let text = output.stdout_lossy();
    text.lines()
        .filter_map(|line| TYPECHECK_LINE.captures(line))
        .map(|caps| {
            let severity = match &caps["level"] {
                "error" => Severity::Error,
                "warning" => Severity::Warning,
                _ => Severity::Info,
            };
            let code = caps.name("code").map(|m| m.as_str()).unwrap_or("type_error");
            RawDiagnostic {
                file: caps["file"].to_string(),
                line: caps["line"].parse().ok(),
                column: None,
                severity,
                category: format!("type_{code}"),
                message: caps["message"].trim().to_string(),
                auto_fixable: false,
            }
        })
        .collect()
}

/// Parses `FAILED <test> - <message>` lines from a test runner's output.
/// Failing tests always block; they carry no file/line since the failure
/// is identified by test name rather than source position.
pub fn parse_test_runner_output(output: &CommandOutput, file: &str) -> Vec<RawDiagnostic> {
    let text = output.stdout_lossy();
    text.lines()
        .filter_map(|line| TEST_FAILURE_LINE.captures(line))
        .map(|caps| {
            let test = caps["test"].to_string();
            let message = caps
                .name("message")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| "test failed".to_string());
            RawDiagnostic {
                file: file.to_string(),
                line: None,
                column: None,
                severity: Severity::Error,
                category: format!("test_failure_{test}"),
                message: format!("{test}: {message}"),
                auto_fixable: false,
            }
        })
        .collect()
}

/// Parses a `semgrep`/`bandit`-style `file:line: [LEVEL] rule: message`
/// stream. Severity maps `critical`/`high` to error, `medium` to warning,
/// everything else to info.
pub fn parse_security_output(output: &CommandOutput) -> Vec<RawDiagnostic> {
    let text = output.stdout_lossy();
    text.lines()
        .filter_map(|line| SECURITY_LINE.captures(line))
        .map(|caps| {
            let severity = match caps["level"].to_ascii_lowercase().as_str() {
                "critical" | "high" => Severity::Error,
                "medium" => Severity::Warning,
                _ => Severity::Info,
            };
            RawDiagnostic {
                file: caps["file"].to_string(),
                line: caps["line"].parse().ok(),
                column: None,
                severity,
                category: format!("security_{}", &caps["rule"]),
                message: caps["message"].trim().to_string(),
                auto_fixable: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str) -> CommandOutput {
        CommandOutput {
            status_code: Some(1),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration: std::time::Duration::from_millis(1),
        }
    }

    #[test]
    fn parses_lint_lines() {
        let out = output("src/lib.rs:10:5: F401 'os' imported but unused\n");
        let diags = parse_lint_output(&out, true);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].file, "src/lib.rs");
        assert_eq!(diags[0].line, Some(10));
        assert_eq!(diags[0].category, "lint_F401");
        assert!(diags[0].auto_fixable);
    }

    #[test]
    fn ignores_unmatched_lint_lines() {
        let out = output("Found 1 issue\nsrc/lib.rs:10:5: F401 unused import\n");
        assert_eq!(parse_lint_output(&out, false).len(), 1);
    }

    #[test]
    fn parses_formatter_file_list() {
        let out = output("src/a.rs\nsrc/b.rs\n");
        let diags = parse_formatter_output(&out);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.auto_fixable));
        assert!(diags.iter().all(|d| d.line.is_none()));
    }

    #[test]
    fn parses_type_check_error_and_note() {
        let out = output(
            "src/main.py:12: error: Incompatible types [assignment]\nsrc/main.py:14: note: see here\n",
        );
        let diags = parse_type_check_output(&out);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].category, "type_assignment");
        assert_eq!(diags[1].severity, Severity::Info);
    }

    #[test]
    fn parses_test_failures() {
        let out = output("FAILED tests/test_foo.py::test_bar - AssertionError: boom\n");
        let diags = parse_test_runner_output(&out, "tests/test_foo.py");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert!(diags[0].message.contains("AssertionError"));
    }

    #[test]
    fn parses_security_findings_with_severity_mapping() {
        let out = output(
            "app.py:5: [HIGH] hardcoded-secret: Possible hardcoded password\napp.py:9: [LOW] weak-hash: md5 is weak\n",
        );
        let diags = parse_security_output(&out);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[1].severity, Severity::Info);
    }
}
