// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collector configuration: root path, include/ignore globs, debounce interval.

use crate::error::CollectorError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Directories ignored by default regardless of project-supplied globs.
pub const DEFAULT_IGNORE_GLOBS: &[&str] = &[
    "**/.git/**",
    "**/.hg/**",
    "**/.svn/**",
    "**/.devloop/**",
    "**/node_modules/**",
    "**/target/**",
    "**/.venv/**",
    "**/venv/**",
    "**/__pycache__/**",
    "**/.mypy_cache/**",
    "**/.pytest_cache/**",
    "**/.tox/**",
    "**/dist/**",
    "**/build/**",
    "**/.idea/**",
    "**/.vscode/**",
];

pub const MIN_DEBOUNCE_MS: u64 = 100;
pub const MAX_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Validated configuration for one [`crate::FilesystemCollector`] instance.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub root: PathBuf,
    ignore: GlobSet,
    include: Option<GlobSet>,
    pub debounce_ms: u64,
}

impl CollectorConfig {
    /// Builds a config with the default ignore set and debounce interval.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CollectorError> {
        Self::builder(root).build()
    }

    pub fn builder(root: impl Into<PathBuf>) -> CollectorConfigBuilder {
        CollectorConfigBuilder {
            root: root.into(),
            extra_ignore_globs: Vec::new(),
            include_globs: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore.is_match(path) {
            return true;
        }
        if let Some(include) = &self.include {
            return !include.is_match(path);
        }
        false
    }
}

/// Builder enforcing validation at construction time, not at first use.
pub struct CollectorConfigBuilder {
    root: PathBuf,
    extra_ignore_globs: Vec<String>,
    include_globs: Option<Vec<String>>,
    debounce_ms: u64,
}

impl CollectorConfigBuilder {
    pub fn ignore_glob(mut self, glob: impl Into<String>) -> Self {
        self.extra_ignore_globs.push(glob.into());
        self
    }

    pub fn include_globs(mut self, globs: Vec<String>) -> Self {
        self.include_globs = Some(globs);
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn build(self) -> Result<CollectorConfig, CollectorError> {
        if !self.root.is_dir() {
            return Err(CollectorError::InvalidRoot(self.root));
        }
        if !(MIN_DEBOUNCE_MS..=MAX_DEBOUNCE_MS).contains(&self.debounce_ms) {
            return Err(CollectorError::InvalidDebounce {
                actual: self.debounce_ms,
                min: MIN_DEBOUNCE_MS,
                max: MAX_DEBOUNCE_MS,
            });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in DEFAULT_IGNORE_GLOBS {
            builder.add(compile(pattern)?);
        }
        for pattern in &self.extra_ignore_globs {
            builder.add(compile(pattern)?);
        }
        let ignore = builder.build().map_err(|source| CollectorError::InvalidGlob {
            pattern: "<ignore set>".into(),
            source,
        })?;

        let include = match self.include_globs {
            Some(patterns) => {
                let mut b = GlobSetBuilder::new();
                for pattern in &patterns {
                    b.add(compile(pattern)?);
                }
                Some(b.build().map_err(|source| CollectorError::InvalidGlob {
                    pattern: "<include set>".into(),
                    source,
                })?)
            }
            None => None,
        };

        let root = self
            .root
            .canonicalize()
            .map_err(|_| CollectorError::InvalidRoot(self.root.clone()))?;

        Ok(CollectorConfig {
            root,
            ignore,
            include,
            debounce_ms: self.debounce_ms,
        })
    }
}

fn compile(pattern: &str) -> Result<Glob, CollectorError> {
    Glob::new(pattern).map_err(|source| CollectorError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonexistent_root() {
        let err = CollectorConfig::new("/nonexistent/path/xyz");
        assert!(matches!(err, Err(CollectorError::InvalidRoot(_))));
    }

    #[test]
    fn rejects_debounce_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let err = CollectorConfig::builder(dir.path()).debounce_ms(50).build();
        assert!(matches!(err, Err(CollectorError::InvalidDebounce { .. })));
    }

    #[test]
    fn default_ignores_include_vcs_and_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CollectorConfig::new(dir.path()).unwrap();
        assert!(cfg.is_ignored(&dir.path().join(".git/HEAD")));
        assert!(cfg.is_ignored(&dir.path().join("node_modules/pkg/index.js")));
        assert!(cfg.is_ignored(&dir.path().join("target/debug/bin")));
        assert!(cfg.is_ignored(&dir.path().join(".devloop/state.json")));
        assert!(!cfg.is_ignored(&dir.path().join("src/main.rs")));
    }

    #[test]
    fn project_supplied_ignore_glob_is_additive() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CollectorConfig::builder(dir.path())
            .ignore_glob("**/*.log")
            .build()
            .unwrap();
        assert!(cfg.is_ignored(&dir.path().join("run.log")));
        assert!(!cfg.is_ignored(&dir.path().join("run.txt")));
    }

    #[test]
    fn include_globs_restrict_to_matching_paths() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CollectorConfig::builder(dir.path())
            .include_globs(vec!["**/*.rs".into()])
            .build()
            .unwrap();
        assert!(!cfg.is_ignored(&dir.path().join("src/main.rs")));
        assert!(cfg.is_ignored(&dir.path().join("README.md")));
    }
}
