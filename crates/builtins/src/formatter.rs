// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin adapter over a formatter (prettier, rustfmt, black, ...). Runs a
//! read-only check first; only invokes the write-mode command, through
//! [`CommandRunner`], when `fix` config is present.

use crate::adapter::{run_tool, submit_diagnostics, AdapterConfig};
use crate::error::BuiltinError;
use crate::parser::parse_formatter_output;
use async_trait::async_trait;
use devloop_agent::Agent;
use devloop_core::{AgentResult, Event, Pattern};
use devloop_runner::CommandRunner;
use devloop_store::ContextStore;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct FormatterConfig {
    pub name: String,
    /// Read-only invocation that reports drift without writing anything.
    pub check: AdapterConfig,
    /// Write-mode invocation; when present, drift is fixed in place and
    /// the resulting finding is recorded with `fix_applied = true`.
    pub fix: Option<AdapterConfig>,
    pub triggers: Vec<Pattern>,
}

pub struct FormatterAgent {
    name: String,
    triggers: Vec<Pattern>,
    check: AdapterConfig,
    fix: Option<AdapterConfig>,
    runner: CommandRunner,
    store: ContextStore,
}

impl FormatterAgent {
    pub fn new(config: FormatterConfig, runner: CommandRunner, store: ContextStore) -> Result<Self, BuiltinError> {
        config.check.validate(&config.name)?;
        if let Some(fix) = &config.fix {
            fix.validate(&config.name)?;
        }
        Ok(Self {
            name: config.name,
            triggers: config.triggers,
            check: config.check,
            fix: config.fix,
            runner,
            store,
        })
    }
}

#[async_trait]
impl Agent for FormatterAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn triggers(&self) -> &[Pattern] {
        &self.triggers
    }

    async fn handle(&self, event: Event) -> AgentResult {
        let started = Instant::now();
        let Some(file) = event.payload.get("path").and_then(|v| v.as_str()) else {
            return AgentResult::ok(&self.name, started.elapsed().as_secs_f64(), "no path in event, skipped");
        };

        let check_output = match run_tool(&self.runner, &self.name, &self.check, file).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(agent = %self.name, file, error = %err, "format check failed");
                return AgentResult::failed(&self.name, started.elapsed().as_secs_f64(), err.to_string());
            }
        };

        let diagnostics = parse_formatter_output(&check_output);
        if diagnostics.is_empty() {
            return AgentResult::ok(&self.name, started.elapsed().as_secs_f64(), format!("{file} already formatted"));
        }

        let mut fix_applied = false;
        if let Some(fix_config) = &self.fix {
            match run_tool(&self.runner, &self.name, fix_config, file).await {
                Ok(output) if output.success() => fix_applied = true,
                Ok(output) => {
                    tracing::warn!(agent = %self.name, file, "format fix exited non-zero, leaving as unfixed drift");
                    let _ = output;
                }
                Err(err) => {
                    tracing::warn!(agent = %self.name, file, error = %err, "format fix run failed");
                }
            }
        }

        let count = diagnostics.len();
        match submit_diagnostics(&self.store, &self.name, &self.name, diagnostics, fix_applied) {
            Ok(_) => AgentResult::ok(
                &self.name,
                started.elapsed().as_secs_f64(),
                format!("{count} formatting finding(s) for {file}, fix_applied={fix_applied}"),
            ),
            Err(err) => AgentResult::failed(&self.name, started.elapsed().as_secs_f64(), err.to_string()),
        }
    }
}
