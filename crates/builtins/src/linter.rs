// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin adapter over a lint tool (ruff, eslint, clippy, ...).

use crate::adapter::{run_tool, submit_diagnostics, AdapterConfig};
use crate::error::BuiltinError;
use crate::parser::parse_lint_output;
use async_trait::async_trait;
use devloop_agent::Agent;
use devloop_core::{AgentResult, Event, Pattern};
use devloop_runner::CommandRunner;
use devloop_store::ContextStore;
use std::time::Instant;

/// Config for [`LinterAgent`]. `autofix_advertised` controls whether
/// findings are marked `auto_fixable`; DevLoop never runs `--fix` itself
/// unless a formatter-style agent is configured to do so.
#[derive(Debug, Clone)]
pub struct LinterConfig {
    pub name: String,
    pub adapter: AdapterConfig,
    pub triggers: Vec<Pattern>,
    pub autofix_advertised: bool,
}

pub struct LinterAgent {
    name: String,
    triggers: Vec<Pattern>,
    adapter: AdapterConfig,
    autofix_advertised: bool,
    runner: CommandRunner,
    store: ContextStore,
}

impl LinterAgent {
    pub fn new(config: LinterConfig, runner: CommandRunner, store: ContextStore) -> Result<Self, BuiltinError> {
        config.adapter.validate(&config.name)?;
        Ok(Self {
            name: config.name,
            triggers: config.triggers,
            adapter: config.adapter,
            autofix_advertised: config.autofix_advertised,
            runner,
            store,
        })
    }
}

#[async_trait]
impl Agent for LinterAgent {
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

        let output = match run_tool(&self.runner, &self.name, &self.adapter, file).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(agent = %self.name, file, error = %err, "lint run failed");
                return AgentResult::failed(&self.name, started.elapsed().as_secs_f64(), err.to_string());
            }
        };

        let diagnostics = parse_lint_output(&output, self.autofix_advertised);
        let count = diagnostics.len();
        match submit_diagnostics(&self.store, &self.name, &self.name, diagnostics, false) {
            Ok(_) => AgentResult::ok(
                &self.name,
                started.elapsed().as_secs_f64(),
                format!("{count} lint finding(s) for {file}"),
            ),
            Err(err) => AgentResult::failed(&self.name, started.elapsed().as_secs_f64(), err.to_string()),
        }
    }
}
