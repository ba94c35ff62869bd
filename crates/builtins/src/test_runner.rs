// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin adapter over a test runner (pytest, cargo test, jest, ...).
//! Triggered by `git:*` events rather than individual file saves, since
//! running a full suite on every keystroke is rarely useful.

use crate::adapter::{run_tool, submit_diagnostics, AdapterConfig};
use crate::error::BuiltinError;
use crate::parser::parse_test_runner_output;
use async_trait::async_trait;
use devloop_agent::Agent;
use devloop_core::{AgentResult, Event, Pattern};
use devloop_runner::CommandRunner;
use devloop_store::ContextStore;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TestRunnerConfig {
    pub name: String,
    pub adapter: AdapterConfig,
    pub triggers: Vec<Pattern>,
}

pub struct TestRunnerAgent {
    name: String,
    triggers: Vec<Pattern>,
    adapter: AdapterConfig,
    runner: CommandRunner,
    store: ContextStore,
}

impl TestRunnerAgent {
    pub fn new(config: TestRunnerConfig, runner: CommandRunner, store: ContextStore) -> Result<Self, BuiltinError> {
        config.adapter.validate(&config.name)?;
        Ok(Self {
            name: config.name,
            triggers: config.triggers,
            adapter: config.adapter,
            runner,
            store,
        })
    }
}

#[async_trait]
impl Agent for TestRunnerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn triggers(&self) -> &[Pattern] {
        &self.triggers
    }

    async fn handle(&self, event: Event) -> AgentResult {
        let started = Instant::now();
        // git:* events carry no single file; the suite runs against the
        // whole project, so a fixed placeholder is used in place of a
        // template substitution.
        let scope = event
            .payload
            .get("path")
            .and_then(|v| v.as_str())
            .unwrap_or(".");

        let output = match run_tool(&self.runner, &self.name, &self.adapter, scope).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(agent = %self.name, error = %err, "test run failed");
                return AgentResult::failed(&self.name, started.elapsed().as_secs_f64(), err.to_string());
            }
        };

        let diagnostics = parse_test_runner_output(&output, scope);
        let count = diagnostics.len();
        match submit_diagnostics(&self.store, &self.name, &self.name, diagnostics, false) {
            Ok(_) => AgentResult::ok(
                &self.name,
                started.elapsed().as_secs_f64(),
                format!("{count} failing test(s)"),
            ),
            Err(err) => AgentResult::failed(&self.name, started.elapsed().as_secs_f64(), err.to_string()),
        }
    }
}
