// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agents.json`: the set of built-in agents a project wants running, and
//! how each one invokes its underlying tool.

use crate::error::DaemonError;
use devloop_agent::Agent;
use devloop_builtins::{
    AdapterConfig, ArgTemplate, FormatterAgent, FormatterConfig, LinterAgent, LinterConfig,
    SecurityScannerAgent, SecurityScannerConfig, TestRunnerAgent, TestRunnerConfig, TypeCheckerAgent,
    TypeCheckerConfig,
};
use devloop_core::Pattern;
use devloop_runner::CommandRunner;
use devloop_store::ContextStore;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AgentsFile {
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentSpec {
    Linter {
        name: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_triggers_save")]
        triggers: Vec<String>,
        #[serde(default)]
        autofix_advertised: bool,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Formatter {
        name: String,
        check_program: String,
        #[serde(default)]
        check_args: Vec<String>,
        fix_program: Option<String>,
        #[serde(default)]
        fix_args: Vec<String>,
        #[serde(default = "default_triggers_save")]
        triggers: Vec<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    TypeChecker {
        name: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_triggers_save")]
        triggers: Vec<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    TestRunner {
        name: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_triggers_git")]
        triggers: Vec<String>,
        #[serde(default = "default_test_timeout_secs")]
        timeout_secs: u64,
    },
    SecurityScanner {
        name: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_triggers_save")]
        triggers: Vec<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_triggers_save() -> Vec<String> {
    vec!["file:save".to_string()]
}

fn default_triggers_git() -> Vec<String> {
    vec!["git:pre-commit".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_test_timeout_secs() -> u64 {
    120
}

impl AgentSpec {
    fn name(&self) -> &str {
        match self {
            AgentSpec::Linter { name, .. }
            | AgentSpec::Formatter { name, .. }
            | AgentSpec::TypeChecker { name, .. }
            | AgentSpec::TestRunner { name, .. }
            | AgentSpec::SecurityScanner { name, .. } => name,
        }
    }

    fn validate(&self, index: usize) -> Result<(), DaemonError> {
        let context = format!("agents[{index}] ({})", self.name());
        let invalid = |field: &str, detail: &str| DaemonError::InvalidConfig {
            context: context.clone(),
            field: field.to_string(),
            detail: detail.to_string(),
        };
        if self.name().trim().is_empty() {
            return Err(invalid("name", "must not be empty"));
        }
        match self {
            AgentSpec::Linter { program, .. }
            | AgentSpec::TypeChecker { program, .. }
            | AgentSpec::TestRunner { program, .. }
            | AgentSpec::SecurityScanner { program, .. } => {
                if program.trim().is_empty() {
                    return Err(invalid("program", "must not be empty"));
                }
            }
            AgentSpec::Formatter {
                check_program,
                fix_program,
                ..
            } => {
                if check_program.trim().is_empty() {
                    return Err(invalid("check_program", "must not be empty"));
                }
                if let Some(fix) = fix_program {
                    if fix.trim().is_empty() {
                        return Err(invalid("fix_program", "must not be empty if present"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Loads and strictly validates `agents.json` at `path`. A missing file is
/// treated as "no built-in agents configured", not an error.
pub fn load_agents_file(path: &Path) -> Result<AgentsFile, DaemonError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AgentsFile { agents: Vec::new() })
        }
        Err(source) => {
            return Err(DaemonError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let file: AgentsFile = serde_json::from_slice(&bytes).map_err(|source| DaemonError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for (index, spec) in file.agents.iter().enumerate() {
        spec.validate(index)?;
    }
    Ok(file)
}

fn patterns(raw: &[String]) -> Vec<Pattern> {
    raw.iter().map(|s| Pattern::new(s.clone())).collect()
}

fn adapter(program: &str, args: &[String], timeout_secs: u64) -> AdapterConfig {
    AdapterConfig {
        program: program.to_string(),
        args: ArgTemplate::new(args.to_vec()),
        cwd: None,
        timeout: Duration::from_secs(timeout_secs),
    }
}

/// Instantiates every configured built-in agent against one runner/store
/// pair, ready for [`devloop_agent::AgentManager::register`].
pub fn build_agents(
    file: &AgentsFile,
    runner: &CommandRunner,
    store: &ContextStore,
) -> Result<Vec<Arc<dyn Agent>>, DaemonError> {
    let mut agents: Vec<Arc<dyn Agent>> = Vec::new();
    for spec in &file.agents {
        let agent: Arc<dyn Agent> = match spec {
            AgentSpec::Linter {
                name,
                program,
                args,
                triggers,
                autofix_advertised,
                timeout_secs,
            } => Arc::new(LinterAgent::new(
                LinterConfig {
                    name: name.clone(),
                    adapter: adapter(program, args, *timeout_secs),
                    triggers: patterns(triggers),
                    autofix_advertised: *autofix_advertised,
                },
                runner.clone(),
                store.clone(),
            )?),
            AgentSpec::Formatter {
                name,
                check_program,
                check_args,
                fix_program,
                fix_args,
                triggers,
                timeout_secs,
            } => Arc::new(FormatterAgent::new(
                FormatterConfig {
                    name: name.clone(),
                    check: adapter(check_program, check_args, *timeout_secs),
                    fix: fix_program
                        .as_ref()
                        .map(|program| adapter(program, fix_args, *timeout_secs)),
                    triggers: patterns(triggers),
                },
                runner.clone(),
                store.clone(),
            )?),
            AgentSpec::TypeChecker {
                name,
                program,
                args,
                triggers,
                timeout_secs,
            } => Arc::new(TypeCheckerAgent::new(
                TypeCheckerConfig {
                    name: name.clone(),
                    adapter: adapter(program, args, *timeout_secs),
                    triggers: patterns(triggers),
                },
                runner.clone(),
                store.clone(),
            )?),
            AgentSpec::TestRunner {
                name,
                program,
                args,
                triggers,
                timeout_secs,
            } => Arc::new(TestRunnerAgent::new(
                TestRunnerConfig {
                    name: name.clone(),
                    adapter: adapter(program, args, *timeout_secs),
                    triggers: patterns(triggers),
                },
                runner.clone(),
                store.clone(),
            )?),
            AgentSpec::SecurityScanner {
                name,
                program,
                args,
                triggers,
                timeout_secs,
            } => Arc::new(SecurityScannerAgent::new(
                SecurityScannerConfig {
                    name: name.clone(),
                    adapter: adapter(program, args, *timeout_secs),
                    triggers: patterns(triggers),
                },
                runner.clone(),
                store.clone(),
            )?),
        };
        agents.push(agent);
    }
    Ok(agents)
}

/// Every allowlisted program name referenced by `file`, for building the
/// runner's allowlist.
pub fn allowlisted_programs(file: &AgentsFile) -> Vec<String> {
    let mut programs = Vec::new();
    for spec in &file.agents {
        match spec {
            AgentSpec::Linter { program, .. }
            | AgentSpec::TypeChecker { program, .. }
            | AgentSpec::TestRunner { program, .. }
            | AgentSpec::SecurityScanner { program, .. } => programs.push(program.clone()),
            AgentSpec::Formatter {
                check_program,
                fix_program,
                ..
            } => {
                programs.push(check_program.clone());
                if let Some(fix) = fix_program {
                    programs.push(fix.clone());
                }
            }
        }
    }
    programs
}
