// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! devloop-builtins: thin [`devloop_agent::Agent`] adapters over common
//! analyzer CLIs (lint, format, type-check, test, security-scan), each
//! following the same validate -> run -> parse -> submit -> report
//! pipeline via [`devloop_runner::CommandRunner`] and
//! [`devloop_store::ContextStore`].

mod adapter;
mod diagnostic;
mod error;
mod formatter;
mod linter;
mod parser;
mod security_scanner;
mod test_runner;
mod type_checker;

pub use adapter::{AdapterConfig, ArgTemplate};
pub use diagnostic::RawDiagnostic;
pub use error::BuiltinError;
pub use formatter::{FormatterAgent, FormatterConfig};
pub use linter::{LinterAgent, LinterConfig};
pub use parser::{
    parse_formatter_output, parse_lint_output, parse_security_output, parse_test_runner_output,
    parse_type_check_output,
};
pub use security_scanner::{SecurityScannerAgent, SecurityScannerConfig};
pub use test_runner::{TestRunnerAgent, TestRunnerConfig};
pub use type_checker::{TypeCheckerAgent, TypeCheckerConfig};
