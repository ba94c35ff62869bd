// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! devloop-collector: native filesystem watching feeding the event bus.

mod collector;
mod config;
mod debounce;
mod error;

pub use collector::{CollectorHandle, FilesystemCollector};
pub use config::{CollectorConfig, CollectorConfigBuilder, DEFAULT_DEBOUNCE_MS, DEFAULT_IGNORE_GLOBS};
pub use error::CollectorError;
