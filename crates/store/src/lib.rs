// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! devloop-store: the tiered, file-backed context store.

mod atomic;
mod error;
mod model;
mod scoring;
mod store;

pub use error::StoreError;
pub use model::{BriefSummary, Index, TierFile, TierSummary};
pub use scoring::{assign_tier, relevance_score};
pub use store::{ContextStore, DEFAULT_RETENTION};
