// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the event bus.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("subscription {0} not found")]
    SubscriptionNotFound(String),
}
