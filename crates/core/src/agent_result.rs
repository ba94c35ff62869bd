// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgentResult`: the outcome of one `Agent::handle` invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentResultError {
    #[error("agent_name must not be empty")]
    EmptyAgentName,
    #[error("duration must be non-negative and finite, got {0}")]
    InvalidDuration(f64),
}

/// The outcome of dispatching one event to an agent's `handle` method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_name: String,
    pub success: bool,
    /// Wall-clock seconds spent in `handle`.
    pub duration: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    pub fn new(
        agent_name: impl Into<String>,
        success: bool,
        duration: f64,
        message: impl Into<String>,
    ) -> Result<Self, AgentResultError> {
        let agent_name = agent_name.into();
        if agent_name.trim().is_empty() {
            return Err(AgentResultError::EmptyAgentName);
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(AgentResultError::InvalidDuration(duration));
        }
        Ok(Self {
            agent_name,
            success,
            duration,
            message: message.into(),
            data: None,
            error: None,
        })
    }

    pub fn ok(agent_name: impl Into<String>, duration: f64, message: impl Into<String>) -> Self {
        Self::new(agent_name, true, duration, message)
            .unwrap_or_else(|_| Self::fallback_failure("<invalid agent result>"))
    }

    pub fn failed(
        agent_name: impl Into<String>,
        duration: f64,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        match Self::new(agent_name, false, duration, error.clone()) {
            Ok(mut r) => {
                r.error = Some(error);
                r
            }
            Err(_) => Self::fallback_failure(&error),
        }
    }

    fn fallback_failure(error: &str) -> Self {
        Self {
            agent_name: "<unknown>".into(),
            success: false,
            duration: 0.0,
            message: error.to_string(),
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Flattened view used when publishing `agent:<name>:completed` events.
    pub fn to_event_payload(&self) -> std::collections::BTreeMap<String, Value> {
        let mut map = std::collections::BTreeMap::new();
        map.insert("agent_name".into(), Value::String(self.agent_name.clone()));
        map.insert("success".into(), Value::Bool(self.success));
        map.insert(
            "duration".into(),
            serde_json::Number::from_f64(self.duration)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        map.insert("message".into(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            map.insert("data".into(), data.clone());
        }
        if let Some(error) = &self.error {
            map.insert("error".into(), Value::String(error.clone()));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_agent_name() {
        assert!(matches!(
            AgentResult::new("", true, 1.0, "ok"),
            Err(AgentResultError::EmptyAgentName)
        ));
    }

    #[test]
    fn rejects_negative_duration() {
        assert!(matches!(
            AgentResult::new("linter", true, -1.0, "ok"),
            Err(AgentResultError::InvalidDuration(_))
        ));
    }

    #[test]
    fn rejects_non_finite_duration() {
        assert!(matches!(
            AgentResult::new("linter", true, f64::INFINITY, "ok"),
            Err(AgentResultError::InvalidDuration(_))
        ));
    }

    #[test]
    fn ok_constructs_success_result() {
        let r = AgentResult::ok("linter", 0.5, "done");
        assert!(r.success);
        assert_eq!(r.agent_name, "linter");
    }

    #[test]
    fn failed_sets_error_field() {
        let r = AgentResult::failed("linter", 0.1, "boom");
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("boom"));
    }

    #[test]
    fn event_payload_includes_core_fields() {
        let r = AgentResult::ok("linter", 1.5, "done").with_data(serde_json::json!({"n": 3}));
        let payload = r.to_event_payload();
        assert_eq!(payload.get("agent_name").unwrap(), "linter");
        assert!(payload.contains_key("data"));
    }
}
