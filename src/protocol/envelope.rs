// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The result envelope shared by every dispatcher operation.
//!
//! Embedded, socket and HTTP backends fail in structurally different ways
//! (script faults, dropped connections, non-2xx responses). All of them are
//! folded into one two-variant shape here so callers only ever inspect
//! `status` before touching `data`.
//!
//! ```
//! use grasshopper_dispatch::protocol::{ExecutionResult, Status};
//! use serde_json::json;
//!
//! let ok = ExecutionResult::success(json!({"volume": 6000}));
//! assert_eq!(ok.status, Status::Success);
//! assert_eq!(ok.data()["volume"], 6000);
//! ```

use crate::errors::{DispatchError, DispatchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Outcome discriminator of an [`ExecutionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// Machine-readable category of an error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConnected,
    Configuration,
    UnsupportedOperation,
    Transport,
    ExecutionFault,
    NotFound,
    InvalidInput,
}

/// Uniform `{status, data | error}` result.
///
/// Exactly one of `data` / `error` is meaningful and `status` decides which.
/// `trace` is only populated for faults raised by embedded script execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: Status,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExecutionResult {
    pub fn success(data: Value) -> Self {
        Self {
            status: Status::Success,
            data,
            error: None,
            kind: None,
            trace: None,
            warnings: Vec::new(),
        }
    }

    pub fn failure(error: &DispatchError) -> Self {
        Self {
            status: Status::Error,
            data: Value::Null,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
            trace: error.trace().map(str::to_string),
            warnings: Vec::new(),
        }
    }

    /// The single conversion point between internal results and the envelope.
    pub fn from_result(result: DispatchResult<Value>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(&error),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Payload of a successful envelope; `Value::Null` for error envelopes.
    pub fn data(&self) -> &Value {
        match self.status {
            Status::Success => &self.data,
            Status::Error => &NULL,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The `component_id` a graph-creating operation handed back, if any.
    pub fn component_id(&self) -> Option<&str> {
        self.data().get("component_id").and_then(Value::as_str)
    }
}

impl From<DispatchResult<Value>> for ExecutionResult {
    fn from(result: DispatchResult<Value>) -> Self {
        Self::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_serializes_without_error_fields() {
        let envelope = ExecutionResult::success(json!([1, 2, 3]));
        let encoded = serde_json::to_value(&envelope).unwrap();

        assert_eq!(encoded, json!({"status": "success", "data": [1, 2, 3]}));
    }

    #[test]
    fn test_failure_envelope_carries_kind_and_trace() {
        let error = DispatchError::ExecutionFault {
            message: "Variable not found: radius".to_string(),
            trace: Some("ErrorVariableNotFound(\"radius\", 1:1)".to_string()),
        };
        let envelope = ExecutionResult::failure(&error);

        assert!(envelope.is_error());
        assert_eq!(envelope.kind, Some(ErrorKind::ExecutionFault));
        assert_eq!(
            envelope.error_message(),
            Some("Execution fault: Variable not found: radius")
        );
        assert!(envelope.trace.as_deref().unwrap().contains("radius"));
    }

    #[test]
    fn test_data_is_hidden_on_error_envelopes() {
        let mut envelope = ExecutionResult::failure(&DispatchError::NotConnected);
        envelope.data = json!({"stale": true});

        assert_eq!(envelope.data(), &Value::Null);
        assert_eq!(envelope.component_id(), None);
    }

    #[test]
    fn test_component_id_lookup() {
        let envelope = ExecutionResult::success(json!({"component_id": "comp_0a1b2c3d"}));
        assert_eq!(envelope.component_id(), Some("comp_0a1b2c3d"));
    }

    #[test]
    fn test_envelope_round_trips_through_json() {
        let envelope = ExecutionResult::failure(&DispatchError::NotFound(
            "Source component with ID py_00000000 not found".to_string(),
        ))
        .with_warnings(vec!["skipped".to_string()]);

        let text = serde_json::to_string(&envelope).unwrap();
        let decoded: ExecutionResult = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, envelope);
    }
}
