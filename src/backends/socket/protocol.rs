// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script listener wire format.
//!
//! A request is one JSON object naming a file the listener should run:
//!
//! ```json
//! {"filename": "/tmp/gh_dispatch_x1y2.py", "run": true, "reset": false, "temp": true}
//! ```
//!
//! The response is free-form UTF-8. Listeners that report structured results
//! answer with `{"status": "success", "data": ...}` or
//! `{"status": "error", "error": "...", "trace": "..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::errors::{DispatchError, DispatchResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerMessage {
    pub filename: String,
    pub run: bool,
    pub reset: bool,
    pub temp: bool,
}

impl ListenerMessage {
    /// Ask the listener to run a temp file once, without resetting its state.
    pub fn run_temp(path: &Path) -> Self {
        Self {
            filename: path.display().to_string(),
            run: true,
            reset: false,
            temp: true,
        }
    }

    pub fn encode(&self) -> DispatchResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| DispatchError::Transport(format!("Failed to encode listener message: {}", e)))
    }
}

/// Turn raw listener bytes into a payload or a fault.
pub fn decode_response(bytes: &[u8]) -> DispatchResult<Value> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DispatchError::Transport(format!("Listener response is not UTF-8: {}", e)))?;
    let text = text.trim();

    if text.is_empty() {
        return Err(DispatchError::Transport(
            "Listener returned an empty response".to_string(),
        ));
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => return Ok(Value::String(text.to_string())),
    };

    match value.get("status").and_then(Value::as_str) {
        Some("error") => Err(DispatchError::ExecutionFault {
            message: value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Listener reported an error")
                .to_string(),
            trace: value.get("trace").and_then(Value::as_str).map(str::to_string),
        }),
        Some("success") => Ok(value.get("data").cloned().unwrap_or(Value::Null)),
        _ => Ok(value),
    }
}
