// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Named parameter bindings handed to a backend alongside code.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// A code snippet plus the parameter bindings it runs against.
///
/// Requests are immutable once built; backends only ever borrow or consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    code: String,
    #[serde(default)]
    parameters: Parameters,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            code: code.into(),
            parameters,
        }
    }

    /// A request with no parameter bindings.
    pub fn code_only(code: impl Into<String>) -> Self {
        Self::new(code, Parameters::new())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn into_parts(self) -> (String, Parameters) {
        (self.code, self.parameters)
    }
}
