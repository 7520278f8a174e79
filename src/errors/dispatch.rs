// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dispatcher's error taxonomy.
//!
//! Every backend and dispatcher operation reports failures as a
//! [`DispatchError`]; the envelope boundary (`ExecutionResult::from_result`)
//! turns them into error envelopes so nothing escapes to the caller as a panic
//! or a raw transport error.

use crate::config::BackendKind;
use crate::errors::ConfigError;
use crate::protocol::ErrorKind;
use crate::traits::Capability;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// Operation attempted before `initialize()` or after `close()`.
    #[error("Not connected to the geometry backend")]
    NotConnected,

    /// Required backend configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The selected backend cannot perform the requested operation.
    #[error("Operation '{operation}' is not supported by the {backend} backend; it requires {required}")]
    UnsupportedOperation {
        operation: String,
        backend: String,
        required: String,
    },

    /// Socket connect/send/receive failures, timeouts and non-2xx responses.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The executed code itself raised.
    #[error("Execution fault: {message}")]
    ExecutionFault {
        message: String,
        trace: Option<String>,
    },

    /// A referenced node, parameter, file or object index does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied input the dispatcher refuses before any backend call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn unsupported(operation: &str, backend: BackendKind, capability: Capability) -> Self {
        DispatchError::UnsupportedOperation {
            operation: operation.to_string(),
            backend: backend.to_string(),
            required: capability.providers().to_string(),
        }
    }

    pub fn fault(message: impl Into<String>) -> Self {
        DispatchError::ExecutionFault {
            message: message.into(),
            trace: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::NotConnected => ErrorKind::NotConnected,
            DispatchError::Configuration(_) => ErrorKind::Configuration,
            DispatchError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            DispatchError::Transport(_) => ErrorKind::Transport,
            DispatchError::ExecutionFault { .. } => ErrorKind::ExecutionFault,
            DispatchError::NotFound(_) => ErrorKind::NotFound,
            DispatchError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn trace(&self) -> Option<&str> {
        match self {
            DispatchError::ExecutionFault { trace, .. } => trace.as_deref(),
            _ => None,
        }
    }
}
