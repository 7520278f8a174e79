// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for backend selection and connection lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Backend chosen for a connection.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use grasshopper_dispatch::observability::messages::dispatcher::BackendSelected;
///
/// let msg = BackendSelected {
///     backend: "socket",
///     platform: "Linux",
/// };
///
/// assert_eq!(msg.to_string(), "Selected socket backend on Linux");
/// ```
pub struct BackendSelected<'a> {
    pub backend: &'a str,
    pub platform: &'a str,
}

impl Display for BackendSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Selected {} backend on {}", self.backend, self.platform)
    }
}

impl StructuredLog for BackendSelected<'_> {
    fn log(&self) {
        tracing::info!(
            backend = self.backend,
            platform = self.platform,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "backend_selection",
            span_name = name,
            backend = self.backend,
            platform = self.platform,
        )
    }
}

/// Native binding requested on a platform that cannot load it.
///
/// # Log Level
/// `warn!` - Degraded selection, the portable flavor is used instead
pub struct NativeBindingUnavailable<'a> {
    pub platform: &'a str,
}

impl Display for NativeBindingUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Native binding requested but unavailable on {}; using the portable embedded backend",
            self.platform
        )
    }
}

impl StructuredLog for NativeBindingUnavailable<'_> {
    fn log(&self) {
        tracing::warn!(platform = self.platform, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "native_binding_unavailable",
            span_name = name,
            platform = self.platform,
        )
    }
}

/// Connection finished initializing and accepts operations.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConnectionInitialized<'a> {
    pub backend: &'a str,
    pub duration: std::time::Duration,
}

impl Display for ConnectionInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Connection initialized on {} backend in {:?}",
            self.backend, self.duration
        )
    }
}

impl StructuredLog for ConnectionInitialized<'_> {
    fn log(&self) {
        tracing::info!(
            backend = self.backend,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "connection_initialized",
            span_name = name,
            backend = self.backend,
            duration_ms = self.duration.as_millis() as u64,
        )
    }
}

/// Connection initialization failed; the connection stays uninitialized.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use grasshopper_dispatch::observability::messages::dispatcher::ConnectionInitFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "missing compute url");
/// let msg = ConnectionInitFailed {
///     backend: "http",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ConnectionInitFailed<'a> {
    pub backend: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ConnectionInitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to initialize {} backend: {}",
            self.backend, self.error
        )
    }
}

impl StructuredLog for ConnectionInitFailed<'_> {
    fn log(&self) {
        tracing::error!(
            backend = self.backend,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "connection_init_failed",
            span_name = name,
            backend = self.backend,
            error = %self.error,
        )
    }
}

/// Connection closed and its backend released.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConnectionClosed<'a> {
    pub backend: &'a str,
}

impl Display for ConnectionClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Connection to {} backend closed", self.backend)
    }
}

impl StructuredLog for ConnectionClosed<'_> {
    fn log(&self) {
        tracing::info!(backend = self.backend, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("connection_closed", span_name = name, backend = self.backend)
    }
}

/// Operation refused before reaching a backend.
///
/// # Log Level
/// `warn!` - Caller error, reported back as an error envelope
pub struct OperationRejected<'a> {
    pub operation: &'a str,
    pub reason: &'a str,
}

impl Display for OperationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected {}: {}", self.operation, self.reason)
    }
}

impl StructuredLog for OperationRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            operation = self.operation,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "operation_rejected",
            span_name = name,
            operation = self.operation,
            reason = self.reason,
        )
    }
}

/// Operation dispatched to the backend.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct OperationDispatched<'a> {
    pub operation: &'a str,
    pub backend: &'a str,
}

impl Display for OperationDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatching {} to {} backend", self.operation, self.backend)
    }
}

impl StructuredLog for OperationDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            operation = self.operation,
            backend = self.backend,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operation",
            span_name = name,
            operation = self.operation,
            backend = self.backend,
        )
    }
}

/// Backend reported a failure for an operation.
///
/// # Log Level
/// `warn!` - The failure is returned to the caller as an error envelope
pub struct OperationFailed<'a> {
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for OperationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.error)
    }
}

impl StructuredLog for OperationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            operation = self.operation,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "operation_failed",
            span_name = name,
            operation = self.operation,
            error = %self.error,
        )
    }
}
