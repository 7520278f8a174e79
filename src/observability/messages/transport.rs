// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for transport events: the socket listener round trip, the
//! compute API client and embedded script runs.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Listener message written to the socket.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct SocketRequestSent<'a> {
    pub address: &'a str,
    pub filename: &'a str,
    pub bytes: usize,
}

impl Display for SocketRequestSent<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sent {} byte request for {} to {}",
            self.bytes, self.filename, self.address
        )
    }
}

impl StructuredLog for SocketRequestSent<'_> {
    fn log(&self) {
        tracing::debug!(
            address = self.address,
            filename = self.filename,
            bytes = self.bytes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "socket_request",
            span_name = name,
            address = self.address,
            filename = self.filename,
        )
    }
}

/// Listener response read from the socket.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct SocketResponseReceived<'a> {
    pub address: &'a str,
    pub bytes: usize,
    pub duration: std::time::Duration,
}

impl Display for SocketResponseReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Received {} byte response from {} in {:?}",
            self.bytes, self.address, self.duration
        )
    }
}

impl StructuredLog for SocketResponseReceived<'_> {
    fn log(&self) {
        tracing::debug!(
            address = self.address,
            bytes = self.bytes,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "socket_response",
            span_name = name,
            address = self.address,
            bytes = self.bytes,
        )
    }
}

/// Parameter bindings that cannot travel over the listener protocol.
///
/// # Log Level
/// `debug!` - Expected for socket execution with parameters
pub struct ParametersDropped {
    pub count: usize,
}

impl Display for ParametersDropped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropping {} parameter binding(s); the script listener only receives code",
            self.count
        )
    }
}

impl StructuredLog for ParametersDropped {
    fn log(&self) {
        tracing::debug!(count = self.count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("parameters_dropped", span_name = name, count = self.count)
    }
}

/// The scoped temp file could not be removed.
///
/// # Log Level
/// `warn!` - Leaves a stray file in the temp directory
///
/// # Example
/// ```
/// use grasshopper_dispatch::observability::messages::transport::TempFileCleanupFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
/// let msg = TempFileCleanupFailed {
///     path: "/tmp/gh_dispatch_abc.py",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct TempFileCleanupFailed<'a> {
    pub path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for TempFileCleanupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to remove temp file {}: {}", self.path, self.error)
    }
}

impl StructuredLog for TempFileCleanupFailed<'_> {
    fn log(&self) {
        tracing::warn!(path = self.path, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "temp_file_cleanup",
            span_name = name,
            path = self.path,
            error = %self.error,
        )
    }
}

/// Compute API request about to be posted.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct HttpRequestSent<'a> {
    pub endpoint: &'a str,
    pub bytes: usize,
}

impl Display for HttpRequestSent<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Posting {} byte request to {}", self.bytes, self.endpoint)
    }
}

impl StructuredLog for HttpRequestSent<'_> {
    fn log(&self) {
        tracing::debug!(endpoint = self.endpoint, bytes = self.bytes, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("http_request", span_name = name, endpoint = self.endpoint)
    }
}

/// Compute API request failed at the transport or HTTP status level.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct HttpRequestFailed<'a> {
    pub endpoint: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for HttpRequestFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Compute request to {} failed: {}", self.endpoint, self.error)
    }
}

impl StructuredLog for HttpRequestFailed<'_> {
    fn log(&self) {
        tracing::error!(endpoint = self.endpoint, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "http_request_failed",
            span_name = name,
            endpoint = self.endpoint,
            error = %self.error,
        )
    }
}

/// Embedded script run finished, successfully or not.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct ScriptEvaluated<'a> {
    pub backend: &'a str,
    pub succeeded: bool,
    pub duration: std::time::Duration,
}

impl Display for ScriptEvaluated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let outcome = if self.succeeded { "succeeded" } else { "faulted" };
        write!(
            f,
            "Script on {} backend {} after {:?}",
            self.backend, outcome, self.duration
        )
    }
}

impl StructuredLog for ScriptEvaluated<'_> {
    fn log(&self) {
        tracing::debug!(
            backend = self.backend,
            succeeded = self.succeeded,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "script",
            span_name = name,
            backend = self.backend,
            succeeded = self.succeeded,
        )
    }
}
