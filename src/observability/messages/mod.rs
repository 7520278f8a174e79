// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types, grouped by subsystem:
//!
//! * `dispatcher` - backend selection and connection lifecycle
//! * `transport` - socket, HTTP and embedded execution events
//! * `workflow` - workflow building and materialization

use tracing::Span;

pub mod dispatcher;
pub mod transport;
pub mod workflow;

/// Emit a message as a `tracing` event or open a span carrying its fields.
pub trait StructuredLog {
    /// Log the message at its documented level.
    fn log(&self);

    /// Create a span with the message fields attached.
    fn span(&self, name: &str) -> Span;
}
