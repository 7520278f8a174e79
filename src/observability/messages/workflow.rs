// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow building and materialization.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A template workflow was built from a description.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use grasshopper_dispatch::observability::messages::workflow::WorkflowBuilt;
///
/// let msg = WorkflowBuilt {
///     template: "box",
///     parameters: 3,
///     components: 2,
///     scripts: 0,
///     connections: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WorkflowBuilt<'a> {
    pub template: &'a str,
    pub parameters: usize,
    pub components: usize,
    pub scripts: usize,
    pub connections: usize,
}

impl Display for WorkflowBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built {} workflow: {} parameters, {} components, {} scripts, {} connections",
            self.template, self.parameters, self.components, self.scripts, self.connections
        )
    }
}

impl StructuredLog for WorkflowBuilt<'_> {
    fn log(&self) {
        tracing::info!(
            template = self.template,
            parameters = self.parameters,
            components = self.components,
            scripts = self.scripts,
            connections = self.connections,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow",
            span_name = name,
            template = self.template,
            parameters = self.parameters,
            components = self.components,
            scripts = self.scripts,
            connections = self.connections,
        )
    }
}

/// A workflow connection was skipped during materialization.
///
/// # Log Level
/// `warn!` - Non-fatal, also recorded in the envelope warnings
pub struct ConnectionSkipped<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub reason: &'a str,
}

impl Display for ConnectionSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped connection {} -> {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl StructuredLog for ConnectionSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            from = self.from,
            to = self.to,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "connection_skipped",
            span_name = name,
            from = self.from,
            to = self.to,
        )
    }
}

/// Materialization of a workflow began.
///
/// # Log Level
/// `debug!` - Per-workflow detail
pub struct MaterializationStarted {
    pub nodes: usize,
    pub connections: usize,
}

impl Display for MaterializationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Materializing {} nodes and {} connections",
            self.nodes, self.connections
        )
    }
}

impl StructuredLog for MaterializationStarted {
    fn log(&self) {
        tracing::debug!(
            nodes = self.nodes,
            connections = self.connections,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "materialization",
            span_name = name,
            nodes = self.nodes,
            connections = self.connections,
        )
    }
}

/// All nodes and resolvable connections were created.
///
/// # Log Level
/// `info!` - Important operational event
pub struct MaterializationCompleted {
    pub nodes: usize,
    pub connections: usize,
    pub skipped: usize,
    pub duration: std::time::Duration,
}

impl Display for MaterializationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Materialized {} nodes and {} connections ({} skipped) in {:?}",
            self.nodes, self.connections, self.skipped, self.duration
        )
    }
}

impl StructuredLog for MaterializationCompleted {
    fn log(&self) {
        tracing::info!(
            nodes = self.nodes,
            connections = self.connections,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "materialization",
            span_name = name,
            nodes = self.nodes,
            connections = self.connections,
            skipped = self.skipped,
        )
    }
}

/// Materialization stopped at the first backend error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct MaterializationFailed<'a> {
    pub step: &'a str,
    pub error: &'a str,
    pub nodes_created: usize,
}

impl Display for MaterializationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Materialization failed at {} after creating {} nodes: {}",
            self.step, self.nodes_created, self.error
        )
    }
}

impl StructuredLog for MaterializationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            step = self.step,
            nodes_created = self.nodes_created,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "materialization_failed",
            span_name = name,
            step = self.step,
            nodes_created = self.nodes_created,
        )
    }
}
