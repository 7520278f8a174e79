// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Materialize a workflow through a connection.
//!
//! Nodes are created in order (parameters, components, scripts) so every
//! connection endpoint is resolvable by the time connections are made. The
//! first backend error stops materialization and is returned as-is; nodes
//! already created are left in place.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::dispatcher::Connection;
use crate::errors::{DispatchError, WorkflowError};
use crate::observability::messages::workflow::{
    ConnectionSkipped, MaterializationCompleted, MaterializationFailed, MaterializationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{ExecutionResult, NodeId, Parameters, RunOptions};

use super::node::{ConnectionSpec, Node, PARAMS_CATEGORY, SCRIPT_CATEGORY};
use super::templates::build_workflow;
use super::workflow::Workflow;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterializationReport {
    pub nodes: Vec<Node>,
    pub node_ids: BTreeMap<String, NodeId>,
    pub connections_made: usize,
    pub warnings: Vec<String>,
}

impl MaterializationReport {
    fn record(&mut self, node: Node) {
        self.node_ids.insert(node.name.clone(), node.id.clone());
        self.nodes.push(node);
    }

    fn resolve<'a>(
        &'a self,
        spec: &'a ConnectionSpec,
    ) -> Result<(&'a NodeId, &'a str, &'a NodeId, &'a str), WorkflowError> {
        let source = spec.source()?;
        let target = spec.target()?;
        let lookup = |node: &str, endpoint: &str| {
            self.node_ids
                .get(node)
                .ok_or_else(|| WorkflowError::UnresolvedEndpoint {
                    endpoint: endpoint.to_string(),
                    node: node.to_string(),
                })
        };
        Ok((
            lookup(source.node, &spec.from)?,
            source.param,
            lookup(target.node, &spec.to)?,
            target.param,
        ))
    }
}

pub struct WorkflowExecutor;

impl WorkflowExecutor {
    /// Create every node and resolvable connection of `workflow`.
    ///
    /// Returns the failing envelope verbatim on the first backend error.
    pub async fn materialize(
        workflow: &Workflow,
        connection: &Connection,
    ) -> Result<MaterializationReport, ExecutionResult> {
        let started = MaterializationStarted {
            nodes: workflow.parameters.len() + workflow.components.len() + workflow.scripts.len(),
            connections: workflow.connections.len(),
        };
        let span = started.span("materialize");
        started.log();

        Self::create_all(workflow, connection).instrument(span).await
    }

    async fn create_all(
        workflow: &Workflow,
        connection: &Connection,
    ) -> Result<MaterializationReport, ExecutionResult> {
        let started = Instant::now();
        let mut report = MaterializationReport::default();

        for (name, spec) in workflow.parameters.iter() {
            let params = spec.node_params(name);
            let envelope = connection
                .add_node(&spec.component, PARAMS_CATEGORY, params.clone())
                .await;
            let id = Self::created_id(envelope, "parameter", name, &report)?;
            report.record(Node {
                id,
                name: name.to_string(),
                category: PARAMS_CATEGORY.to_string(),
                params,
            });
        }

        for (name, spec) in workflow.components.iter() {
            let params = spec.node_params(name);
            let envelope = connection
                .add_node(&spec.component, &spec.category, params.clone())
                .await;
            let id = Self::created_id(envelope, "component", name, &report)?;
            report.record(Node {
                id,
                name: name.to_string(),
                category: spec.category.clone(),
                params,
            });
        }

        for (name, spec) in workflow.scripts.iter() {
            let envelope = connection
                .create_script_node(name, spec.inputs.clone(), spec.outputs.clone(), &spec.code)
                .await;
            let id = Self::created_id(envelope, "script", name, &report)?;
            report.record(Node {
                id,
                name: name.to_string(),
                category: SCRIPT_CATEGORY.to_string(),
                params: Parameters::new(),
            });
        }

        for spec in &workflow.connections {
            let (source, source_param, target, target_param) = match report.resolve(spec) {
                Ok(resolved) => resolved,
                Err(e) => {
                    let reason = e.to_string();
                    ConnectionSkipped {
                        from: &spec.from,
                        to: &spec.to,
                        reason: &reason,
                    }
                    .log();
                    report.warnings.push(format!(
                        "Skipped connection {} -> {}: {}",
                        spec.from, spec.to, reason
                    ));
                    continue;
                }
            };

            let envelope = connection
                .connect_nodes(source, source_param, target, target_param)
                .await;
            if envelope.is_error() {
                let step = format!("connection {} -> {}", spec.from, spec.to);
                return Err(Self::failed(envelope, &step, &report));
            }
            report.connections_made += 1;
        }

        MaterializationCompleted {
            nodes: report.nodes.len(),
            connections: report.connections_made,
            skipped: report.warnings.len(),
            duration: started.elapsed(),
        }
        .log();

        Ok(report)
    }

    fn created_id(
        envelope: ExecutionResult,
        kind: &str,
        name: &str,
        report: &MaterializationReport,
    ) -> Result<NodeId, ExecutionResult> {
        let step = format!("{} {}", kind, name);
        if envelope.is_error() {
            return Err(Self::failed(envelope, &step, report));
        }
        match envelope.component_id() {
            Some(id) => Ok(NodeId::from(id)),
            None => {
                let error = DispatchError::fault(format!("No component id returned for {}", step));
                Err(Self::failed(ExecutionResult::failure(&error), &step, report))
            }
        }
    }

    fn failed(
        envelope: ExecutionResult,
        step: &str,
        report: &MaterializationReport,
    ) -> ExecutionResult {
        MaterializationFailed {
            step,
            error: envelope.error_message().unwrap_or_default(),
            nodes_created: report.nodes.len(),
        }
        .log();
        envelope
    }
}

/// Build, materialize and run the template matching `description`,
/// saving to `output_file` when given.
pub async fn create_parametric_definition(
    connection: &Connection,
    description: &str,
    parameters: &Parameters,
    output_file: Option<&Path>,
) -> ExecutionResult {
    let workflow = build_workflow(description, parameters);

    let report = match WorkflowExecutor::materialize(&workflow, connection).await {
        Ok(report) => report,
        Err(envelope) => return envelope,
    };

    let run = connection.run_definition(RunOptions::current()).await;
    if run.is_error() {
        return run.with_warnings(report.warnings);
    }

    if let Some(path) = output_file {
        let saved = connection.run_definition(RunOptions::save_to(path)).await;
        if saved.is_error() {
            return saved.with_warnings(report.warnings);
        }
    }

    ExecutionResult::success(json!({
        "description": description,
        "components_created": report.nodes.len(),
        "parameter_count": workflow.parameters.len(),
        "node_ids": report.node_ids,
        "saved_to": output_file.map(|p| Value::String(p.display().to_string())).unwrap_or(Value::Null),
        "run": run.data(),
    }))
    .with_warnings(report.warnings)
}
