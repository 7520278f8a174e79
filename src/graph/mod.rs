// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Component graph model and workflow execution.
//!
//! * `node` - node, spec and connection types
//! * `workflow` - the `Workflow` graph, validation and `WorkflowBuilder`
//! * `templates` - keyword classifier producing template workflows
//! * `materialize` - `WorkflowExecutor` and `create_parametric_definition`
//! * `plugin` - single plugin component invocation and script edits

pub mod materialize;
pub mod node;
pub mod plugin;
pub mod templates;
pub mod workflow;

#[cfg(test)]
mod integration_tests;

pub use materialize::{create_parametric_definition, MaterializationReport, WorkflowExecutor};
pub use node::{ConnectionSpec, Endpoint, Node, NodeSpec, ScriptSpec};
pub use plugin::{edit_script_component, invoke_plugin};
pub use templates::{build_workflow, ShapeKind};
pub use workflow::{NamedSpecs, Workflow, WorkflowBuilder};
