//! Workflow graph: named node specs plus `Node.Param` connections.
//!
//! A `Workflow` is built once per request and discarded after
//! materialization. Node names share one namespace across parameters,
//! components and scripts.

use std::collections::HashSet;

use serde::Serialize;

use crate::errors::WorkflowError;

use super::node::{ConnectionSpec, NodeSpec, ScriptSpec};

/// Insertion-ordered name -> spec mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NamedSpecs<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for NamedSpecs<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> NamedSpecs<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, spec: T) {
        self.entries.push((name.into(), spec));
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workflow {
    pub parameters: NamedSpecs<NodeSpec>,
    pub components: NamedSpecs<NodeSpec>,
    pub scripts: NamedSpecs<ScriptSpec>,
    pub connections: Vec<ConnectionSpec>,
}

impl Workflow {
    pub fn node_count(&self) -> usize {
        self.parameters.len() + self.components.len() + self.scripts.len()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.parameters.contains(name) || self.components.contains(name) || self.scripts.contains(name)
    }

    /// All node names in materialization order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .names()
            .chain(self.components.names())
            .chain(self.scripts.names())
    }

    /// Collect every structural problem: duplicate names, malformed
    /// endpoints and endpoints naming undefined nodes.
    pub fn validate(&self) -> Result<(), Vec<WorkflowError>> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for name in self.node_names() {
            if !seen.insert(name) {
                errors.push(WorkflowError::DuplicateNodeName {
                    name: name.to_string(),
                });
            }
        }

        for connection in &self.connections {
            for (raw, endpoint) in [
                (&connection.from, connection.source()),
                (&connection.to, connection.target()),
            ] {
                match endpoint {
                    Ok(endpoint) if !self.contains_node(endpoint.node) => {
                        errors.push(WorkflowError::UnresolvedEndpoint {
                            endpoint: raw.clone(),
                            node: endpoint.node.to_string(),
                        });
                    }
                    Ok(_) => {}
                    Err(e) => errors.push(e),
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Programmatic workflow construction.
///
/// ```
/// use grasshopper_dispatch::graph::{NodeSpec, WorkflowBuilder};
/// use serde_json::json;
///
/// let workflow = WorkflowBuilder::new()
///     .parameter("Radius", NodeSpec::slider(json!(5)))
///     .component("Circle", NodeSpec::component("Circle", "Curve"))
///     .connect("Radius.output", "Circle.Radius")
///     .build()
///     .unwrap();
///
/// assert_eq!(workflow.node_count(), 2);
///
/// let dangling = WorkflowBuilder::new()
///     .connect("Radius.output", "Circle.Radius")
///     .build();
/// assert!(dangling.is_err());
/// ```
#[derive(Debug, Default)]
pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: impl Into<String>, spec: NodeSpec) -> Self {
        self.workflow.parameters.push(name, spec);
        self
    }

    pub fn component(mut self, name: impl Into<String>, spec: NodeSpec) -> Self {
        self.workflow.components.push(name, spec);
        self
    }

    pub fn script(mut self, name: impl Into<String>, spec: ScriptSpec) -> Self {
        self.workflow.scripts.push(name, spec);
        self
    }

    pub fn connect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.workflow.connections.push(ConnectionSpec::new(from, to));
        self
    }

    /// The workflow as declared, without validation.
    pub fn finish(self) -> Workflow {
        self.workflow
    }

    pub fn build(self) -> Result<Workflow, Vec<WorkflowError>> {
        self.workflow.validate()?;
        Ok(self.workflow)
    }
}
