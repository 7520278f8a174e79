// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Structural problems found while validating a workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// A connection endpoint names a node that the workflow does not define
    UnresolvedEndpoint {
        /// The endpoint as written, e.g. `"Width.output"`
        endpoint: String,
        /// The node name that could not be resolved
        node: String,
    },
    /// A connection endpoint is not of the form `Node.Param`
    MalformedEndpoint {
        /// The endpoint as written
        endpoint: String,
    },
    /// The same node name is declared more than once across parameters, components and scripts
    DuplicateNodeName {
        /// The duplicated name
        name: String,
    },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::UnresolvedEndpoint { endpoint, node } => {
                write!(
                    f,
                    "Connection endpoint '{}' references node '{}' which does not exist",
                    endpoint, node
                )
            }
            WorkflowError::MalformedEndpoint { endpoint } => {
                write!(
                    f,
                    "Connection endpoint '{}' is not of the form 'Node.Param'",
                    endpoint
                )
            }
            WorkflowError::DuplicateNodeName { name } => {
                write!(f, "Duplicate node name: '{}'", name)
            }
        }
    }
}

impl std::error::Error for WorkflowError {}
