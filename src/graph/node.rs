use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::WorkflowError;
use crate::protocol::{NodeId, ParamDecl, Parameters};

pub const SLIDER_COMPONENT: &str = "Number Slider";
pub const PARAMS_CATEGORY: &str = "Params";
pub const SCRIPT_CATEGORY: &str = "Script";

/// A node that exists on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub category: String,
    pub params: Parameters,
}

/// Parameter or processing node to be created from a library component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub component: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl NodeSpec {
    /// A number slider parameter holding `value`.
    pub fn slider(value: Value) -> Self {
        Self {
            component: SLIDER_COMPONENT.to_string(),
            category: PARAMS_CATEGORY.to_string(),
            value: Some(value),
        }
    }

    pub fn component(component: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            category: category.into(),
            value: None,
        }
    }

    /// Creation parameters for a node of this spec named `name`.
    pub fn node_params(&self, name: &str) -> Parameters {
        let mut params = Parameters::new();
        params.insert("NickName".to_string(), json!(name));
        if let Some(value) = &self.value {
            params.insert("Value".to_string(), value.clone());
        }
        params
    }
}

/// Script node with declared inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSpec {
    pub inputs: Vec<ParamDecl>,
    pub outputs: Vec<ParamDecl>,
    pub code: String,
}

/// `Node.Param` reference used by workflow connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub node: &'a str,
    pub param: &'a str,
}

impl<'a> Endpoint<'a> {
    /// Split at the first `.`; both halves must be non-empty.
    pub fn parse(endpoint: &'a str) -> Result<Self, WorkflowError> {
        match endpoint.split_once('.') {
            Some((node, param)) if !node.is_empty() && !param.is_empty() => Ok(Self { node, param }),
            _ => Err(WorkflowError::MalformedEndpoint {
                endpoint: endpoint.to_string(),
            }),
        }
    }
}

/// Directed edge between two node parameters, by node name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub from: String,
    pub to: String,
}

impl ConnectionSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn source(&self) -> Result<Endpoint<'_>, WorkflowError> {
        Endpoint::parse(&self.from)
    }

    pub fn target(&self) -> Result<Endpoint<'_>, WorkflowError> {
        Endpoint::parse(&self.to)
    }
}
