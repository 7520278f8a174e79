// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured host commands.
//!
//! Graph mutation and evaluation requests travel as explicit, typed fields and
//! are serialized by the transport layer. No backend ever builds host source
//! text by interpolating caller values into a code template.

use crate::protocol::{NodeId, Parameters};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_param_type() -> String {
    "object".to_string()
}

/// Declaration of a script node input or output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type", default = "default_param_type")]
    pub type_hint: String,
    #[serde(default)]
    pub description: String,
}

impl ParamDecl {
    pub fn new(
        name: impl Into<String>,
        type_hint: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_hint: type_hint.into(),
            description: description.into(),
        }
    }
}

/// Options for evaluating (and optionally persisting) a definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Definition to open first; `None` evaluates the current definition.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub save_output: bool,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl RunOptions {
    pub fn current() -> Self {
        Self::default()
    }

    pub fn open(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::default()
        }
    }

    pub fn save_to(output_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: None,
            save_output: true,
            output_path: Some(output_path.into()),
        }
    }
}

/// A graph operation addressed to the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    AddComponent {
        id: NodeId,
        name: String,
        category: String,
        parameters: Parameters,
    },
    CreateScriptComponent {
        id: NodeId,
        description: String,
        inputs: Vec<ParamDecl>,
        outputs: Vec<ParamDecl>,
        code: String,
    },
    Connect {
        source_id: NodeId,
        source_param: String,
        target_id: NodeId,
        target_param: String,
    },
    UpdateScriptCode {
        id: NodeId,
        code: String,
    },
    RunDefinition(RunOptions),
}

impl HostCommand {
    /// Dispatcher-level operation name, used in logs and rejection messages.
    pub fn operation(&self) -> &'static str {
        match self {
            HostCommand::AddComponent { .. } => "add_node",
            HostCommand::CreateScriptComponent { .. } => "create_script_node",
            HostCommand::Connect { .. } => "connect_nodes",
            HostCommand::UpdateScriptCode { .. } => "edit_script_node",
            HostCommand::RunDefinition(_) => "run_definition",
        }
    }

    /// The node this command creates, if it creates one.
    pub fn created_id(&self) -> Option<&NodeId> {
        match self {
            HostCommand::AddComponent { id, .. } | HostCommand::CreateScriptComponent { id, .. } => {
                Some(id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commands_are_tagged_by_name() {
        let command = HostCommand::Connect {
            source_id: NodeId::from("comp_00000001"),
            source_param: "output".to_string(),
            target_id: NodeId::from("comp_00000002"),
            target_param: "X Size".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "command": "connect",
                "source_id": "comp_00000001",
                "source_param": "output",
                "target_id": "comp_00000002",
                "target_param": "X Size",
            })
        );
    }

    #[test]
    fn test_run_definition_flattens_options() {
        let command = HostCommand::RunDefinition(RunOptions::save_to("/tmp/out.gh"));
        let encoded = serde_json::to_value(&command).unwrap();

        assert_eq!(encoded["command"], "run_definition");
        assert_eq!(encoded["save_output"], true);
        assert_eq!(encoded["output_path"], "/tmp/out.gh");
    }

    #[test]
    fn test_update_script_code_encoding() {
        let command = HostCommand::UpdateScriptCode {
            id: NodeId::from("py_0000abcd"),
            code: "y = x + 1".to_string(),
        };

        assert_eq!(command.operation(), "edit_script_node");
        assert_eq!(command.created_id(), None);
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"command": "update_script_code", "id": "py_0000abcd", "code": "y = x + 1"})
        );
    }

    #[test]
    fn test_param_decl_type_defaults_to_object() {
        let decl: ParamDecl = serde_json::from_value(json!({"name": "height"})).unwrap();
        assert_eq!(decl.type_hint, "object");
        assert_eq!(decl.description, "");
    }

    #[test]
    fn test_operation_names() {
        let cases = vec![
            (HostCommand::RunDefinition(RunOptions::current()), "run_definition", false),
            (
                HostCommand::AddComponent {
                    id: NodeId::from("comp_1"),
                    name: "Box".to_string(),
                    category: "Surface".to_string(),
                    parameters: Parameters::new(),
                },
                "add_node",
                true,
            ),
        ];

        for (command, operation, creates) in cases {
            assert_eq!(command.operation(), operation);
            assert_eq!(command.created_id().is_some(), creates);
        }
    }
}
