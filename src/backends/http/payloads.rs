// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request bodies for the compute API endpoints.

use serde::Serialize;
use std::path::PathBuf;

use crate::protocol::{HostCommand, NodeId, ParamDecl, Parameters, RunOptions};

pub const EXECUTE_ENDPOINT: &str = "grasshopper";
pub const SCRIPT_COMPONENT_ENDPOINT: &str = "grasshopper/scriptcomponent";
pub const COMPONENT_ENDPOINT: &str = "grasshopper/component";
pub const CONNECT_ENDPOINT: &str = "grasshopper/connect";
pub const SCRIPT_CODE_ENDPOINT: &str = "grasshopper/scriptcode";
pub const RUN_ENDPOINT: &str = "grasshopper/run";

/// Generic code execution. `pointer` is always sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrasshopperPayload<'a> {
    pub algo: &'a str,
    pub pointer: Option<String>,
    pub values: &'a Parameters,
}

impl<'a> GrasshopperPayload<'a> {
    pub fn new(algo: &'a str, values: &'a Parameters) -> Self {
        Self {
            algo,
            pointer: None,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptComponentPayload {
    pub id: NodeId,
    pub name: String,
    pub description: String,
    pub inputs: Vec<ParamDecl>,
    pub outputs: Vec<ParamDecl>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentPayload {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectPayload {
    pub source_id: NodeId,
    pub source_param: String,
    pub target_id: NodeId,
    pub target_param: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptCodePayload {
    pub id: NodeId,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPayload {
    pub file_path: Option<PathBuf>,
    pub save_output: bool,
    pub output_path: Option<PathBuf>,
}

impl From<RunOptions> for RunPayload {
    fn from(options: RunOptions) -> Self {
        Self {
            file_path: options.file_path,
            save_output: options.save_output,
            output_path: options.output_path,
        }
    }
}

/// Body of one auxiliary endpoint call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandPayload {
    ScriptComponent(ScriptComponentPayload),
    Component(ComponentPayload),
    Connect(ConnectPayload),
    ScriptCode(ScriptCodePayload),
    Run(RunPayload),
}

impl CommandPayload {
    pub fn endpoint(&self) -> &'static str {
        match self {
            CommandPayload::ScriptComponent(_) => SCRIPT_COMPONENT_ENDPOINT,
            CommandPayload::Component(_) => COMPONENT_ENDPOINT,
            CommandPayload::Connect(_) => CONNECT_ENDPOINT,
            CommandPayload::ScriptCode(_) => SCRIPT_CODE_ENDPOINT,
            CommandPayload::Run(_) => RUN_ENDPOINT,
        }
    }
}

impl From<HostCommand> for CommandPayload {
    fn from(command: HostCommand) -> Self {
        match command {
            HostCommand::AddComponent {
                id,
                name,
                category,
                parameters,
            } => CommandPayload::Component(ComponentPayload {
                id,
                name,
                kind: category,
                parameters,
            }),
            HostCommand::CreateScriptComponent {
                id,
                description,
                inputs,
                outputs,
                code,
            } => CommandPayload::ScriptComponent(ScriptComponentPayload {
                id,
                name: description.clone(),
                description,
                inputs,
                outputs,
                code,
            }),
            HostCommand::Connect {
                source_id,
                source_param,
                target_id,
                target_param,
            } => CommandPayload::Connect(ConnectPayload {
                source_id,
                source_param,
                target_id,
                target_param,
            }),
            HostCommand::UpdateScriptCode { id, code } => {
                CommandPayload::ScriptCode(ScriptCodePayload { id, code })
            }
            HostCommand::RunDefinition(options) => CommandPayload::Run(options.into()),
        }
    }
}
