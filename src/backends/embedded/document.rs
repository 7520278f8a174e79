// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process host definition used by the native embedded backend.
//!
//! The document keeps components and wires, applies structured
//! [`HostCommand`]s, and persists itself as JSON. Solving does not compute
//! geometry; it reports, per output, how many downstream inputs consume it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::errors::{DispatchError, DispatchResult};
use crate::protocol::{HostCommand, NodeId, ParamDecl, Parameters, RunOptions};

/// Shared handle to the document owned by a native backend.
pub type SharedDocument = Arc<RwLock<Document>>;

const DEFAULT_OUTPUT: &str = "output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Plugin,
    Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    pub category: String,
    pub kind: ComponentKind,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub inputs: Vec<ParamDecl>,
    #[serde(default)]
    pub outputs: Vec<ParamDecl>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ComponentRecord {
    fn declares_input(&self, param: &str) -> bool {
        self.inputs.is_empty() || self.inputs.iter().any(|p| p.name == param)
    }

    fn declares_output(&self, param: &str) -> bool {
        self.outputs.is_empty() || self.outputs.iter().any(|p| p.name == param)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub source_id: NodeId,
    pub source_param: String,
    pub target_id: NodeId,
    pub target_param: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    components: Vec<ComponentRecord>,
    #[serde(default)]
    wires: Vec<Wire>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDocument {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn component_ids(&self) -> Vec<String> {
        self.components.iter().map(|c| c.id.to_string()).collect()
    }

    pub fn component(&self, id: &NodeId) -> Option<&ComponentRecord> {
        self.components.iter().find(|c| &c.id == id)
    }

    fn insert(&mut self, record: ComponentRecord) -> DispatchResult<Value> {
        if record.name.trim().is_empty() {
            return Err(DispatchError::InvalidInput(
                "Component name must not be empty".to_string(),
            ));
        }
        if self.component(&record.id).is_some() {
            return Err(DispatchError::InvalidInput(format!(
                "Component id already exists: {}",
                record.id
            )));
        }

        let response = json!({
            "id": record.id,
            "name": record.name,
            "category": record.category,
        });
        self.components.push(record);
        Ok(response)
    }

    fn connect(&mut self, wire: Wire) -> DispatchResult<Value> {
        let source = self
            .component(&wire.source_id)
            .ok_or_else(|| DispatchError::NotFound(format!("Component not found: {}", wire.source_id)))?;
        if !source.declares_output(&wire.source_param) {
            return Err(DispatchError::NotFound(format!(
                "Output '{}' not found on component {}",
                wire.source_param, wire.source_id
            )));
        }

        let target = self
            .component(&wire.target_id)
            .ok_or_else(|| DispatchError::NotFound(format!("Component not found: {}", wire.target_id)))?;
        if !target.declares_input(&wire.target_param) {
            return Err(DispatchError::NotFound(format!(
                "Input '{}' not found on component {}",
                wire.target_param, wire.target_id
            )));
        }

        let response = json!({
            "source": format!("{}.{}", wire.source_id, wire.source_param),
            "target": format!("{}.{}", wire.target_id, wire.target_param),
        });
        self.wires.push(wire);
        Ok(response)
    }

    fn update_script(&mut self, id: &NodeId, code: String) -> DispatchResult<Value> {
        let record = self
            .components
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DispatchError::NotFound(format!("Component not found: {}", id)))?;
        if record.kind != ComponentKind::Script {
            return Err(DispatchError::NotFound(format!(
                "Component {} is not a script component",
                id
            )));
        }

        let response = json!({
            "component_name": record.nickname.as_deref().unwrap_or(&record.name),
            "code_length": code.chars().count(),
        });
        record.code = Some(code);
        Ok(response)
    }

    /// Count consumers for every output of every component.
    pub fn solve(&self) -> Vec<Value> {
        let mut summary = Vec::new();

        for component in &self.components {
            let mut outputs: Vec<&str> = component.outputs.iter().map(|p| p.name.as_str()).collect();
            if outputs.is_empty() {
                outputs.push(DEFAULT_OUTPUT);
            }

            for output in outputs {
                let data_count = self
                    .wires
                    .iter()
                    .filter(|w| w.source_id == component.id && w.source_param == output)
                    .count();
                summary.push(json!({
                    "component": component.nickname.as_deref().unwrap_or(&component.name),
                    "param": output,
                    "data_count": data_count,
                }));
            }
        }

        summary
    }

    pub fn save(&self, path: &Path) -> DispatchResult<()> {
        let encoded = serde_json::to_string_pretty(self)
            .map_err(|e| DispatchError::fault(format!("Failed to encode definition: {}", e)))?;
        std::fs::write(path, encoded).map_err(|e| {
            DispatchError::fault(format!("Failed to save definition to {}: {}", path.display(), e))
        })
    }

    pub fn load(path: &Path) -> DispatchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DispatchError::NotFound(format!("Definition file not found: {}", path.display()))
            }
            _ => DispatchError::fault(format!("Failed to read {}: {}", path.display(), e)),
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DispatchError::InvalidInput(format!("{} is not a definition document: {}", path.display(), e))
        })
    }

    fn run(&mut self, options: RunOptions) -> DispatchResult<Value> {
        if options.save_output && options.output_path.is_none() {
            return Err(DispatchError::InvalidInput(
                "save_output requires an output_path".to_string(),
            ));
        }

        if let Some(file_path) = &options.file_path {
            *self = Self::load(file_path)?;
        }

        let started = Instant::now();
        let output_summary = self.solve();
        let execution_time = started.elapsed().as_secs_f64();

        let mut response = json!({
            "execution_time": execution_time,
            "output_summary": output_summary,
        });

        if let (true, Some(output_path)) = (options.save_output, &options.output_path) {
            self.save(output_path)?;
            response["saved_to"] = json!(output_path);
        }

        Ok(response)
    }

    /// Apply one structured command.
    pub fn apply(&mut self, command: HostCommand) -> DispatchResult<Value> {
        match command {
            HostCommand::AddComponent {
                id,
                name,
                category,
                parameters,
            } => {
                let nickname = parameters
                    .get("NickName")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.insert(ComponentRecord {
                    id,
                    name,
                    nickname,
                    category,
                    kind: ComponentKind::Plugin,
                    parameters,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                    code: None,
                })
            }
            HostCommand::CreateScriptComponent {
                id,
                description,
                inputs,
                outputs,
                code,
            } => self.insert(ComponentRecord {
                id,
                name: description,
                nickname: None,
                category: "Script".to_string(),
                kind: ComponentKind::Script,
                parameters: Parameters::new(),
                inputs,
                outputs,
                code: Some(code),
            }),
            HostCommand::Connect {
                source_id,
                source_param,
                target_id,
                target_param,
            } => self.connect(Wire {
                source_id,
                source_param,
                target_id,
                target_param,
            }),
            HostCommand::UpdateScriptCode { id, code } => self.update_script(&id, code),
            HostCommand::RunDefinition(options) => self.run(options),
        }
    }
}
