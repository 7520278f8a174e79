// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::dispatcher::Connection;
use crate::errors::DispatchError;
use crate::protocol::{ExecutionResult, NodeId, Parameters, RunOptions};

use super::node::PARAMS_CATEGORY;

/// Parameter component able to carry `value`, if any.
fn input_component(value: &Value) -> Option<&'static str> {
    match value {
        Value::Bool(_) => Some("Boolean"),
        Value::Number(_) => Some("Number"),
        Value::String(_) => Some("Text"),
        _ => None,
    }
}

fn created_id(envelope: &ExecutionResult) -> Option<NodeId> {
    envelope
        .component_id()
        .filter(|_| envelope.is_success())
        .map(NodeId::from)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        _ => "scalar",
    }
}

/// Add a plugin component, feed each input through its own parameter node
/// and run the definition. `file_path` is opened and run first when given.
pub async fn invoke_plugin(
    connection: &Connection,
    plugin: &str,
    component: &str,
    inputs: &Parameters,
    file_path: Option<&Path>,
) -> ExecutionResult {
    if let Some(path) = file_path {
        let opened = connection.run_definition(RunOptions::open(path)).await;
        if opened.is_error() {
            return opened;
        }
    }

    let added = connection.add_node(component, plugin, Parameters::new()).await;
    let Some(plugin_id) = created_id(&added) else {
        return added;
    };

    let mut input_ids = Map::new();
    for (name, value) in inputs {
        let Some(kind) = input_component(value) else {
            return ExecutionResult::failure(&DispatchError::InvalidInput(format!(
                "Unsupported input type for {}: {}",
                name,
                type_name(value)
            )));
        };

        let mut params = Parameters::new();
        params.insert("NickName".to_string(), json!(name));
        params.insert("Value".to_string(), value.clone());

        let input = connection.add_node(kind, PARAMS_CATEGORY, params).await;
        let Some(input_id) = created_id(&input) else {
            return input;
        };

        let wired = connection
            .connect_nodes(&input_id, "output", &plugin_id, name)
            .await;
        if wired.is_error() {
            return wired;
        }
        input_ids.insert(name.clone(), json!(input_id));
    }

    let run = connection.run_definition(RunOptions::current()).await;
    if run.is_error() {
        return run;
    }

    ExecutionResult::success(json!({
        "plugin": plugin,
        "component": component,
        "component_id": plugin_id,
        "inputs": input_ids,
        "run": run.data(),
    }))
}

/// Replace the code of script node `id`, opening `file_path` first when given.
pub async fn edit_script_component(
    connection: &Connection,
    file_path: Option<&Path>,
    id: &NodeId,
    code: &str,
) -> ExecutionResult {
    if let Some(path) = file_path {
        let opened = connection.run_definition(RunOptions::open(path)).await;
        if opened.is_error() {
            return opened;
        }
    }

    connection.edit_script_node(id, code).await
}
