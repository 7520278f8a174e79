// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script engine setup and per-call evaluation.
//!
//! The engine itself is immutable after construction and shared between
//! calls. Every call gets a brand-new [`Scope`] holding:
//!
//! - `backend` - the flavor name, as a constant
//! - `parameters` - the full parameter map
//! - one variable per parameter whose name is a valid identifier
//! - `result` - pre-declared as `()`, read back after the run
//!
//! Nothing a script declares survives into the next call.

use std::sync::Arc;
use std::time::Instant;

use rhai::{Dynamic, Engine, EvalAltResult, Scope};
use serde_json::Value;

use crate::backends::embedded::document::SharedDocument;
use crate::config::consts::SCRIPT_MAX_OPERATIONS;
use crate::errors::{DispatchError, DispatchResult};
use crate::observability::messages::transport::ScriptEvaluated;
use crate::observability::messages::StructuredLog;
use crate::protocol::{ExecutionRequest, Parameters};

const RESULT_BINDING: &str = "result";
const PARAMETERS_BINDING: &str = "parameters";
const BACKEND_BINDING: &str = "backend";

/// Build an engine with safety limits and, when a host document is given,
/// read-only host functions over it.
pub fn build_engine(document: Option<SharedDocument>, install_path: Option<String>) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_expr_depths(64, 64);
    engine.set_max_call_levels(64);
    engine.set_max_operations(SCRIPT_MAX_OPERATIONS);
    engine.set_max_string_size(1_000_000);
    engine.set_max_array_size(100_000);
    engine.set_max_map_size(100_000);

    if let Some(document) = document {
        {
            let doc = document.clone();
            engine.register_fn("component_count", move || -> i64 {
                doc.read().map(|d| d.component_count() as i64).unwrap_or(0)
            });
        }
        {
            let doc = document.clone();
            engine.register_fn("component_ids", move || -> rhai::Array {
                doc.read()
                    .map(|d| d.component_ids().into_iter().map(Dynamic::from).collect())
                    .unwrap_or_default()
            });
        }
        {
            let doc = document;
            engine.register_fn("wire_count", move || -> i64 {
                doc.read().map(|d| d.wire_count() as i64).unwrap_or(0)
            });
        }
    }

    let install_path = install_path.unwrap_or_default();
    engine.register_fn("install_path", move || -> String { install_path.clone() });

    engine
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_reserved(name: &str) -> bool {
    matches!(name, RESULT_BINDING | PARAMETERS_BINDING | BACKEND_BINDING)
}

fn fault_from(error: &EvalAltResult) -> DispatchError {
    DispatchError::ExecutionFault {
        message: error.to_string(),
        trace: Some(format!("{:?} (at {})", error, error.position())),
    }
}

fn to_dynamic(value: &Value) -> DispatchResult<Dynamic> {
    rhai::serde::to_dynamic(value)
        .map_err(|e| DispatchError::InvalidInput(format!("Unsupported parameter value: {}", e)))
}

/// Prepare a fresh scope for one call.
fn bind_scope(flavor: &str, parameters: &Parameters) -> DispatchResult<Scope<'static>> {
    let mut scope = Scope::new();
    scope.push_constant(BACKEND_BINDING, flavor.to_string());

    let all = Value::Object(parameters.clone());
    scope.push_dynamic(PARAMETERS_BINDING, to_dynamic(&all)?);

    for (name, value) in parameters {
        if is_identifier(name) && !is_reserved(name) {
            scope.push_dynamic(name.clone(), to_dynamic(value)?);
        }
    }

    scope.push(RESULT_BINDING, ());
    Ok(scope)
}

/// Run one request to completion on the calling thread.
pub fn evaluate(engine: &Engine, flavor: &str, request: &ExecutionRequest) -> DispatchResult<Value> {
    let mut scope = bind_scope(flavor, request.parameters())?;
    let started = Instant::now();

    let outcome = engine.run_with_scope(&mut scope, request.code());

    ScriptEvaluated {
        backend: flavor,
        succeeded: outcome.is_ok(),
        duration: started.elapsed(),
    }
    .log();

    if let Err(error) = outcome {
        return Err(fault_from(&error));
    }

    let result = scope
        .get_value::<Dynamic>(RESULT_BINDING)
        .unwrap_or(Dynamic::UNIT);

    rhai::serde::from_dynamic::<Value>(&result)
        .map_err(|e| DispatchError::fault(format!("Result is not representable as JSON: {}", e)))
}

/// Run one request on the blocking pool.
pub async fn evaluate_blocking(
    engine: Arc<Engine>,
    flavor: &'static str,
    request: ExecutionRequest,
) -> DispatchResult<Value> {
    tokio::task::spawn_blocking(move || evaluate(&engine, flavor, &request))
        .await
        .map_err(|e| DispatchError::fault(format!("Script task aborted: {}", e)))?
}
