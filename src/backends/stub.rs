// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::config::BackendKind;
use crate::errors::{DispatchError, DispatchResult};
use crate::protocol::{ExecutionRequest, HostCommand};
use crate::traits::Backend;

/// Records every call so tests can assert on the exact sequence.
pub struct RecordingBackend {
    kind: BackendKind,
    commands: Mutex<Vec<HostCommand>>,
    executions: Mutex<Vec<ExecutionRequest>>,
    fail_after: Option<usize>,
    closes: AtomicUsize,
}

impl RecordingBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            commands: Mutex::new(Vec::new()),
            executions: Mutex::new(Vec::new()),
            fail_after: None,
            closes: AtomicUsize::new(0),
        }
    }

    /// Accept `successes` commands, then fail every later one.
    pub fn failing_after(kind: BackendKind, successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::new(kind)
        }
    }

    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn executions(&self) -> Vec<ExecutionRequest> {
        self.executions.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Backend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn execute(&self, request: ExecutionRequest) -> DispatchResult<Value> {
        let code = request.code().to_string();
        self.executions.lock().unwrap().push(request);
        Ok(json!({ "echo": code }))
    }

    async fn apply(&self, command: HostCommand) -> DispatchResult<Value> {
        let mut commands = self.commands.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if commands.len() >= limit {
                return Err(DispatchError::Transport(format!(
                    "stub refused {}",
                    command.operation()
                )));
            }
        }
        let operation = command.operation();
        commands.push(command);
        Ok(json!({ "ok": true, "operation": operation }))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
