// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::Instrument;

use crate::backends::embedded::OpenNurbsHeaderReader;
use crate::backends::BackendFactory;
use crate::config::{select_backend, BackendConfig, BackendKind, HostPlatform};
use crate::errors::{DispatchError, DispatchResult};
use crate::observability::messages::dispatcher::{
    BackendSelected, ConnectionClosed, ConnectionInitFailed, ConnectionInitialized,
    OperationDispatched, OperationFailed, OperationRejected,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{
    ExecutionRequest, ExecutionResult, HostCommand, NodeId, NodePrefix, ParamDecl, Parameters,
    RunOptions,
};
use crate::traits::{Backend, Capability, ModelReader};

/// Lifecycle of a [`Connection`].
///
/// `Uninitialized -> Initializing -> Connected -> Closed`. A failed
/// initialization returns to `Uninitialized`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Initializing,
    Connected,
    Closed,
}

/// The single entry point for dispatching operations to a backend.
///
/// A connection selects its backend once in [`initialize`](Self::initialize)
/// and keeps it until [`close`](Self::close). Every operation returns an
/// [`ExecutionResult`]; none of them panics or returns a raw error.
///
/// # Example
/// ```rust
/// use grasshopper_dispatch::config::BackendConfig;
/// use grasshopper_dispatch::dispatcher::Connection;
/// use grasshopper_dispatch::protocol::Parameters;
/// use serde_json::json;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let mut connection = Connection::new(BackendConfig::default());
///     connection.initialize().unwrap();
///
///     let result = connection.execute_code("let result = 6 * 7;", Parameters::new()).await;
///     assert!(result.is_success());
///     assert_eq!(result.data(), &json!(42));
///
///     connection.close().await;
/// });
/// ```
pub struct Connection {
    config: BackendConfig,
    platform: HostPlatform,
    reader: Arc<dyn ModelReader>,
    state: ConnectionState,
    backend: Option<Arc<dyn Backend>>,
}

impl Connection {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            platform: HostPlatform::current(),
            reader: Arc::new(OpenNurbsHeaderReader::new()),
            state: ConnectionState::Uninitialized,
            backend: None,
        }
    }

    /// Override the detected host platform.
    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the default header-only model reader.
    pub fn with_model_reader(mut self, reader: Arc<dyn ModelReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(|b| b.kind())
    }

    fn ensure_initializable(&self) -> DispatchResult<Option<BackendKind>> {
        match self.state {
            ConnectionState::Closed => {
                let error = DispatchError::NotConnected;
                OperationRejected {
                    operation: "initialize",
                    reason: "connection is closed",
                }
                .log();
                Err(error)
            }
            ConnectionState::Connected => Ok(self.backend_kind()),
            _ => Ok(None),
        }
    }

    /// Select and build the backend. Calling it again while connected is a no-op.
    pub fn initialize(&mut self) -> DispatchResult<BackendKind> {
        if let Some(kind) = self.ensure_initializable()? {
            return Ok(kind);
        }

        self.state = ConnectionState::Initializing;
        let started = Instant::now();

        let kind = select_backend(&self.config, self.platform);
        let kind_name = kind.to_string();
        BackendSelected {
            backend: &kind_name,
            platform: &format!("{:?}", self.platform),
        }
        .log();

        match BackendFactory::create_backend(kind, &self.config, self.reader.clone()) {
            Ok(backend) => {
                self.backend = Some(backend);
                self.state = ConnectionState::Connected;
                ConnectionInitialized {
                    backend: &kind_name,
                    duration: started.elapsed(),
                }
                .log();
                Ok(kind)
            }
            Err(error) => {
                self.state = ConnectionState::Uninitialized;
                ConnectionInitFailed {
                    backend: &kind_name,
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    /// Initialize with an already-built backend instead of selecting one.
    pub fn initialize_with(&mut self, backend: Arc<dyn Backend>) -> DispatchResult<BackendKind> {
        if let Some(kind) = self.ensure_initializable()? {
            return Ok(kind);
        }

        let kind = backend.kind();
        self.backend = Some(backend);
        self.state = ConnectionState::Connected;
        ConnectionInitialized {
            backend: &kind.to_string(),
            duration: std::time::Duration::ZERO,
        }
        .log();
        Ok(kind)
    }

    /// Release the backend. Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(backend) = self.backend.take() {
            backend.close().await;
            ConnectionClosed {
                backend: &backend.kind().to_string(),
            }
            .log();
        }
        self.state = ConnectionState::Closed;
    }

    fn backend_for(&self, operation: &str, capability: Capability) -> DispatchResult<&Arc<dyn Backend>> {
        let backend = match (self.state, &self.backend) {
            (ConnectionState::Connected, Some(backend)) => backend,
            _ => {
                let error = DispatchError::NotConnected;
                OperationRejected {
                    operation,
                    reason: &error.to_string(),
                }
                .log();
                return Err(error);
            }
        };

        if !backend.capabilities().supports(capability) {
            let error = DispatchError::unsupported(operation, backend.kind(), capability);
            OperationRejected {
                operation,
                reason: &error.to_string(),
            }
            .log();
            return Err(error);
        }

        OperationDispatched {
            operation,
            backend: &backend.kind().to_string(),
        }
        .log();
        Ok(backend)
    }

    fn finish(operation: &str, result: DispatchResult<Value>) -> ExecutionResult {
        if let Err(error) = &result {
            if !matches!(
                error,
                DispatchError::NotConnected | DispatchError::UnsupportedOperation { .. }
            ) {
                OperationFailed { operation, error }.log();
            }
        }
        ExecutionResult::from_result(result)
    }

    /// Run one operation inside its dispatch span and wrap the outcome.
    async fn traced<F>(&self, operation: &str, work: F) -> ExecutionResult
    where
        F: Future<Output = DispatchResult<Value>>,
    {
        let backend = self
            .backend_kind()
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "none".to_string());
        let span = OperationDispatched {
            operation,
            backend: &backend,
        }
        .span("dispatch");

        let result = work.instrument(span).await;
        Self::finish(operation, result)
    }

    fn reject_blank(value: &str, what: &str) -> DispatchResult<()> {
        if value.trim().is_empty() {
            return Err(DispatchError::InvalidInput(format!("{} must not be empty", what)));
        }
        Ok(())
    }

    fn validate_command(command: &HostCommand) -> DispatchResult<()> {
        match command {
            HostCommand::AddComponent { name, .. } => Self::reject_blank(name, "Component name"),
            HostCommand::CreateScriptComponent { description, .. } => {
                Self::reject_blank(description, "Script description")
            }
            HostCommand::Connect {
                source_param,
                target_param,
                ..
            } => {
                Self::reject_blank(source_param, "Source parameter")?;
                Self::reject_blank(target_param, "Target parameter")
            }
            HostCommand::UpdateScriptCode { .. } | HostCommand::RunDefinition(_) => Ok(()),
        }
    }

    /// Send a graph command. Node-creating commands pair the response with the new id.
    async fn apply(&self, command: HostCommand) -> DispatchResult<Value> {
        let backend = self.backend_for(command.operation(), Capability::GraphMutation)?;
        Self::validate_command(&command)?;

        match command.created_id().cloned() {
            Some(id) => {
                let response = backend.apply(command).await?;
                Ok(json!({ "component_id": id, "response": response }))
            }
            None => backend.apply(command).await,
        }
    }

    /// Run a code snippet with parameter bindings.
    pub async fn execute_code(&self, code: &str, parameters: Parameters) -> ExecutionResult {
        self.traced("execute_code", async {
            let backend = self.backend_for("execute_code", Capability::Execute)?;
            backend.execute(ExecutionRequest::new(code, parameters)).await
        })
        .await
    }

    /// Summarize a model file.
    pub async fn read_file(&self, path: &Path) -> ExecutionResult {
        self.traced("read_file", async {
            let backend = self.backend_for("read_file", Capability::ReadModel)?;
            let summary = backend.read_model(path).await?;
            serde_json::to_value(summary)
                .map_err(|e| DispatchError::fault(format!("Failed to encode model summary: {}", e)))
        })
        .await
    }

    /// Describe one object of a model file by index.
    ///
    /// Readers that only understand the file header cannot enumerate
    /// objects; for those this reports `UnsupportedOperation` rather than an
    /// out-of-range index.
    pub async fn read_object(&self, path: &Path, index: usize) -> ExecutionResult {
        self.traced("read_object", async {
            let backend = self.backend_for("read_object", Capability::ReadModel)?;
            let summary = backend.read_model(path).await?;
            if summary.object_count.is_none() && summary.objects.is_empty() {
                return Err(DispatchError::UnsupportedOperation {
                    operation: "read_object".to_string(),
                    backend: backend.kind().to_string(),
                    required: "a model reader that lists objects".to_string(),
                });
            }

            let count = summary.object_count.unwrap_or(summary.objects.len());
            let object = summary.objects.get(index).ok_or_else(|| {
                DispatchError::NotFound(format!(
                    "Invalid object index {}. File has {} objects.",
                    index, count
                ))
            })?;
            serde_json::to_value(object)
                .map_err(|e| DispatchError::fault(format!("Failed to encode object: {}", e)))
        })
        .await
    }

    /// Create a script node; its id has the `py_` prefix.
    pub async fn create_script_node(
        &self,
        description: &str,
        inputs: Vec<ParamDecl>,
        outputs: Vec<ParamDecl>,
        code: &str,
    ) -> ExecutionResult {
        self.traced(
            "create_script_node",
            self.apply(HostCommand::CreateScriptComponent {
                id: NodeId::generate(NodePrefix::Script),
                description: description.to_string(),
                inputs,
                outputs,
                code: code.to_string(),
            }),
        )
        .await
    }

    /// Add a library component; its id has the `comp_` prefix.
    pub async fn add_node(&self, name: &str, category: &str, params: Parameters) -> ExecutionResult {
        self.traced(
            "add_node",
            self.apply(HostCommand::AddComponent {
                id: NodeId::generate(NodePrefix::Component),
                name: name.to_string(),
                category: category.to_string(),
                parameters: params,
            }),
        )
        .await
    }

    /// Wire `source.source_param` into `target.target_param`.
    pub async fn connect_nodes(
        &self,
        source: &NodeId,
        source_param: &str,
        target: &NodeId,
        target_param: &str,
    ) -> ExecutionResult {
        self.traced(
            "connect_nodes",
            self.apply(HostCommand::Connect {
                source_id: source.clone(),
                source_param: source_param.to_string(),
                target_id: target.clone(),
                target_param: target_param.to_string(),
            }),
        )
        .await
    }

    /// Replace the code of an existing script node.
    pub async fn edit_script_node(&self, id: &NodeId, code: &str) -> ExecutionResult {
        self.traced(
            "edit_script_node",
            self.apply(HostCommand::UpdateScriptCode {
                id: id.clone(),
                code: code.to_string(),
            }),
        )
        .await
    }

    /// Evaluate the current (or a given) definition, optionally saving it.
    pub async fn run_definition(&self, options: RunOptions) -> ExecutionResult {
        self.traced("run_definition", self.apply(HostCommand::RunDefinition(options)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingBackend;
    use crate::protocol::ErrorKind;

    #[tokio::test]
    async fn test_state_transitions() {
        let mut connection = Connection::new(BackendConfig::default());
        assert_eq!(connection.state(), ConnectionState::Uninitialized);
        assert_eq!(connection.backend_kind(), None);

        let kind = connection
            .initialize_with(Arc::new(RecordingBackend::new(BackendKind::Socket)))
            .unwrap();
        assert_eq!(kind, BackendKind::Socket);
        assert!(connection.is_connected());

        connection.close().await;
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(connection.initialize().is_err());
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_while_connected() {
        let mut connection = Connection::new(BackendConfig::default());
        let first = connection.initialize().unwrap();
        let second = connection.initialize().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_blank_inputs_are_rejected_before_the_backend() {
        let backend = Arc::new(RecordingBackend::new(BackendKind::Http));
        let mut connection = Connection::new(BackendConfig::default());
        connection.initialize_with(backend.clone()).unwrap();

        let added = connection.add_node(" ", "Params", Parameters::new()).await;
        let connected = connection
            .connect_nodes(&NodeId::from("comp_a"), "", &NodeId::from("comp_b"), "x")
            .await;

        assert_eq!(added.kind, Some(ErrorKind::InvalidInput));
        assert_eq!(connected.kind, Some(ErrorKind::InvalidInput));
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn test_blank_inputs_report_not_connected_outside_lifecycle() {
        let mut connection = Connection::new(BackendConfig::default());
        let a = NodeId::from("comp_a");
        let b = NodeId::from("comp_b");

        for phase in ["before initialize", "after close"] {
            let results = vec![
                connection.add_node("", "Params", Parameters::new()).await,
                connection.create_script_node("  ", vec![], vec![], "y = 1").await,
                connection.connect_nodes(&a, "", &b, "").await,
            ];
            for result in results {
                assert_eq!(result.kind, Some(ErrorKind::NotConnected), "{}", phase);
            }

            connection
                .initialize_with(Arc::new(RecordingBackend::new(BackendKind::Socket)))
                .ok();
            connection.close().await;
        }
    }
}
