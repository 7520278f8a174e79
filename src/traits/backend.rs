use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::config::BackendKind;
use crate::errors::{DispatchError, DispatchResult};
use crate::protocol::{ExecutionRequest, HostCommand, ModelSummary};

/// What a backend can be asked to do beyond plain execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Execute,
    ReadModel,
    GraphMutation,
}

impl Capability {
    /// Human-readable list of the backends that provide this capability.
    pub fn providers(&self) -> &'static str {
        match self {
            Capability::Execute => "any backend",
            Capability::ReadModel => "an embedded backend (embedded-native or embedded-portable)",
            Capability::GraphMutation => {
                "a graph-capable backend (socket, http or embedded-native)"
            }
        }
    }
}

/// The capability set of one backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub execute: bool,
    pub read_model: bool,
    pub graph: bool,
}

impl Capabilities {
    pub fn for_kind(kind: BackendKind) -> Self {
        Self {
            execute: true,
            read_model: kind.is_embedded(),
            graph: kind != BackendKind::EmbeddedPortable,
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Execute => self.execute,
            Capability::ReadModel => self.read_model,
            Capability::GraphMutation => self.graph,
        }
    }
}

/// One execution strategy behind a connection.
///
/// Backends return raw payloads or a [`DispatchError`]; wrapping into an
/// envelope happens in the dispatcher. The default `apply` and `read_model`
/// reject the call, so a backend only overrides what its capability set
/// advertises.
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn capabilities(&self) -> Capabilities {
        Capabilities::for_kind(self.kind())
    }

    /// Run a code snippet with parameter bindings and return its `result`.
    async fn execute(&self, request: ExecutionRequest) -> DispatchResult<Value>;

    /// Apply a structured graph command to the host definition.
    async fn apply(&self, command: HostCommand) -> DispatchResult<Value> {
        Err(DispatchError::unsupported(
            command.operation(),
            self.kind(),
            Capability::GraphMutation,
        ))
    }

    async fn read_model(&self, _path: &Path) -> DispatchResult<ModelSummary> {
        Err(DispatchError::unsupported(
            "read_file",
            self.kind(),
            Capability::ReadModel,
        ))
    }

    /// Release backend resources. Called once by the owning connection.
    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_matrix() {
        let cases = vec![
            (BackendKind::EmbeddedNative, true, true, true),
            (BackendKind::EmbeddedPortable, true, true, false),
            (BackendKind::Socket, true, false, true),
            (BackendKind::Http, true, false, true),
        ];

        for (kind, execute, read_model, graph) in cases {
            let caps = Capabilities::for_kind(kind);
            assert_eq!(caps.supports(Capability::Execute), execute, "{}", kind);
            assert_eq!(caps.supports(Capability::ReadModel), read_model, "{}", kind);
            assert_eq!(caps.supports(Capability::GraphMutation), graph, "{}", kind);
        }
    }
}
