// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Embedded execution backend.
//!
//! Code runs in-process on a rhai engine. Two flavors exist:
//!
//! - **Native**: owns a live host [`Document`], exposes read-only host
//!   functions to scripts and applies graph commands to the document.
//! - **Portable**: execution and model file reading only.
//!
//! Both flavors read model files through a [`ModelReader`].

pub mod document;
pub mod engine;
pub mod model;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rhai::Engine;
use serde_json::Value;

use crate::config::BackendKind;
use crate::errors::{DispatchError, DispatchResult};
use crate::protocol::{ExecutionRequest, HostCommand, ModelSummary};
use crate::traits::{Backend, Capability, ModelReader};

pub use document::{Document, SharedDocument};
pub use model::OpenNurbsHeaderReader;

pub struct EmbeddedBackend {
    kind: BackendKind,
    engine: Arc<Engine>,
    document: Option<SharedDocument>,
    reader: Arc<dyn ModelReader>,
}

impl EmbeddedBackend {
    /// Native flavor bound to a fresh host document.
    pub fn native(install_path: Option<PathBuf>, reader: Arc<dyn ModelReader>) -> Self {
        let document = Document::shared();
        let install_path = install_path.map(|p| p.display().to_string());
        Self {
            kind: BackendKind::EmbeddedNative,
            engine: Arc::new(engine::build_engine(Some(document.clone()), install_path)),
            document: Some(document),
            reader,
        }
    }

    pub fn portable(reader: Arc<dyn ModelReader>) -> Self {
        Self {
            kind: BackendKind::EmbeddedPortable,
            engine: Arc::new(engine::build_engine(None, None)),
            document: None,
            reader,
        }
    }

    /// The live host document, when running natively.
    pub fn document(&self) -> Option<&SharedDocument> {
        self.document.as_ref()
    }

    fn flavor(&self) -> &'static str {
        match self.kind {
            BackendKind::EmbeddedNative => "embedded-native",
            _ => "embedded-portable",
        }
    }
}

#[async_trait]
impl Backend for EmbeddedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn execute(&self, request: ExecutionRequest) -> DispatchResult<Value> {
        engine::evaluate_blocking(self.engine.clone(), self.flavor(), request).await
    }

    async fn apply(&self, command: HostCommand) -> DispatchResult<Value> {
        let document = self.document.as_ref().ok_or_else(|| {
            DispatchError::unsupported(command.operation(), self.kind, Capability::GraphMutation)
        })?;

        let mut document = document
            .write()
            .map_err(|_| DispatchError::fault("Host document lock poisoned"))?;
        document.apply(command)
    }

    async fn read_model(&self, path: &Path) -> DispatchResult<ModelSummary> {
        let reader = self.reader.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || reader.read_model(&path))
            .await
            .map_err(|e| DispatchError::fault(format!("Model read task aborted: {}", e)))?
    }
}
