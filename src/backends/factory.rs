use std::sync::Arc;

use crate::backends::embedded::EmbeddedBackend;
use crate::backends::http::HttpBackend;
use crate::backends::socket::SocketBackend;
use crate::config::{BackendConfig, BackendKind};
use crate::errors::DispatchResult;
use crate::traits::{Backend, ModelReader};

/// Creates backend instances from configuration.
pub struct BackendFactory;

impl BackendFactory {
    /// Validate the configuration for `kind` and build the backend.
    ///
    /// - `EmbeddedNative` -> [`EmbeddedBackend::native`] (requires an install path)
    /// - `EmbeddedPortable` -> [`EmbeddedBackend::portable`]
    /// - `Socket` -> [`SocketBackend`] (requires host and port)
    /// - `Http` -> [`HttpBackend`] (requires URL and API key)
    pub fn create_backend(
        kind: BackendKind,
        config: &BackendConfig,
        reader: Arc<dyn ModelReader>,
    ) -> DispatchResult<Arc<dyn Backend>> {
        config.validate_for(kind)?;

        match kind {
            BackendKind::EmbeddedNative => Ok(Arc::new(EmbeddedBackend::native(
                config.install_path.clone(),
                reader,
            ))),
            BackendKind::EmbeddedPortable => Ok(Arc::new(EmbeddedBackend::portable(reader))),
            BackendKind::Socket => Ok(Arc::new(SocketBackend::from_config(config))),
            BackendKind::Http => Ok(Arc::new(HttpBackend::from_config(config)?)),
        }
    }
}
