//! One-shot backend selection.
//!
//! The platform and flag checks live here and nowhere else. A connection asks
//! once, during `initialize()`, and afterwards dispatches through the chosen
//! [`BackendKind`] without looking at the platform again.

use crate::config::{BackendConfig, BackendMode};
use crate::observability::messages::dispatcher::NativeBindingUnavailable;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// The concrete backend a connection runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// In-process engine bound to a live host document.
    EmbeddedNative,
    /// In-process engine with file reading only.
    EmbeddedPortable,
    /// Out-of-process script listener over TCP.
    Socket,
    /// Remote compute API over HTTPS.
    Http,
}

impl BackendKind {
    pub fn is_embedded(&self) -> bool {
        matches!(self, BackendKind::EmbeddedNative | BackendKind::EmbeddedPortable)
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            BackendKind::EmbeddedNative => "embedded-native",
            BackendKind::EmbeddedPortable => "embedded-portable",
            BackendKind::Socket => "socket",
            BackendKind::Http => "http",
        };
        f.write_str(name)
    }
}

/// Host operating system, as far as backend selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl HostPlatform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => HostPlatform::Windows,
            "macos" => HostPlatform::MacOs,
            "linux" => HostPlatform::Linux,
            _ => HostPlatform::Other,
        }
    }

    /// The native host binding only ships for Windows.
    pub fn supports_native_binding(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }
}

/// Pick the backend for a connection.
///
/// Priority: `use_compute_api`, then an explicit `http`/`socket` mode, then
/// the embedded flavor from platform and `use_native_binding`.
pub fn select_backend(config: &BackendConfig, platform: HostPlatform) -> BackendKind {
    if config.use_compute_api {
        return BackendKind::Http;
    }

    match config.mode {
        Some(BackendMode::Http) => BackendKind::Http,
        Some(BackendMode::Socket) => BackendKind::Socket,
        Some(BackendMode::Embedded) | None => {
            if !config.use_native_binding {
                return BackendKind::EmbeddedPortable;
            }
            if platform.supports_native_binding() {
                BackendKind::EmbeddedNative
            } else {
                NativeBindingUnavailable {
                    platform: &format!("{:?}", platform),
                }
                .log();
                BackendKind::EmbeddedPortable
            }
        }
    }
}
