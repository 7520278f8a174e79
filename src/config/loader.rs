// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LISTENER_HOST, DEFAULT_LISTENER_PORT,
    DEFAULT_READ_BUFFER_BYTES, DEFAULT_SCRIPT_SUFFIX, DEFAULT_SOCKET_TIMEOUT_SECS,
};
use crate::config::BackendKind;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const ENV_BACKEND_MODE: &str = "BACKEND_MODE";
const ENV_USE_COMPUTE_API: &str = "USE_COMPUTE_API";
const ENV_USE_NATIVE_BINDING: &str = "USE_NATIVE_BINDING";
const ENV_USE_RHINO3DM: &str = "USE_RHINO3DM";
const ENV_COMPUTE_URL: &str = "COMPUTE_URL";
const ENV_COMPUTE_API_KEY: &str = "COMPUTE_API_KEY";
const ENV_RHINO_PATH: &str = "RHINO_PATH";
const ENV_NATIVE_INSTALL_PATH: &str = "NATIVE_INSTALL_PATH";
const ENV_LISTENER_HOST: &str = "LISTENER_HOST";
const ENV_LISTENER_PORT: &str = "LISTENER_PORT";
const ENV_SOCKET_TIMEOUT_SECS: &str = "SOCKET_TIMEOUT_SECS";
const ENV_SOCKET_FRAMING: &str = "SOCKET_FRAMING";
const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Backend configuration consumed once when a connection initializes.
///
/// The configuration can come from a YAML or TOML file, from the process
/// environment, or from a file with environment overrides layered on top.
/// It is never reloaded while a connection is alive.
///
/// # Example
/// ```yaml
/// mode: socket
/// host: 127.0.0.1
/// port: 614
/// socket:
///   read_timeout_secs: 10
///   framing: single_read
/// ```
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Explicit transport choice; `None` lets the flags and platform decide.
    pub mode: Option<BackendMode>,
    /// Route everything through the compute API. Takes priority over `mode`.
    pub use_compute_api: bool,
    /// Prefer the native in-process binding over the portable one.
    pub use_native_binding: bool,
    pub host: String,
    pub port: u16,
    /// Compute API base URL.
    pub url: Option<String>,
    /// Compute API bearer token.
    pub api_key: Option<String>,
    /// Install directory of the native host binding.
    pub install_path: Option<PathBuf>,
    pub socket: SocketOptions,
    pub http: HttpOptions,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: None,
            use_compute_api: false,
            use_native_binding: false,
            host: DEFAULT_LISTENER_HOST.to_string(),
            port: DEFAULT_LISTENER_PORT,
            url: None,
            api_key: None,
            install_path: None,
            socket: SocketOptions::default(),
            http: HttpOptions::default(),
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("mode", &self.mode)
            .field("use_compute_api", &self.use_compute_api)
            .field("use_native_binding", &self.use_native_binding)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("install_path", &self.install_path)
            .field("socket", &self.socket)
            .field("http", &self.http)
            .finish()
    }
}

/// Transport family requested explicitly through configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    Embedded,
    Socket,
    Http,
}

impl FromStr for BackendMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "embedded" => Ok(BackendMode::Embedded),
            "socket" => Ok(BackendMode::Socket),
            "http" | "compute" => Ok(BackendMode::Http),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_BACKEND_MODE.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// How the socket backend delimits the listener's response.
///
/// `SingleRead` matches the stock listener: one read of at most
/// `read_buffer_bytes`, taken as the whole response. `LengthPrefixed` expects a
/// 4-byte big-endian length before each frame in both directions and must only
/// be enabled for listeners known to speak it.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    #[default]
    SingleRead,
    LengthPrefixed,
}

impl FromStr for Framing {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single_read" => Ok(Framing::SingleRead),
            "length_prefixed" => Ok(Framing::LengthPrefixed),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_SOCKET_FRAMING.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Framed socket transport options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SocketOptions {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub read_buffer_bytes: usize,
    pub framing: Framing,
    pub script_suffix: String,
    /// Directory for per-call temp files; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_SOCKET_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_SOCKET_TIMEOUT_SECS,
            read_buffer_bytes: DEFAULT_READ_BUFFER_BYTES,
            framing: Framing::default(),
            script_suffix: DEFAULT_SCRIPT_SUFFIX.to_string(),
            temp_dir: None,
        }
    }
}

impl SocketOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Compute API client options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpOptions {
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl BackendConfig {
    /// Build a configuration from the process environment alone.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay environment values on top of this configuration.
    ///
    /// `lookup` abstracts the environment so callers (and tests) can supply
    /// values without touching process-global state. `USE_NATIVE_BINDING`
    /// wins over the legacy `USE_RHINO3DM` (whose `true` means "portable"),
    /// and `NATIVE_INSTALL_PATH` wins over `RHINO_PATH`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BACKEND_MODE) {
            self.mode = Some(value.parse()?);
        }
        if let Some(value) = lookup(ENV_USE_COMPUTE_API) {
            self.use_compute_api = parse_flag(ENV_USE_COMPUTE_API, &value)?;
        }
        if let Some(value) = lookup(ENV_USE_RHINO3DM) {
            self.use_native_binding = !parse_flag(ENV_USE_RHINO3DM, &value)?;
        }
        if let Some(value) = lookup(ENV_USE_NATIVE_BINDING) {
            self.use_native_binding = parse_flag(ENV_USE_NATIVE_BINDING, &value)?;
        }
        if let Some(value) = lookup(ENV_COMPUTE_URL) {
            self.url = Some(value);
        }
        if let Some(value) = lookup(ENV_COMPUTE_API_KEY) {
            self.api_key = Some(value);
        }
        if let Some(value) = lookup(ENV_RHINO_PATH) {
            self.install_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_NATIVE_INSTALL_PATH) {
            self.install_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_LISTENER_HOST) {
            self.host = value;
        }
        if let Some(value) = lookup(ENV_LISTENER_PORT) {
            self.port = parse_number(ENV_LISTENER_PORT, &value)?;
        }
        if let Some(value) = lookup(ENV_SOCKET_TIMEOUT_SECS) {
            let secs = parse_number(ENV_SOCKET_TIMEOUT_SECS, &value)?;
            self.socket.connect_timeout_secs = secs;
            self.socket.read_timeout_secs = secs;
        }
        if let Some(value) = lookup(ENV_SOCKET_FRAMING) {
            self.socket.framing = value.parse()?;
        }
        if let Some(value) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http.timeout_secs = parse_number(ENV_HTTP_TIMEOUT_SECS, &value)?;
        }
        Ok(self)
    }

    /// `host:port` of the script listener.
    pub fn listener_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check that everything the given backend needs is present.
    pub fn validate_for(&self, kind: BackendKind) -> Result<(), ConfigError> {
        match kind {
            BackendKind::Http => {
                if !non_empty(&self.url) || !non_empty(&self.api_key) {
                    return Err(ConfigError::MissingComputeCredentials);
                }
            }
            BackendKind::Socket => {
                if self.host.trim().is_empty() || self.port == 0 {
                    return Err(ConfigError::InvalidListenerEndpoint {
                        host: self.host.clone(),
                        port: self.port,
                    });
                }
            }
            BackendKind::EmbeddedNative => match &self.install_path {
                Some(path) if path.is_dir() => {}
                Some(path) => {
                    return Err(ConfigError::InvalidInstallPath(path.display().to_string()))
                }
                None => return Err(ConfigError::InvalidInstallPath("<unset>".to_string())),
            },
            BackendKind::EmbeddedPortable => {}
        }
        Ok(())
    }
}

/// Load a backend config from a YAML or TOML file, chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BackendConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: display,
            reason: e.to_string(),
        }),
        Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: display,
            reason: e.to_string(),
        }),
        _ => Err(ConfigError::UnsupportedFormat(display)),
    }
}
