// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while loading or validating backend configuration.

use thiserror::Error;

/// Missing or invalid backend configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The compute API backend needs both a base URL and an API key.
    #[error("Compute API URL and key required for compute API connection")]
    MissingComputeCredentials,

    /// The native embedded backend needs an existing install directory.
    #[error("Invalid native install path: {0}")]
    InvalidInstallPath(String),

    /// The socket listener endpoint cannot be dialed.
    #[error("Invalid listener endpoint '{host}:{port}'")]
    InvalidListenerEndpoint { host: String, port: u16 },

    /// A configuration value could not be interpreted.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {reason}")]
    Read { path: String, reason: String },

    /// The configuration file could not be parsed.
    #[error("Failed to parse config file '{path}': {reason}")]
    Parse { path: String, reason: String },

    /// The configuration file extension is not a supported format.
    #[error("Unsupported config format for '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),
}
