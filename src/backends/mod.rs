// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution backends.
//!
//! Each backend implements the [`Backend`](crate::traits::Backend) trait and
//! is created through [`BackendFactory`] from a validated configuration.
//!
//! # Available Backends
//!
//! ## Embedded
//! In-process rhai execution:
//! - **Native**: live host document, graph commands, host functions for scripts
//! - **Portable**: execution and model file reading only
//!
//! ## Socket
//! Out-of-process script listener over TCP, one temp file per call.
//!
//! ## HTTP
//! Remote compute API, JSON over HTTPS with bearer authentication.
//!
//! ## Stub (Test-Only)
//! Recording backend for dispatcher and workflow tests. Not available in
//! production builds.
//!
//! # Example
//!
//! ```rust
//! use grasshopper_dispatch::backends::BackendFactory;
//! use grasshopper_dispatch::backends::embedded::OpenNurbsHeaderReader;
//! use grasshopper_dispatch::config::{BackendConfig, BackendKind};
//! use grasshopper_dispatch::traits::Backend;
//! use std::sync::Arc;
//!
//! let backend = BackendFactory::create_backend(
//!     BackendKind::EmbeddedPortable,
//!     &BackendConfig::default(),
//!     Arc::new(OpenNurbsHeaderReader::new()),
//! )?;
//! assert_eq!(backend.kind(), BackendKind::EmbeddedPortable);
//! # Ok::<(), grasshopper_dispatch::errors::DispatchError>(())
//! ```

pub mod embedded;
mod factory;
pub mod http;
pub mod socket;
#[cfg(test)]
pub mod stub;

pub use factory::BackendFactory;
