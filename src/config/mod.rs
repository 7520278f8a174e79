// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod selection;

pub mod consts;

pub use loader::{
    load_config, BackendConfig, BackendMode, Framing, HttpOptions, SocketOptions,
};
pub use selection::{select_backend, BackendKind, HostPlatform};
