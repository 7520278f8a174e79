// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Connection lifecycle and operation dispatch.

mod connection;

#[cfg(test)]
mod integration_tests;

pub use connection::{Connection, ConnectionState};
