// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // embedded, socket and http backends
pub mod config;        // config loading + backend selection
pub mod dispatcher;    // connection lifecycle
pub mod errors;        // error handling
pub mod graph;         // workflow model + materialization
pub mod observability;
pub mod protocol;      // envelope, requests, host commands
pub mod traits;        // backend + model reader abstractions
