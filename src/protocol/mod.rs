// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire and value types shared by every layer of the dispatcher.
//!
//! * `envelope` - the uniform success/error result returned by every operation
//! * `request` - an immutable code + parameter bindings submission
//! * `command` - structured host commands for graph mutation and evaluation
//! * `ids` - client-side node identifiers
//! * `model` - coarse model file summaries returned by read operations

pub mod command;
pub mod envelope;
pub mod ids;
pub mod model;
pub mod request;

pub use command::{HostCommand, ParamDecl, RunOptions};
pub use envelope::{ErrorKind, ExecutionResult, Status};
pub use ids::{NodeId, NodePrefix};
pub use model::{ModelSummary, ObjectSummary};
pub use request::{ExecutionRequest, Parameters};
