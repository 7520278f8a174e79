// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod dispatch;
mod workflow;

pub use config::ConfigError;
pub use dispatch::{DispatchError, DispatchResult};
pub use workflow::WorkflowError;
