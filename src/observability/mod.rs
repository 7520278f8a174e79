// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the dispatcher.
//!
//! Every diagnostic line goes through a message struct from [`messages`].
//! Each struct implements `Display` for the human-readable text and
//! [`messages::StructuredLog`] to emit it through `tracing` with the same
//! values attached as fields.
//!
//! # Usage
//!
//! ```rust
//! use grasshopper_dispatch::observability::messages::dispatcher::OperationRejected;
//! use grasshopper_dispatch::observability::messages::StructuredLog;
//!
//! OperationRejected {
//!     operation: "add_node",
//!     reason: "Not connected to the geometry backend",
//! }
//! .log();
//! ```

pub mod messages;
