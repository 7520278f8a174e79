// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Framed socket backend for an out-of-process script listener.
//!
//! Each call writes its payload to a fresh temp file, tells the listener to
//! run that file, reads the listener's answer and removes the file. The temp
//! file is owned by the call for its whole duration and dropped on every exit
//! path, so nothing is shared between concurrent calls.
//!
//! Two framings are supported. `single_read` is the stock listener's
//! behavior: the request is written once and the first read (up to
//! `read_buffer_bytes`) is the whole response, so larger answers are cut
//! short. `length_prefixed` puts a 4-byte big-endian length before each frame
//! in both directions and has no such limit, but the listener must speak it.

pub mod protocol;

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::Instrument;

use crate::config::consts::{COMMAND_FILE_SUFFIX, MAX_FRAME_BYTES, TEMP_FILE_PREFIX};
use crate::config::{BackendConfig, BackendKind, Framing, SocketOptions};
use crate::errors::{DispatchError, DispatchResult};
use crate::observability::messages::transport::{
    ParametersDropped, SocketRequestSent, SocketResponseReceived, TempFileCleanupFailed,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{ExecutionRequest, HostCommand};
use crate::traits::Backend;

use self::protocol::{decode_response, ListenerMessage};

pub struct SocketBackend {
    address: String,
    options: SocketOptions,
}

impl SocketBackend {
    pub fn new(address: impl Into<String>, options: SocketOptions) -> Self {
        Self {
            address: address.into(),
            options,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.listener_address(), config.socket.clone())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn write_temp(&self, payload: &[u8], suffix: &str) -> DispatchResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_FILE_PREFIX).suffix(suffix);
        let created = match &self.options.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = created
            .map_err(|e| DispatchError::Transport(format!("Failed to create temp file: {}", e)))?;

        file.write_all(payload)
            .and_then(|_| file.flush())
            .map_err(|e| DispatchError::Transport(format!("Failed to write temp file: {}", e)))?;

        Ok(file)
    }

    fn remove_temp(file: NamedTempFile) {
        let path = file.path().display().to_string();
        if let Err(error) = file.close() {
            TempFileCleanupFailed {
                path: &path,
                error: &error,
            }
            .log();
        }
    }

    fn timed_out(&self, stage: &str) -> DispatchError {
        DispatchError::Transport(format!("Timed out {} {}", stage, self.address))
    }

    async fn connect(&self) -> DispatchResult<TcpStream> {
        timeout(self.options.connect_timeout(), TcpStream::connect(&self.address))
            .await
            .map_err(|_| self.timed_out("connecting to"))?
            .map_err(|e| {
                DispatchError::Transport(format!("Failed to connect to {}: {}", self.address, e))
            })
    }

    async fn exchange_single_read(&self, mut stream: TcpStream, body: &[u8]) -> DispatchResult<Vec<u8>> {
        timeout(self.options.read_timeout(), stream.write_all(body))
            .await
            .map_err(|_| self.timed_out("sending to"))?
            .map_err(|e| DispatchError::Transport(format!("Failed to send request: {}", e)))?;

        let mut buffer = vec![0u8; self.options.read_buffer_bytes];
        let read = timeout(self.options.read_timeout(), stream.read(&mut buffer))
            .await
            .map_err(|_| self.timed_out("waiting for a response from"))?
            .map_err(|e| DispatchError::Transport(format!("Failed to read response: {}", e)))?;

        if read == 0 {
            return Err(DispatchError::Transport(format!(
                "Listener at {} closed the connection without responding",
                self.address
            )));
        }

        buffer.truncate(read);
        Ok(buffer)
    }

    async fn exchange_length_prefixed(&self, stream: TcpStream, body: &[u8]) -> DispatchResult<Vec<u8>> {
        let codec = LengthDelimitedCodec::builder()
            .max_frame_length(MAX_FRAME_BYTES)
            .new_codec();
        let mut framed = Framed::new(stream, codec);

        timeout(self.options.read_timeout(), framed.send(Bytes::copy_from_slice(body)))
            .await
            .map_err(|_| self.timed_out("sending to"))?
            .map_err(|e| DispatchError::Transport(format!("Failed to send request: {}", e)))?;

        let frame = timeout(self.options.read_timeout(), framed.next())
            .await
            .map_err(|_| self.timed_out("waiting for a response from"))?
            .ok_or_else(|| {
                DispatchError::Transport(format!(
                    "Listener at {} closed the connection without responding",
                    self.address
                ))
            })?
            .map_err(|e| DispatchError::Transport(format!("Failed to read response frame: {}", e)))?;

        Ok(frame.to_vec())
    }

    /// One listener round trip for an already-written file.
    async fn send(&self, path: &Path) -> DispatchResult<Value> {
        let message = ListenerMessage::run_temp(path);
        let body = message.encode()?;
        let sent = SocketRequestSent {
            address: &self.address,
            filename: &message.filename,
            bytes: body.len(),
        };
        let span = sent.span("socket_round_trip");

        async {
            let stream = self.connect().await?;
            sent.log();

            let started = Instant::now();
            let response = match self.options.framing {
                Framing::SingleRead => self.exchange_single_read(stream, &body).await?,
                Framing::LengthPrefixed => self.exchange_length_prefixed(stream, &body).await?,
            };

            SocketResponseReceived {
                address: &self.address,
                bytes: response.len(),
                duration: started.elapsed(),
            }
            .log();

            decode_response(&response)
        }
        .instrument(span)
        .await
    }

    async fn run_file(&self, payload: &[u8], suffix: &str) -> DispatchResult<Value> {
        let file = self.write_temp(payload, suffix)?;
        let outcome = self.send(file.path()).await;
        Self::remove_temp(file);
        outcome
    }
}

#[async_trait]
impl Backend for SocketBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Socket
    }

    async fn execute(&self, request: ExecutionRequest) -> DispatchResult<Value> {
        if !request.parameters().is_empty() {
            ParametersDropped {
                count: request.parameters().len(),
            }
            .log();
        }
        self.run_file(request.code().as_bytes(), &self.options.script_suffix)
            .await
    }

    async fn apply(&self, command: HostCommand) -> DispatchResult<Value> {
        let payload = serde_json::to_vec(&command)
            .map_err(|e| DispatchError::Transport(format!("Failed to encode command: {}", e)))?;
        self.run_file(&payload, COMMAND_FILE_SUFFIX).await
    }
}
