// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compute API backend.
//!
//! Every call is a JSON `POST {url}/{endpoint}` carrying the API key as a
//! bearer token. Non-2xx statuses, timeouts and unreadable bodies become
//! transport errors; a 2xx JSON body is the payload, an empty body is `null`.

pub mod payloads;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::config::{BackendConfig, BackendKind, HttpOptions};
use crate::errors::{ConfigError, DispatchError, DispatchResult};
use crate::observability::messages::transport::{HttpRequestFailed, HttpRequestSent};
use crate::observability::messages::StructuredLog;
use crate::protocol::{ExecutionRequest, HostCommand};
use crate::traits::Backend;

use self::payloads::{CommandPayload, GrasshopperPayload, EXECUTE_ENDPOINT};

pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: &HttpOptions,
    ) -> DispatchResult<Self> {
        let client = Client::builder()
            .timeout(options.timeout())
            .build()
            .map_err(|e| DispatchError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> DispatchResult<Self> {
        match (&config.url, &config.api_key) {
            (Some(url), Some(api_key)) => Self::new(url.clone(), api_key.clone(), &config.http),
            _ => Err(ConfigError::MissingComputeCredentials.into()),
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn transport_error(&self, endpoint: &str, error: &reqwest::Error) -> DispatchError {
        HttpRequestFailed {
            endpoint,
            error,
        }
        .log();

        let url = self.endpoint_url(endpoint);
        if error.is_timeout() {
            DispatchError::Transport(format!("Request to {} timed out", url))
        } else if let Some(status) = error.status() {
            DispatchError::Transport(format!("Compute API returned {} for {}", status, url))
        } else {
            DispatchError::Transport(format!("Request to {} failed: {}", url, error))
        }
    }

    async fn post<T: Serialize + ?Sized + Sync>(&self, endpoint: &str, body: &T) -> DispatchResult<Value> {
        let payload = serde_json::to_vec(body).map_err(|e| {
            DispatchError::Transport(format!("Failed to encode request for {}: {}", endpoint, e))
        })?;
        let sent = HttpRequestSent {
            endpoint,
            bytes: payload.len(),
        };
        let span = sent.span("compute_request");

        async {
            sent.log();
            let response = self
                .client
                .post(self.endpoint_url(endpoint))
                .bearer_auth(&self.api_key)
                .header(CONTENT_TYPE, "application/json")
                .body(payload)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| self.transport_error(endpoint, &e))?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| self.transport_error(endpoint, &e))?;

            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }

            serde_json::from_slice(&bytes).map_err(|e| {
                DispatchError::Transport(format!(
                    "Compute API returned invalid JSON from {}: {}",
                    self.endpoint_url(endpoint),
                    e
                ))
            })
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Http
    }

    async fn execute(&self, request: ExecutionRequest) -> DispatchResult<Value> {
        let payload = GrasshopperPayload::new(request.code(), request.parameters());
        self.post(EXECUTE_ENDPOINT, &payload).await
    }

    async fn apply(&self, command: HostCommand) -> DispatchResult<Value> {
        let payload = CommandPayload::from(command);
        self.post(payload.endpoint(), &payload).await
    }
}
