//! Transport: deliver an [`OutboundPayload`] to the processing service.
//!
//! [`Transport`] is the seam between the orchestrator and the network, so the
//! state machine can be driven by an in-memory implementation under test.
//! [`HttpTransport`] is the real one: a single multipart `POST` per call.
//!
//! ## No retries
//!
//! A processing request is not idempotent: re-sending a merge may duplicate
//! work (or billing) on the server. Every failure is reported to the caller
//! after exactly one attempt.
//!
//! ## Failure classification
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx | `Ok(BinaryArtifact)` with the body verbatim |
//! | non-2xx, JSON object with string `error` | `ServerRejected { message: error }` |
//! | non-2xx, JSON object without it | `ServerRejected { message: "Server error" }` |
//! | non-2xx, body is not a JSON object | `NetworkFailure` (proxy page, gateway error) |
//! | connect / timeout / reset | `NetworkFailure` |

use crate::config::ClientConfig;
use crate::error::{ToolkitError, TransportError};
use crate::request::{OutboundPayload, PartValue};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

const GENERIC_SERVER_ERROR: &str = "Server error";

/// The raw body of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryArtifact {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Sends one payload to one endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `endpoint` is the path below the service base URL.
    async fn submit(
        &self,
        endpoint: &str,
        payload: OutboundPayload,
    ) -> Result<BinaryArtifact, TransportError>;
}

/// [`Transport`] over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ToolkitError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ToolkitError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(
        &self,
        endpoint: &str,
        payload: OutboundPayload,
    ) -> Result<BinaryArtifact, TransportError> {
        let url = self.config.endpoint_url(endpoint);
        info!("POST {} ({} bytes of input)", url, payload.content_bytes());

        let form = into_form(payload)?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_failure(&e, self.config.request_timeout_secs))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| network_failure(&e, self.config.request_timeout_secs))?;

        if status.is_success() {
            debug!("{} returned {} ({} bytes)", url, status, body.len());
            return Ok(BinaryArtifact {
                bytes: body,
                content_type,
            });
        }

        let err = classify_error_body(status, &body);
        warn!("{} returned {}: {}", url, status, err);
        Err(err)
    }
}

/// Convert the payload into a reqwest multipart form, preserving field order.
fn into_form(payload: OutboundPayload) -> Result<Form, TransportError> {
    payload
        .parts
        .into_iter()
        .try_fold(Form::new(), |form, part| match part.value {
            PartValue::Text(text) => Ok(form.text(part.name, text)),
            PartValue::File {
                filename,
                content_type,
                content,
            } => {
                let len = content.len() as u64;
                let file_part = Part::stream_with_length(content, len)
                    .file_name(filename)
                    .mime_str(content_type)
                    .map_err(|e| TransportError::NetworkFailure {
                        detail: format!("could not encode multipart field '{}': {e}", part.name),
                    })?;
                Ok(form.part(part.name, file_part))
            }
        })
}

/// Map a non-2xx response to a [`TransportError`].
pub(crate) fn classify_error_body(status: StatusCode, body: &[u8]) -> TransportError {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            let message = map
                .get("error")
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_SERVER_ERROR)
                .to_string();
            TransportError::ServerRejected {
                status: status.as_u16(),
                message,
            }
        }
        _ => TransportError::NetworkFailure {
            detail: format!("HTTP {status} with a non-JSON error body"),
        },
    }
}

fn network_failure(e: &reqwest::Error, timeout_secs: u64) -> TransportError {
    let detail = if e.is_timeout() {
        format!("request timed out after {timeout_secs}s")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    TransportError::NetworkFailure { detail }
}
