//! Transport layer for A2A client communication.
//!
//! Provides the [`Transport`] trait every wire binding implements (gRPC, REST,
//! JSON-RPC), the [`TransportKind`] selector value, and the shared HTTP/TLS
//! configuration.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    AgentCard, ListTasksRequest, ListTasksResponse, SendMessageRequest, SendMessageResponse, Task,
};

use super::sse::EventStream;

/// Default request timeout. Approval round-trips can be slow, so this is
/// generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Transport abstraction for A2A communication.
///
/// Inputs and outputs are transport-agnostic; each implementation owns its
/// wire encoding. Implementations must tolerate `close()` being called more
/// than once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which wire binding this is.
    fn kind(&self) -> TransportKind;

    /// Send a message and wait for the task or message it produces.
    async fn send_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
    ) -> A2AResult<SendMessageResponse>;

    /// Send a message and receive the resulting events as a stream.
    ///
    /// `cancel` stops the stream worker and releases the connection.
    async fn stream_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
        cancel: CancellationToken,
    ) -> A2AResult<EventStream>;

    /// List the agents served by the endpoint.
    async fn list_agents(&self) -> A2AResult<Vec<AgentCard>>;

    /// Fetch the card of one agent.
    async fn get_agent_card(&self, agent_id: &str) -> A2AResult<AgentCard>;

    /// Fetch the current snapshot of a task.
    async fn get_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task>;

    /// List tasks matching a filter.
    async fn list_tasks(&self, request: &ListTasksRequest) -> A2AResult<ListTasksResponse>;

    /// Ask the agent to cancel a task.
    async fn cancel_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task>;

    /// Close the transport and release any held resources.
    ///
    /// The default implementation is a no-op.
    async fn close(&self) -> A2AResult<()> {
        Ok(())
    }
}

/// The wire binding used to reach an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportKind {
    /// gRPC (`a2a.v1.A2AService`).
    #[default]
    Grpc,
    /// HTTP+JSON REST endpoints under `/v1/agents/...`.
    Rest,
    /// JSON-RPC 2.0 over HTTP.
    JsonRpc,
}

impl TransportKind {
    /// Map a card's `preferred_transport` value. Absent or unrecognized
    /// values select gRPC.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "rest" | "http" | "https" | "http+json" => TransportKind::Rest,
            "jsonrpc" | "json-rpc" | "json_rpc" => TransportKind::JsonRpc,
            _ => TransportKind::Grpc,
        }
    }

    /// The transport a card asks for.
    pub fn from_card(card: &AgentCard) -> Self {
        Self::parse(&card.preferred_transport)
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Grpc => "grpc",
            TransportKind::Rest => "rest",
            TransportKind::JsonRpc => "jsonrpc",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TLS settings shared by the HTTP and gRPC transports.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Skip server certificate verification. For local development only.
    pub insecure_skip_verify: bool,
    /// PEM file with an extra root CA to trust.
    pub ca_certificate: Option<PathBuf>,
}

impl TlsConfig {
    /// Read the configured CA certificate, if any.
    pub(crate) fn read_ca_pem(&self) -> A2AResult<Option<Vec<u8>>> {
        match &self.ca_certificate {
            Some(path) => std::fs::read(path).map(Some).map_err(|e| {
                A2AError::TransportInit(format!(
                    "failed to read CA certificate {}: {e}",
                    path.display()
                ))
            }),
            None => Ok(None),
        }
    }
}

/// Configuration shared by every transport built for one client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout. Defaults to 300 seconds.
    pub timeout: Duration,
    /// Bearer token sent as `Authorization: Bearer {token}`.
    pub token: Option<String>,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
    /// TLS settings. `None` uses the platform defaults.
    pub tls: Option<TlsConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            token: None,
            headers: HashMap::new(),
            tls: None,
        }
    }
}

impl TransportConfig {
    /// Build the `reqwest::Client` the HTTP transports and discovery share.
    ///
    /// The bearer token is not baked in here; it is attached per request so
    /// discovery and the adapters behave the same.
    pub fn http_client(&self) -> A2AResult<reqwest::Client> {
        self.build_http_client(Some(self.timeout))
    }

    /// Like [`http_client`](Self::http_client) but without an overall
    /// request deadline, for long-lived event streams. The configured timeout
    /// still bounds connection set-up.
    pub fn streaming_http_client(&self) -> A2AResult<reqwest::Client> {
        self.build_http_client(None)
    }

    fn build_http_client(&self, timeout: Option<Duration>) -> A2AResult<reqwest::Client> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| A2AError::TransportInit(format!("invalid header name {key}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                A2AError::TransportInit(format!("invalid value for header {key}: {e}"))
            })?;
            default_headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.timeout)
            .default_headers(default_headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(tls) = &self.tls {
            if tls.insecure_skip_verify {
                tracing::warn!("TLS certificate verification is disabled; do not use in production");
                builder = builder.danger_accept_invalid_certs(true);
            }
            if let Some(pem) = tls.read_ca_pem()? {
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    A2AError::TransportInit(format!("invalid CA certificate: {e}"))
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }

        builder
            .build()
            .map_err(|e| A2AError::TransportInit(format!("failed to build HTTP client: {e}")))
    }

    /// `Bearer {token}` when a token is configured.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {t}"))
    }
}
