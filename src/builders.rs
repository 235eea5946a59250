//! Builder pattern for ergonomic construction of clients.

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{A2AClient, ClientConfig, TlsConfig, TransportConfig};
use crate::error::A2AResult;

/// Builder for [`A2AClient`].
///
/// # Example
///
/// ```no_run
/// use a2a_universal::builders::ClientBuilder;
///
/// # async fn example() -> a2a_universal::error::A2AResult<()> {
/// let client = ClientBuilder::new("https://agents.example.com")
///     .with_agent_id("reviewer")
///     .with_bearer_token("secret")
///     .with_timeout(std::time::Duration::from_secs(30))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    agent_id: Option<String>,
    transport: TransportConfig,
    cancel: Option<CancellationToken>,
}

impl ClientBuilder {
    /// Create a new client builder for the given locator: a card URL, an
    /// agent-scoped URL or a service base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent_id: None,
            transport: TransportConfig::default(),
            cancel: None,
        }
    }

    /// Address a specific agent behind a multi-agent endpoint.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    /// Add a custom HTTP header to all requests.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.transport.headers.insert(key.into(), value.into());
        self
    }

    /// Set a bearer token, sent on HTTP requests and as gRPC metadata.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.transport.token = Some(token.into());
        self
    }

    /// Set TLS options.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.transport.tls = Some(tls);
        self
    }

    /// Trust an extra root CA from a PEM file.
    pub fn with_ca_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.transport
            .tls
            .get_or_insert_with(TlsConfig::default)
            .ca_certificate = Some(path.into());
        self
    }

    /// Skip certificate verification. For local development only.
    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.transport
            .tls
            .get_or_insert_with(TlsConfig::default)
            .insecure_skip_verify = insecure;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The configuration [`build`](Self::build) will connect with.
    pub fn build_config(self) -> ClientConfig {
        ClientConfig {
            url: self.url,
            agent_id: self.agent_id,
            transport: self.transport,
            cancel: self.cancel.unwrap_or_default(),
        }
    }

    /// Discover the agent and connect over its preferred transport.
    pub async fn build(self) -> A2AResult<A2AClient> {
        A2AClient::connect(self.build_config()).await
    }
}
