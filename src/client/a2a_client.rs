//! High-level A2A client for interacting with remote agents.
//!
//! [`A2AClient`] is the single interface callers use. It discovers the agent
//! once at construction, picks the transport the agent card prefers, and
//! delegates every operation to it.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    AgentCard, ListTasksRequest, ListTasksResponse, Message, SendMessageRequest,
    SendMessageResponse, Task,
};

use super::card_resolver::{CardResolver, ResolvedAgent};
use super::selector::build_transport;
use super::sse::EventStream;
use super::transport::{Transport, TransportConfig, TransportKind};

/// Everything [`A2AClient::connect`] needs.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Agent card URL, agent-scoped base URL, or service base URL.
    pub url: String,
    /// Agent to address. Discovered from the URL when omitted.
    pub agent_id: Option<String>,
    /// HTTP/gRPC settings shared by discovery and the transport.
    pub transport: TransportConfig,
    /// Cancels every in-flight call and stream of the client.
    pub cancel: CancellationToken,
}

/// Client for interacting with A2A agents over gRPC, REST or JSON-RPC.
///
/// # Construction
///
/// ```no_run
/// use a2a_universal::client::{A2AClient, ClientConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = A2AClient::connect(ClientConfig {
///     url: "http://localhost:8080".to_string(),
///     agent_id: Some("assistant".to_string()),
///     ..ClientConfig::default()
/// })
/// .await?;
///
/// let response = client.send_text("Hello, agent!").await?;
/// println!("{:?}", response);
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
///
/// Every call races the client's cancellation token; cancelling it makes
/// pending calls fail with [`A2AError::Cancelled`] and stops open streams.
pub struct A2AClient {
    transport: Box<dyn Transport>,
    agent_card: Option<AgentCard>,
    agent_id: String,
    base_url: String,
    cancel: CancellationToken,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient")
            .field("transport", &self.transport.kind())
            .field("agent_id", &self.agent_id)
            .field("base_url", &self.base_url)
            .field("agent_card", &self.agent_card)
            .finish_non_exhaustive()
    }
}

impl A2AClient {
    /// Discover the agent and open the transport its card prefers.
    ///
    /// # Errors
    ///
    /// [`A2AError::Discovery`] when no card could be fetched for an explicit
    /// agent ID, [`A2AError::TransportInit`] when the HTTP client or the
    /// transport could not be built.
    pub async fn connect(config: ClientConfig) -> A2AResult<Self> {
        let http = config.transport.http_client()?;
        let mut resolver = CardResolver::with_client(http);
        if let Some(token) = &config.transport.token {
            resolver = resolver.with_bearer_token(token.clone());
        }

        let resolved = tokio::select! {
            _ = config.cancel.cancelled() => return Err(A2AError::Cancelled),
            resolved = resolver.resolve(&config.url, config.agent_id.as_deref()) => resolved?,
        };
        let transport = build_transport(&resolved, &config.transport)?;

        Ok(Self::from_parts(transport, resolved, config.cancel))
    }

    /// Assemble a client from an already-resolved agent and transport.
    pub fn from_parts(
        transport: Box<dyn Transport>,
        agent: ResolvedAgent,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            agent_card: Some(agent.card),
            agent_id: agent.agent_id,
            base_url: agent.base_url,
            cancel,
        }
    }

    /// Create a client with a custom transport, skipping discovery.
    ///
    /// The client has no cached card; [`get_agent_card`](Self::get_agent_card)
    /// asks the transport.
    pub fn with_transport(transport: Box<dyn Transport>, agent_id: impl Into<String>) -> Self {
        Self {
            transport,
            agent_card: None,
            agent_id: agent_id.into(),
            base_url: String::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token (builder-style).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn guarded<T>(&self, call: impl Future<Output = A2AResult<T>>) -> A2AResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(A2AError::Cancelled),
            result = call => result,
        }
    }

    // ──────────────────────────────────────────────────
    // Core operations
    // ──────────────────────────────────────────────────

    /// Send a message to the agent and wait for the task or message it
    /// produces.
    pub async fn send_message(
        &self,
        request: impl Into<SendMessageRequest>,
    ) -> A2AResult<SendMessageResponse> {
        let request = request.into();
        self.guarded(self.transport.send_message(&self.agent_id, request))
            .await
    }

    /// Send a message and stream the resulting events.
    ///
    /// The stream stops when the client's token is cancelled.
    pub async fn stream_message(
        &self,
        request: impl Into<SendMessageRequest>,
    ) -> A2AResult<EventStream> {
        let request = request.into();
        self.guarded(
            self.transport
                .stream_message(&self.agent_id, request, self.cancel.clone()),
        )
        .await
    }

    /// List the agents served by the endpoint.
    pub async fn list_agents(&self) -> A2AResult<Vec<AgentCard>> {
        self.guarded(self.transport.list_agents()).await
    }

    /// Get an agent card. The discovered agent's card is answered from
    /// cache; pass `""` for it.
    pub async fn get_agent_card(&self, agent_id: &str) -> A2AResult<AgentCard> {
        if let Some(card) = &self.agent_card {
            if agent_id.is_empty() || agent_id == self.agent_id {
                return Ok(card.clone());
            }
        }
        let agent_id = if agent_id.is_empty() {
            self.agent_id.as_str()
        } else {
            agent_id
        };
        self.guarded(self.transport.get_agent_card(agent_id)).await
    }

    /// Fetch the current snapshot of a task.
    pub async fn get_task(&self, task_id: &str) -> A2AResult<Task> {
        self.guarded(self.transport.get_task(&self.agent_id, task_id))
            .await
    }

    /// List tasks matching a filter.
    pub async fn list_tasks(&self, request: &ListTasksRequest) -> A2AResult<ListTasksResponse> {
        self.guarded(self.transport.list_tasks(request)).await
    }

    /// Ask the agent to cancel a task.
    pub async fn cancel_task(&self, task_id: &str) -> A2AResult<Task> {
        self.guarded(self.transport.cancel_task(&self.agent_id, task_id))
            .await
    }

    /// Close the transport. Safe to call more than once.
    pub async fn close(&self) -> A2AResult<()> {
        self.transport.close().await
    }

    // ──────────────────────────────────────────────────
    // Accessors
    // ──────────────────────────────────────────────────

    /// The agent this client addresses.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The service base URL after discovery.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The card resolved at construction, if any.
    pub fn agent_card(&self) -> Option<&AgentCard> {
        self.agent_card.as_ref()
    }

    /// The wire binding in use.
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// The token that cancels this client's calls.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    // ──────────────────────────────────────────────────
    // Convenience Helpers
    // ──────────────────────────────────────────────────

    /// Convenience: send a text message and get back the response.
    pub async fn send_text(&self, text: &str) -> A2AResult<SendMessageResponse> {
        self.send_message(Message::user_text(text)).await
    }

    /// Convenience: send a text message with a specific context ID.
    ///
    /// Useful for continuing a conversation within an existing context.
    pub async fn send_text_in_context(
        &self,
        text: &str,
        context_id: &str,
    ) -> A2AResult<SendMessageResponse> {
        self.send_message(Message::user_text(text).with_context_id(context_id))
            .await
    }

    /// Convenience: send a text message and stream responses.
    pub async fn stream_text(&self, text: &str) -> A2AResult<EventStream> {
        self.stream_message(Message::user_text(text)).await
    }
}
