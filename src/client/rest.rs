//! HTTP+JSON REST binding.
//!
//! Endpoints (all relative to the service base URL):
//!
//! | Operation | Request |
//! |---|---|
//! | send | `POST /v1/agents/{id}/message:send` |
//! | stream | `POST /v1/agents/{id}/message:stream` (SSE response) |
//! | list agents | `GET /v1/agents` |
//! | agent card | `GET /v1/agents/{id}/.well-known/agent-card.json` |
//! | get task | `GET /v1/agents/{id}/tasks/{task_id}` |
//! | cancel task | `POST /v1/agents/{id}/tasks/{task_id}:cancel` |
//! | list tasks | `GET /v1/tasks?context_id=&status=&page_size=&page_token=` |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    AgentCard, ListTasksRequest, ListTasksResponse, SendMessageRequest, SendMessageResponse, Task,
    TaskState,
};

use super::sse::EventStream;
use super::transport::{Transport, TransportConfig, TransportKind};

/// REST transport over `reqwest`.
///
/// Every non-2xx response becomes [`A2AError::Http`] carrying the status code
/// and body. A bearer `Authorization` header is attached when a token is
/// configured.
#[derive(Debug, Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl RestTransport {
    /// Create a transport for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, config: &TransportConfig) -> A2AResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            stream_client: config.streaming_http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: config.bearer(),
        })
    }

    /// Create a transport reusing an existing `reqwest::Client` for every
    /// call, streams included.
    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        token: Option<String>,
    ) -> Self {
        Self {
            stream_client: client.clone(),
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: token.filter(|t| !t.is_empty()).map(|t| format!("Bearer {t}")),
        }
    }

    /// The service base URL requests are built from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{segments...}`; each segment is percent-encoded, so IDs
    /// holding `/`, `?` or `#` stay inside their segment.
    pub(crate) fn service_url(&self, segments: &[&str]) -> A2AResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| A2AError::TransportInit(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| {
                A2AError::TransportInit(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn agent_url(&self, agent_id: &str, tail: &[&str]) -> A2AResult<reqwest::Url> {
        let mut segments = vec!["v1", "agents", agent_id];
        segments.extend_from_slice(tail);
        self.service_url(&segments)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(bearer) => builder.header(reqwest::header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> A2AResult<T> {
        tracing::debug!(url = %url, "GET {what}");
        let response = self
            .authorize(self.client.get(url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| A2AError::from_reqwest(what, e))?;
        read_json(response, what).await
    }

    /// POST a JSON body and decode the JSON answer.
    pub(crate) async fn post_json<B, T>(&self, url: &str, body: &B, what: &str) -> A2AResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(url = %url, "POST {what}");
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| A2AError::from_reqwest(what, e))?;
        read_json(response, what).await
    }

    /// POST a JSON body and decode the SSE answer on a background worker.
    pub(crate) async fn post_stream<B>(
        &self,
        url: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> A2AResult<EventStream>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(url = %url, "opening event stream");
        let response = self
            .authorize(self.stream_client.post(url))
            .header("Accept", "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|e| A2AError::from_reqwest("stream request", e))?;
        let response = ensure_success(response).await?;
        Ok(EventStream::from_sse(response.bytes_stream(), cancel))
    }
}

#[async_trait]
impl Transport for RestTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }

    async fn send_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
    ) -> A2AResult<SendMessageResponse> {
        let url = self.agent_url(agent_id, &["message:send"])?;
        self.post_json(url.as_str(), &request, "send message").await
    }

    async fn stream_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
        cancel: CancellationToken,
    ) -> A2AResult<EventStream> {
        let url = self.agent_url(agent_id, &["message:stream"])?;
        self.post_stream(url.as_str(), &request, &cancel).await
    }

    async fn list_agents(&self) -> A2AResult<Vec<AgentCard>> {
        let url = self.service_url(&["v1", "agents"])?;
        let body: serde_json::Value = self.get_json(url.as_str(), "list agents").await?;
        Ok(parse_agent_list(body))
    }

    async fn get_agent_card(&self, agent_id: &str) -> A2AResult<AgentCard> {
        let url = self.agent_url(agent_id, &[".well-known", "agent-card.json"])?;
        self.get_json(url.as_str(), "get agent card").await
    }

    async fn get_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task> {
        let url = self.agent_url(agent_id, &["tasks", task_id])?;
        self.get_json(url.as_str(), "get task").await
    }

    async fn list_tasks(&self, request: &ListTasksRequest) -> A2AResult<ListTasksResponse> {
        let url = self.service_url(&["v1", "tasks"])?;
        let query = list_tasks_query(request);
        tracing::debug!(url = %url, ?query, "GET list tasks");

        let response = self
            .authorize(self.client.get(url))
            .query(&query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| A2AError::from_reqwest("list tasks", e))?;
        read_json(response, "list tasks").await
    }

    async fn cancel_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task> {
        let action = format!("{task_id}:cancel");
        let url = self.agent_url(agent_id, &["tasks", &action])?;
        self.post_json(url.as_str(), &serde_json::json!({}), "cancel task")
            .await
    }
}

/// Query pairs for `GET /v1/tasks`. Empty filters are omitted; the state is
/// sent as its protobuf number.
fn list_tasks_query(request: &ListTasksRequest) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(context_id) = request.context_id.as_deref().filter(|c| !c.is_empty()) {
        query.push(("context_id", context_id.to_string()));
    }
    if let Some(status) = request.status.filter(|s| *s != TaskState::Unspecified) {
        query.push(("status", status.proto_number().to_string()));
    }
    if let Some(page_size) = request.page_size.filter(|n| *n > 0) {
        query.push(("page_size", page_size.to_string()));
    }
    if let Some(token) = request.page_token.as_deref().filter(|t| !t.is_empty()) {
        query.push(("page_token", token.to_string()));
    }
    query
}

/// `{"agents": [...]}`; entries that are not valid cards are skipped.
pub(crate) fn parse_agent_list(body: serde_json::Value) -> Vec<AgentCard> {
    let entries = match body {
        serde_json::Value::Object(mut map) => match map.remove("agents") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<AgentCard>(entry) {
            Ok(card) => Some(card),
            Err(e) => {
                tracing::debug!("skipping unparseable agent entry: {e}");
                None
            }
        })
        .collect()
}

/// Turn a non-2xx response into [`A2AError::Http`].
pub(crate) async fn ensure_success(response: reqwest::Response) -> A2AResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(A2AError::Http {
        status: status.as_u16(),
        body,
    })
}

/// Check the status, then decode the body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> A2AResult<T> {
    let response = ensure_success(response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| A2AError::Transport(format!("failed to read {what} response: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| A2AError::InvalidJson(format!("failed to decode {what} response: {e}")))
}
