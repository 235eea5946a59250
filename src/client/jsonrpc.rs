//! JSON-RPC 2.0 binding over HTTP.
//!
//! Unary methods are posted to `{base}/rpc?agent={id}`, the streaming method
//! to `{base}/rpc/stream?agent={id}` with an SSE response whose `data:`
//! payloads are JSON-RPC envelopes. Listing agents and tasks has no JSON-RPC
//! method and goes through the REST endpoints of the same service.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    AgentCard, JsonRpcRequest, JsonRpcResponse, ListTasksRequest, ListTasksResponse,
    SendMessageRequest, SendMessageResponse, Task,
};

use super::rest::RestTransport;
use super::sse::EventStream;
use super::transport::{Transport, TransportKind};

/// JSON-RPC transport. Shares its HTTP clients with a [`RestTransport`].
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    rest: RestTransport,
}

impl JsonRpcTransport {
    /// Wrap the REST adapter of the same service.
    pub fn new(rest: RestTransport) -> Self {
        Self { rest }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn rpc_url(&self, path: &[&str], agent_id: &str) -> A2AResult<reqwest::Url> {
        let mut url = self.rest.service_url(path)?;
        if !agent_id.is_empty() {
            url.query_pairs_mut().append_pair("agent", agent_id);
        }
        Ok(url)
    }

    async fn call<P, T>(&self, agent_id: &str, method: &str, params: &P) -> A2AResult<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = build_request(method, params)?;
        let url = self.rpc_url(&["rpc"], agent_id)?;
        let response: JsonRpcResponse = self.rest.post_json(url.as_str(), &request, method).await?;
        parse_result(response)
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::JsonRpc
    }

    async fn send_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
    ) -> A2AResult<SendMessageResponse> {
        self.call(agent_id, "message/send", &request).await
    }

    async fn stream_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
        cancel: CancellationToken,
    ) -> A2AResult<EventStream> {
        let request = build_request("message/stream", &request)?;
        let url = self.rpc_url(&["rpc", "stream"], agent_id)?;
        self.rest.post_stream(url.as_str(), &request, &cancel).await
    }

    async fn list_agents(&self) -> A2AResult<Vec<AgentCard>> {
        self.rest.list_agents().await
    }

    async fn get_agent_card(&self, agent_id: &str) -> A2AResult<AgentCard> {
        self.call(agent_id, "card/get", &serde_json::json!({})).await
    }

    async fn get_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task> {
        self.call(agent_id, "tasks/get", &task_name(task_id)).await
    }

    async fn list_tasks(&self, request: &ListTasksRequest) -> A2AResult<ListTasksResponse> {
        self.rest.list_tasks(request).await
    }

    async fn cancel_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task> {
        self.call(agent_id, "tasks/cancel", &task_name(task_id))
            .await
    }
}

/// `{"name": "tasks/{id}"}` resource-name params.
fn task_name(task_id: &str) -> serde_json::Value {
    serde_json::json!({ "name": format!("tasks/{task_id}") })
}

/// Build a JSON-RPC request with a random UUID ID.
fn build_request(method: &str, params: &impl Serialize) -> A2AResult<JsonRpcRequest> {
    let params = serde_json::to_value(params)
        .map_err(|e| A2AError::Transport(format!("failed to serialize request params: {e}")))?;
    Ok(JsonRpcRequest::new(method, params))
}

/// Parse the `result` field from a JSON-RPC response into the expected type.
///
/// If the response contains an error, converts it into an [`A2AError::JsonRpc`].
fn parse_result<T: DeserializeOwned>(response: JsonRpcResponse) -> A2AResult<T> {
    if let Some(error) = response.error {
        return Err(error.into());
    }

    let result = response.result.ok_or_else(|| {
        A2AError::InvalidJson("JSON-RPC response has neither 'result' nor 'error'".to_string())
    })?;

    serde_json::from_value(result)
        .map_err(|e| A2AError::InvalidJson(format!("failed to deserialize response result: {e}")))
}
