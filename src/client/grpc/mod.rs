//! gRPC binding (`a2a.v1.A2AService`) over `tonic`.
//!
//! One lazily-connected channel is opened per transport. When the deployment
//! serves several agents behind one endpoint, the target agent is named in
//! the `agent-name` call metadata. Listing agents and tasks has no RPC and
//! goes through the REST endpoints of the same service.

mod convert;

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

use crate::error::{A2AError, A2AResult};
use crate::proto::{self, a2a_service_client::A2aServiceClient};
use crate::types::{
    AgentCard, ListTasksRequest, ListTasksResponse, SendMessageRequest, SendMessageResponse, Task,
};

use super::rest::RestTransport;
use super::sse::EventStream;
use super::transport::{Transport, TransportConfig, TransportKind};

/// gRPC transport.
///
/// `close()` drops the channel; later calls fail with
/// [`A2AError::Transport`].
#[derive(Debug)]
pub struct GrpcTransport {
    client: Mutex<Option<A2aServiceClient>>,
    rest: RestTransport,
    address: String,
    single_agent: bool,
    timeout: Duration,
    bearer: Option<MetadataValue<Ascii>>,
}

impl GrpcTransport {
    /// Open a channel to `address` (`host:port`).
    ///
    /// TLS follows `config.tls`: none or `insecure_skip_verify` gives a
    /// plaintext channel, a CA certificate gives TLS with that root, and
    /// anything else gives TLS with the platform roots.
    ///
    /// The channel connects on first use, so an unreachable host surfaces on
    /// the first call rather than here.
    pub fn connect(
        address: &str,
        rest: RestTransport,
        config: &TransportConfig,
        single_agent: bool,
    ) -> A2AResult<Self> {
        let channel = build_channel(address, config)?;
        let bearer = match config.bearer() {
            Some(bearer) => Some(bearer.parse::<MetadataValue<Ascii>>().map_err(|e| {
                A2AError::TransportInit(format!("bearer token is not valid metadata: {e}"))
            })?),
            None => None,
        };

        tracing::debug!(address = %address, single_agent, "gRPC channel configured");

        Ok(Self {
            client: Mutex::new(Some(A2aServiceClient::new(channel))),
            rest,
            address: address.to_string(),
            single_agent,
            timeout: config.timeout,
            bearer,
        })
    }

    /// The `host:port` this transport talks to.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn client(&self) -> A2AResult<A2aServiceClient> {
        let guard = self
            .client
            .lock()
            .map_err(|_| A2AError::Transport("gRPC client lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| A2AError::Transport("gRPC transport is closed".to_string()))
    }

    fn request<T>(&self, agent_id: &str, message: T) -> A2AResult<tonic::Request<T>> {
        let mut request = tonic::Request::new(message);
        if !self.single_agent && !agent_id.is_empty() {
            let value = agent_id.parse::<MetadataValue<Ascii>>().map_err(|e| {
                A2AError::Transport(format!("agent id '{agent_id}' is not valid metadata: {e}"))
            })?;
            request.metadata_mut().insert("agent-name", value);
        }
        if let Some(bearer) = &self.bearer {
            request.metadata_mut().insert("authorization", bearer.clone());
        }
        Ok(request)
    }

    fn unary_request<T>(&self, agent_id: &str, message: T) -> A2AResult<tonic::Request<T>> {
        let mut request = self.request(agent_id, message)?;
        request.set_timeout(self.timeout);
        Ok(request)
    }
}

fn build_channel(address: &str, config: &TransportConfig) -> A2AResult<Channel> {
    let tls = config.tls.as_ref().filter(|t| !t.insecure_skip_verify);
    let scheme = if tls.is_some() { "https" } else { "http" };

    let mut endpoint = Endpoint::from_shared(format!("{scheme}://{address}"))
        .map_err(|e| A2AError::TransportInit(format!("invalid gRPC address '{address}': {e}")))?
        .connect_timeout(config.timeout);

    if let Some(tls) = tls {
        let tls_config = match tls.read_ca_pem()? {
            Some(pem) => ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem)),
            None => ClientTlsConfig::new().with_native_roots(),
        };
        endpoint = endpoint
            .tls_config(tls_config)
            .map_err(|e| A2AError::TransportInit(format!("gRPC TLS set-up failed: {e}")))?;
    } else if config.tls.is_some() {
        tracing::warn!("TLS verification disabled; using a plaintext gRPC channel");
    }

    Ok(endpoint.connect_lazy())
}

fn task_name(task_id: &str) -> String {
    format!("tasks/{task_id}")
}

#[async_trait]
impl Transport for GrpcTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Grpc
    }

    async fn send_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
    ) -> A2AResult<SendMessageResponse> {
        let request = self.unary_request(agent_id, convert::send_request_to_proto(request)?)?;
        let response = self.client()?.send_message(request).await?;
        convert::send_response_from_proto(response.into_inner())
    }

    async fn stream_message(
        &self,
        agent_id: &str,
        request: SendMessageRequest,
        cancel: CancellationToken,
    ) -> A2AResult<EventStream> {
        let request = self.request(agent_id, convert::send_request_to_proto(request)?)?;
        let response = self.client()?.send_streaming_message(request).await?;

        let events = response.into_inner().filter_map(|item| {
            futures::future::ready(match item {
                Ok(event) => convert::stream_response_from_proto(event).map(Ok),
                Err(status) => Some(Err(A2AError::from(status))),
            })
        });
        Ok(EventStream::from_events(events, &cancel))
    }

    async fn list_agents(&self) -> A2AResult<Vec<AgentCard>> {
        self.rest.list_agents().await
    }

    async fn get_agent_card(&self, agent_id: &str) -> A2AResult<AgentCard> {
        let request = self.unary_request(agent_id, proto::GetAgentCardRequest {})?;
        let card = self.client()?.get_agent_card(request).await?;
        Ok(convert::agent_card_from_proto(card.into_inner()))
    }

    async fn get_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task> {
        let request = self.unary_request(
            agent_id,
            proto::GetTaskRequest {
                name: task_name(task_id),
                history_length: 0,
            },
        )?;
        let task = self.client()?.get_task(request).await?;
        Ok(convert::task_from_proto(task.into_inner()))
    }

    async fn list_tasks(&self, request: &ListTasksRequest) -> A2AResult<ListTasksResponse> {
        self.rest.list_tasks(request).await
    }

    async fn cancel_task(&self, agent_id: &str, task_id: &str) -> A2AResult<Task> {
        let request = self.unary_request(
            agent_id,
            proto::CancelTaskRequest {
                name: task_name(task_id),
            },
        )?;
        let task = self.client()?.cancel_task(request).await?;
        Ok(convert::task_from_proto(task.into_inner()))
    }

    async fn close(&self) -> A2AResult<()> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| A2AError::Transport("gRPC client lock poisoned".to_string()))?;
        if guard.take().is_some() {
            tracing::debug!(address = %self.address, "gRPC channel closed");
        }
        Ok(())
    }
}
