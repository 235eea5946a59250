//! A2A client: reach agents over gRPC, REST or JSON-RPC.
//!
//! - [`A2AClient`]: the unified facade over discovery, transport selection
//!   and every task/message operation
//! - [`CardResolver`]: agent card discovery
//! - [`Transport`]: the operation set each wire binding implements
//!   ([`GrpcTransport`], [`RestTransport`], [`JsonRpcTransport`])
//! - [`EventStream`]: decoded events of a streaming call
//!
//! # Quick Start
//!
//! ```no_run
//! use a2a_universal::client::{A2AClient, ClientConfig};
//! use a2a_universal::types::SendMessageResponse;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = A2AClient::connect(ClientConfig {
//!     url: "http://localhost:8080".to_string(),
//!     agent_id: Some("assistant".to_string()),
//!     ..ClientConfig::default()
//! })
//! .await?;
//!
//! match client.send_text("Hello, agent!").await? {
//!     SendMessageResponse::Task(task) => {
//!         println!("Task {} status: {}", task.id, task.status.state);
//!     }
//!     SendMessageResponse::Message(msg) => {
//!         println!("Direct reply: {:?}", msg);
//!     }
//! }
//!
//! let mut stream = client.stream_text("Write a haiku").await?;
//! while let Some(event) = stream.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

mod a2a_client;
mod card_resolver;
mod grpc;
mod jsonrpc;
mod rest;
mod selector;
mod sse;
mod transport;

pub use a2a_client::{A2AClient, ClientConfig};
pub use card_resolver::{
    agent_id_from_url, service_base_url, CardResolver, ResolvedAgent, AGENT_CARD_PATH,
    DEFAULT_AGENT_ID,
};
pub use grpc::GrpcTransport;
pub use jsonrpc::JsonRpcTransport;
pub use rest::RestTransport;
pub use selector::{build_transport, extract_grpc_address};
pub use sse::{decode_payload, EventStream, EventStreamAdapter, SseDecoder, STREAM_CHANNEL_CAPACITY};
pub use transport::{TlsConfig, Transport, TransportConfig, TransportKind, DEFAULT_TIMEOUT};
