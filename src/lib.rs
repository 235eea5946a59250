//! # a2a-universal: one client for A2A agents on any wire binding
//!
//! This crate talks to agents speaking the
//! [A2A protocol](https://a2a-protocol.org/latest/specification/) over gRPC,
//! HTTP+JSON (REST) or JSON-RPC 2.0, and walks tasks through
//! human-in-the-loop approval pauses.
//!
//! ## Overview
//!
//! - **Discovery**: fetch the agent card from
//!   `{base}/v1/agents/{id}/.well-known/agent-card.json` (or the locator
//!   itself), correct the base URL and infer the agent ID
//! - **Transport selection**: the card's `preferred_transport` picks one
//!   [`client::Transport`] implementation, gRPC when unspecified
//! - **Streaming**: SSE bodies and gRPC server streams are decoded into
//!   [`types::StreamResponse`] events on a bounded channel
//! - **Approvals**: [`approval::ApprovalOrchestrator`] prompts once per
//!   approval request, sends the decision and polls resumed tasks
//!
//! ## Quick Start
//!
//! ```no_run
//! use a2a_universal::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new("http://localhost:8080/v1/agents/writer")
//!         .build()
//!         .await?;
//!     println!("connected over {}", client.transport_kind());
//!
//!     match client.send_text("Write a haiku about Rust").await? {
//!         SendMessageResponse::Task(task) => {
//!             println!("Task: {} (status: {})", task.id, task.status.state);
//!         }
//!         SendMessageResponse::Message(msg) => {
//!             println!("Direct reply: {:?}", msg);
//!         }
//!     }
//!
//!     let mut stream = client.stream_text("Tell me a story").await?;
//!     while let Some(event) = stream.next().await {
//!         if let StreamResponse::StatusUpdate(update) = event? {
//!             println!("Status: {}", update.status.state);
//!         }
//!     }
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`client::A2AClient`]: facade over discovery and the selected transport
//! - [`client::CardResolver`]: agent card discovery
//! - [`client::GrpcTransport`], [`client::RestTransport`],
//!   [`client::JsonRpcTransport`]: the wire bindings
//! - [`client::SseDecoder`] / [`client::EventStream`]: stream decoding
//! - [`approval`]: approval detection, prompting and task polling
//! - [`types`]: the A2A data model with its canonical JSON mapping
//! - [`proto`]: protobuf messages and the gRPC service client
//! - [`error::A2AError`]: error taxonomy

pub mod approval;
pub mod builders;
pub mod client;
pub mod error;
pub mod proto;
pub mod types;
pub mod utils;

/// Prelude module that re-exports commonly used types and traits.
///
/// ```
/// use a2a_universal::prelude::*;
///
/// let message = Message::user_text("hello");
/// assert_eq!(message.role, Role::User);
/// ```
pub mod prelude {
    pub use crate::types::{
        AgentCapabilities, AgentCard, AgentSkill, Artifact, FilePart, Message, Part, Role,
        SendMessageConfiguration, SendMessageRequest, SendMessageResponse, StreamResponse, Task,
        TaskArtifactUpdateEvent, TaskState, TaskStatus, TaskStatusUpdateEvent,
    };

    pub use crate::error::{A2AError, A2AResult};

    pub use crate::builders::ClientBuilder;

    pub use crate::client::{A2AClient, ClientConfig, EventStream, Transport, TransportKind};

    pub use crate::approval::{
        ApprovalConfig, ApprovalOrchestrator, Console, Decision, Outcome, StdConsole,
    };
}

pub use builders::ClientBuilder;
pub use error::{A2AError, A2AResult};
pub use types::*;
