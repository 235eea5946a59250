//! Protobuf wire types and service client for the `a2a.v1` gRPC binding.
//!
//! Written in the shape `prost-build` / `tonic-build` emit, restricted to the
//! messages and RPCs the client uses, so the crate builds without `protoc`.
//! Field tags follow `a2a.proto`.

#![allow(missing_docs)]

use prost_types::{Struct, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TaskState {
    Unspecified = 0,
    Submitted = 1,
    Working = 2,
    Completed = 3,
    Failed = 4,
    Cancelled = 5,
    InputRequired = 6,
    Rejected = 7,
    AuthRequired = 8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Role {
    Unspecified = 0,
    User = 1,
    Agent = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub message_id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(string, tag = "3")]
    pub task_id: String,
    #[prost(enumeration = "Role", tag = "4")]
    pub role: i32,
    #[prost(message, repeated, tag = "5")]
    pub content: Vec<Part>,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<Struct>,
    #[prost(string, repeated, tag = "7")]
    pub extensions: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Part {
    #[prost(message, optional, tag = "4")]
    pub metadata: Option<Struct>,
    #[prost(oneof = "part::Part", tags = "1, 2, 3")]
    pub part: Option<part::Part>,
}

pub mod part {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Part {
        #[prost(string, tag = "1")]
        Text(String),
        #[prost(message, tag = "2")]
        File(super::FilePart),
        #[prost(message, tag = "3")]
        Data(super::DataPart),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilePart {
    #[prost(string, tag = "3")]
    pub mime_type: String,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(oneof = "file_part::File", tags = "1, 2")]
    pub file: Option<file_part::File>,
}

pub mod file_part {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum File {
        #[prost(string, tag = "1")]
        FileWithUri(String),
        #[prost(bytes = "vec", tag = "2")]
        FileWithBytes(Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataPart {
    #[prost(message, optional, tag = "1")]
    pub data: Option<Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskStatus {
    #[prost(enumeration = "TaskState", tag = "1")]
    pub state: i32,
    #[prost(message, optional, tag = "2")]
    pub update: Option<Message>,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Artifact {
    #[prost(string, tag = "1")]
    pub artifact_id: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub description: String,
    #[prost(message, repeated, tag = "5")]
    pub parts: Vec<Part>,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<Struct>,
    #[prost(string, repeated, tag = "7")]
    pub extensions: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Task {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(message, optional, tag = "3")]
    pub status: Option<TaskStatus>,
    #[prost(message, repeated, tag = "4")]
    pub artifacts: Vec<Artifact>,
    #[prost(message, repeated, tag = "5")]
    pub history: Vec<Message>,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskStatusUpdateEvent {
    #[prost(string, tag = "1")]
    pub task_id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(message, optional, tag = "3")]
    pub status: Option<TaskStatus>,
    #[prost(bool, tag = "4")]
    pub r#final: bool,
    #[prost(message, optional, tag = "5")]
    pub metadata: Option<Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskArtifactUpdateEvent {
    #[prost(string, tag = "1")]
    pub task_id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(message, optional, tag = "3")]
    pub artifact: Option<Artifact>,
    #[prost(bool, tag = "4")]
    pub append: bool,
    #[prost(bool, tag = "5")]
    pub last_chunk: bool,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageConfiguration {
    #[prost(string, repeated, tag = "1")]
    pub accepted_output_modes: Vec<String>,
    #[prost(int32, tag = "3")]
    pub history_length: i32,
    #[prost(bool, tag = "4")]
    pub blocking: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageRequest {
    #[prost(message, optional, tag = "1")]
    pub request: Option<Message>,
    #[prost(message, optional, tag = "2")]
    pub configuration: Option<SendMessageConfiguration>,
    #[prost(message, optional, tag = "3")]
    pub metadata: Option<Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageResponse {
    #[prost(oneof = "send_message_response::Payload", tags = "1, 2")]
    pub payload: Option<send_message_response::Payload>,
}

pub mod send_message_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        Task(super::Task),
        #[prost(message, tag = "2")]
        Msg(super::Message),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamResponse {
    #[prost(oneof = "stream_response::Payload", tags = "1, 2, 3, 4")]
    pub payload: Option<stream_response::Payload>,
}

pub mod stream_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        Task(super::Task),
        #[prost(message, tag = "2")]
        Msg(super::Message),
        #[prost(message, tag = "3")]
        StatusUpdate(super::TaskStatusUpdateEvent),
        #[prost(message, tag = "4")]
        ArtifactUpdate(super::TaskArtifactUpdateEvent),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTaskRequest {
    /// `tasks/{task_id}`
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub history_length: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelTaskRequest {
    /// `tasks/{task_id}`
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAgentCardRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentCapabilities {
    #[prost(bool, tag = "1")]
    pub streaming: bool,
    #[prost(bool, tag = "2")]
    pub push_notifications: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentSkill {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, repeated, tag = "4")]
    pub tags: Vec<String>,
    #[prost(string, repeated, tag = "5")]
    pub examples: Vec<String>,
    #[prost(string, repeated, tag = "6")]
    pub input_modes: Vec<String>,
    #[prost(string, repeated, tag = "7")]
    pub output_modes: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentCard {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub description: String,
    #[prost(string, tag = "3")]
    pub url: String,
    #[prost(string, tag = "5")]
    pub version: String,
    #[prost(string, tag = "6")]
    pub documentation_url: String,
    #[prost(message, optional, tag = "7")]
    pub capabilities: Option<AgentCapabilities>,
    #[prost(string, repeated, tag = "10")]
    pub default_input_modes: Vec<String>,
    #[prost(string, repeated, tag = "11")]
    pub default_output_modes: Vec<String>,
    #[prost(message, repeated, tag = "12")]
    pub skills: Vec<AgentSkill>,
    #[prost(string, tag = "14")]
    pub preferred_transport: String,
    #[prost(string, tag = "16")]
    pub protocol_version: String,
}

/// Client for the `a2a.v1.A2AService` gRPC service.
pub mod a2a_service_client {
    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::transport::Channel;

    const SERVICE: &str = "a2a.v1.A2AService";

    #[derive(Debug, Clone)]
    pub struct A2aServiceClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl A2aServiceClient {
        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        async fn ready(&mut self) -> Result<(), tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {e}")))
        }

        pub async fn send_message(
            &mut self,
            request: impl tonic::IntoRequest<super::SendMessageRequest>,
        ) -> Result<tonic::Response<super::SendMessageResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/a2a.v1.A2AService/SendMessage");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(tonic::GrpcMethod::new(SERVICE, "SendMessage"));
            self.inner.unary(req, path, codec).await
        }

        pub async fn send_streaming_message(
            &mut self,
            request: impl tonic::IntoRequest<super::SendMessageRequest>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::StreamResponse>>, tonic::Status>
        {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/a2a.v1.A2AService/SendStreamingMessage");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(tonic::GrpcMethod::new(SERVICE, "SendStreamingMessage"));
            self.inner.server_streaming(req, path, codec).await
        }

        pub async fn get_task(
            &mut self,
            request: impl tonic::IntoRequest<super::GetTaskRequest>,
        ) -> Result<tonic::Response<super::Task>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/a2a.v1.A2AService/GetTask");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(tonic::GrpcMethod::new(SERVICE, "GetTask"));
            self.inner.unary(req, path, codec).await
        }

        pub async fn cancel_task(
            &mut self,
            request: impl tonic::IntoRequest<super::CancelTaskRequest>,
        ) -> Result<tonic::Response<super::Task>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/a2a.v1.A2AService/CancelTask");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(tonic::GrpcMethod::new(SERVICE, "CancelTask"));
            self.inner.unary(req, path, codec).await
        }

        pub async fn get_agent_card(
            &mut self,
            request: impl tonic::IntoRequest<super::GetAgentCardRequest>,
        ) -> Result<tonic::Response<super::AgentCard>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/a2a.v1.A2AService/GetAgentCard");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(tonic::GrpcMethod::new(SERVICE, "GetAgentCard"));
            self.inner.unary(req, path, codec).await
        }
    }
}
