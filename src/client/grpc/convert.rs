//! Conversion between the protobuf wire types and the domain types.
//!
//! Outgoing conversions only cover what the client sends (messages and send
//! requests); everything else flows in one direction, proto to domain.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use prost_types::value::Kind;
use serde_json::{Map, Number, Value};

use crate::error::{A2AError, A2AResult};
use crate::proto;
use crate::types::{
    AgentCapabilities, AgentCard, AgentSkill, Artifact, FilePart, Message, Part, Role,
    SendMessageRequest, SendMessageResponse, StreamResponse, Task, TaskArtifactUpdateEvent,
    TaskState, TaskStatus, TaskStatusUpdateEvent,
};

// ---------------------------------------------------------------------------
// google.protobuf.Struct <-> serde_json::Value
// ---------------------------------------------------------------------------

pub(crate) fn struct_to_json(s: prost_types::Struct) -> Value {
    Value::Object(
        s.fields
            .into_iter()
            .map(|(k, v)| (k, value_to_json(v)))
            .collect(),
    )
}

fn value_to_json(v: prost_types::Value) -> Value {
    match v.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::NumberValue(n)) => number_to_json(n),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::StructValue(s)) => struct_to_json(s),
        Some(Kind::ListValue(l)) => Value::Array(l.values.into_iter().map(value_to_json).collect()),
    }
}

/// Struct numbers are doubles; whole numbers come back as integers.
fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// JSON objects map to a `Struct` directly; any other value is stored under
/// a `value` key.
pub(crate) fn json_to_struct(v: Value) -> prost_types::Struct {
    let map = match v {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    prost_types::Struct {
        fields: map
            .into_iter()
            .map(|(k, v)| (k, json_to_value(v)))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn json_to_value(v: Value) -> prost_types::Value {
    let kind = match v {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.into_iter().map(json_to_value).collect(),
        }),
        obj @ Value::Object(_) => Kind::StructValue(json_to_struct(obj)),
    };
    prost_types::Value { kind: Some(kind) }
}

fn metadata_from_proto(s: Option<prost_types::Struct>) -> Option<Value> {
    s.filter(|s| !s.fields.is_empty()).map(struct_to_json)
}

fn timestamp_to_rfc3339(ts: prost_types::Timestamp) -> Option<String> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    chrono::DateTime::from_timestamp(ts.seconds, nanos).map(|dt| dt.to_rfc3339())
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

// ---------------------------------------------------------------------------
// Domain -> proto
// ---------------------------------------------------------------------------

fn part_to_proto(part: Part) -> A2AResult<proto::Part> {
    let (inner, metadata) = match part {
        Part::Text { text, metadata } => (proto::part::Part::Text(text), metadata),
        Part::Data { data, metadata } => (
            proto::part::Part::Data(proto::DataPart {
                data: Some(json_to_struct(data)),
            }),
            metadata,
        ),
        Part::File { file, metadata } => {
            let content = match (file.uri, file.bytes) {
                (Some(uri), _) => Some(proto::file_part::File::FileWithUri(uri)),
                (None, Some(bytes)) => {
                    let decoded = BASE64.decode(bytes.as_bytes()).map_err(|e| {
                        A2AError::Other(format!("file part bytes are not valid base64: {e}"))
                    })?;
                    Some(proto::file_part::File::FileWithBytes(decoded))
                }
                (None, None) => None,
            };
            (
                proto::part::Part::File(proto::FilePart {
                    mime_type: file.mime_type.unwrap_or_default(),
                    name: file.name.unwrap_or_default(),
                    file: content,
                }),
                metadata,
            )
        }
    };
    Ok(proto::Part {
        metadata: metadata.map(json_to_struct),
        part: Some(inner),
    })
}

pub(crate) fn message_to_proto(message: Message) -> A2AResult<proto::Message> {
    Ok(proto::Message {
        message_id: message.message_id,
        context_id: message.context_id.unwrap_or_default(),
        task_id: message.task_id.unwrap_or_default(),
        role: message.role.proto_number(),
        content: message
            .parts
            .into_iter()
            .map(part_to_proto)
            .collect::<A2AResult<_>>()?,
        metadata: message.metadata.map(json_to_struct),
        extensions: message.extensions,
    })
}

pub(crate) fn send_request_to_proto(
    request: SendMessageRequest,
) -> A2AResult<proto::SendMessageRequest> {
    Ok(proto::SendMessageRequest {
        request: Some(message_to_proto(request.message)?),
        configuration: request
            .configuration
            .map(|c| proto::SendMessageConfiguration {
                accepted_output_modes: c.accepted_output_modes,
                history_length: c.history_length.unwrap_or_default(),
                blocking: c.blocking,
            }),
        metadata: request.metadata.map(json_to_struct),
    })
}

// ---------------------------------------------------------------------------
// Proto -> domain
// ---------------------------------------------------------------------------

fn part_from_proto(part: proto::Part) -> Option<Part> {
    let metadata = metadata_from_proto(part.metadata);
    let part = match part.part? {
        proto::part::Part::Text(text) => Part::Text { text, metadata },
        proto::part::Part::Data(data) => Part::Data {
            data: data.data.map(struct_to_json).unwrap_or(Value::Object(Map::new())),
            metadata,
        },
        proto::part::Part::File(file) => {
            let (uri, bytes) = match file.file {
                Some(proto::file_part::File::FileWithUri(uri)) => (Some(uri), None),
                Some(proto::file_part::File::FileWithBytes(bytes)) => {
                    (None, Some(BASE64.encode(bytes)))
                }
                None => (None, None),
            };
            Part::File {
                file: FilePart {
                    uri,
                    bytes,
                    mime_type: non_empty(file.mime_type),
                    name: non_empty(file.name),
                },
                metadata,
            }
        }
    };
    Some(part)
}

fn parts_from_proto(parts: Vec<proto::Part>) -> Vec<Part> {
    parts.into_iter().filter_map(part_from_proto).collect()
}

pub(crate) fn message_from_proto(message: proto::Message) -> Message {
    Message {
        message_id: message.message_id,
        context_id: non_empty(message.context_id),
        task_id: non_empty(message.task_id),
        role: Role::from_proto_number(message.role),
        parts: parts_from_proto(message.content),
        metadata: metadata_from_proto(message.metadata),
        extensions: message.extensions,
    }
}

fn status_from_proto(status: Option<proto::TaskStatus>) -> TaskStatus {
    let Some(status) = status else {
        return TaskStatus::default();
    };
    TaskStatus {
        state: TaskState::from_proto_number(status.state),
        message: status.update.map(message_from_proto),
        timestamp: status.timestamp.and_then(timestamp_to_rfc3339),
    }
}

fn artifact_from_proto(artifact: proto::Artifact) -> Artifact {
    Artifact {
        artifact_id: artifact.artifact_id,
        name: non_empty(artifact.name),
        description: non_empty(artifact.description),
        parts: parts_from_proto(artifact.parts),
        metadata: metadata_from_proto(artifact.metadata),
        extensions: artifact.extensions,
    }
}

pub(crate) fn task_from_proto(task: proto::Task) -> Task {
    Task {
        id: task.id,
        context_id: task.context_id,
        status: status_from_proto(task.status),
        artifacts: task.artifacts.into_iter().map(artifact_from_proto).collect(),
        history: task.history.into_iter().map(message_from_proto).collect(),
        metadata: metadata_from_proto(task.metadata),
    }
}

pub(crate) fn send_response_from_proto(
    response: proto::SendMessageResponse,
) -> A2AResult<SendMessageResponse> {
    match response.payload {
        Some(proto::send_message_response::Payload::Task(task)) => {
            Ok(SendMessageResponse::Task(task_from_proto(task)))
        }
        Some(proto::send_message_response::Payload::Msg(msg)) => {
            Ok(SendMessageResponse::Message(message_from_proto(msg)))
        }
        None => Err(A2AError::InvalidJson(
            "send response holds neither a task nor a message".to_string(),
        )),
    }
}

/// `None` for an empty oneof.
pub(crate) fn stream_response_from_proto(response: proto::StreamResponse) -> Option<StreamResponse> {
    use proto::stream_response::Payload;

    let event = match response.payload? {
        Payload::Task(task) => StreamResponse::Task(task_from_proto(task)),
        Payload::Msg(msg) => StreamResponse::Message(message_from_proto(msg)),
        Payload::StatusUpdate(update) => StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
            task_id: update.task_id,
            context_id: update.context_id,
            status: status_from_proto(update.status),
            is_final: update.r#final,
            metadata: metadata_from_proto(update.metadata),
        }),
        Payload::ArtifactUpdate(update) => StreamResponse::ArtifactUpdate(TaskArtifactUpdateEvent {
            task_id: update.task_id,
            context_id: update.context_id,
            artifact: update.artifact.map(artifact_from_proto).unwrap_or_default(),
            append: update.append,
            last_chunk: update.last_chunk,
            metadata: metadata_from_proto(update.metadata),
        }),
    };
    Some(event)
}

pub(crate) fn agent_card_from_proto(card: proto::AgentCard) -> AgentCard {
    let capabilities = card.capabilities.unwrap_or_default();
    AgentCard {
        name: card.name,
        description: card.description,
        url: card.url,
        version: card.version,
        protocol_version: card.protocol_version,
        documentation_url: non_empty(card.documentation_url),
        capabilities: AgentCapabilities {
            streaming: capabilities.streaming,
            push_notifications: capabilities.push_notifications,
        },
        preferred_transport: card.preferred_transport,
        default_input_modes: card.default_input_modes,
        default_output_modes: card.default_output_modes,
        skills: card
            .skills
            .into_iter()
            .map(|s| AgentSkill {
                id: s.id,
                name: s.name,
                description: s.description,
                tags: s.tags,
                examples: s.examples,
                input_modes: s.input_modes,
                output_modes: s.output_modes,
            })
            .collect(),
    }
}
