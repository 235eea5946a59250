//! A2A protocol types shared by every transport.
//!
//! Serialization follows the protobuf JSON mapping of the `a2a.v1` package
//! (lowerCamelCase keys, `TASK_STATE_*` / `ROLE_*` enum strings, oneof
//! wrapper objects). Deserialization is lenient and also accepts the flat,
//! `kind`-discriminated shape used by A2A SDK servers, lowercase enum
//! strings, and snake_case keys. Unknown fields are ignored everywhere.

use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ============================================================================
// Enums
// ============================================================================

/// The lifecycle state of a task.
///
/// `SUBMITTED → WORKING → {INPUT_REQUIRED ⇄ WORKING} → terminal`. A task may
/// cycle between `Working` and `InputRequired` any number of times.
///
/// Proto ref: `enum TaskState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskState {
    /// State not reported.
    #[default]
    Unspecified,
    /// Task has been received but not yet started.
    Submitted,
    /// Task is actively being processed.
    Working,
    /// Task completed successfully.
    Completed,
    /// Task failed.
    Failed,
    /// Task was cancelled.
    Cancelled,
    /// Task is paused waiting for input (e.g. a human approval).
    InputRequired,
    /// Task was rejected by the agent.
    Rejected,
    /// Task requires authentication.
    AuthRequired,
}

impl TaskState {
    /// `true` for states a task never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled | TaskState::Rejected
        )
    }

    /// The protobuf enum number.
    pub fn proto_number(self) -> i32 {
        match self {
            TaskState::Unspecified => 0,
            TaskState::Submitted => 1,
            TaskState::Working => 2,
            TaskState::Completed => 3,
            TaskState::Failed => 4,
            TaskState::Cancelled => 5,
            TaskState::InputRequired => 6,
            TaskState::Rejected => 7,
            TaskState::AuthRequired => 8,
        }
    }

    /// Inverse of [`proto_number`](Self::proto_number). Unknown numbers map
    /// to `Unspecified`.
    pub fn from_proto_number(n: i32) -> Self {
        match n {
            1 => TaskState::Submitted,
            2 => TaskState::Working,
            3 => TaskState::Completed,
            4 => TaskState::Failed,
            5 => TaskState::Cancelled,
            6 => TaskState::InputRequired,
            7 => TaskState::Rejected,
            8 => TaskState::AuthRequired,
            _ => TaskState::Unspecified,
        }
    }

    /// Canonical protobuf JSON name.
    pub fn as_proto_str(self) -> &'static str {
        match self {
            TaskState::Unspecified => "TASK_STATE_UNSPECIFIED",
            TaskState::Submitted => "TASK_STATE_SUBMITTED",
            TaskState::Working => "TASK_STATE_WORKING",
            TaskState::Completed => "TASK_STATE_COMPLETED",
            TaskState::Failed => "TASK_STATE_FAILED",
            TaskState::Cancelled => "TASK_STATE_CANCELLED",
            TaskState::InputRequired => "TASK_STATE_INPUT_REQUIRED",
            TaskState::Rejected => "TASK_STATE_REJECTED",
            TaskState::AuthRequired => "TASK_STATE_AUTH_REQUIRED",
        }
    }

    /// Parse any of the spellings seen on the wire: `TASK_STATE_WORKING`,
    /// `working`, `input-required`, `input_required`, `canceled`, ...
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let name = normalized
            .strip_prefix("task_state_")
            .unwrap_or(normalized.as_str());
        let state = match name {
            "unspecified" | "unknown" | "" => TaskState::Unspecified,
            "submitted" => TaskState::Submitted,
            "working" => TaskState::Working,
            "completed" => TaskState::Completed,
            "failed" => TaskState::Failed,
            "cancelled" | "canceled" => TaskState::Cancelled,
            "input_required" => TaskState::InputRequired,
            "rejected" => TaskState::Rejected,
            "auth_required" => TaskState::AuthRequired,
            _ => return None,
        };
        Some(state)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Unspecified => "unspecified",
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Cancelled => "cancelled",
            TaskState::InputRequired => "input-required",
            TaskState::Rejected => "rejected",
            TaskState::AuthRequired => "auth-required",
        };
        write!(f, "{}", s)
    }
}

impl Serialize for TaskState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_proto_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => TaskState::parse(&s)
                .ok_or_else(|| D::Error::custom(format!("unknown task state '{s}'"))),
            Value::Number(n) => Ok(TaskState::from_proto_number(
                n.as_i64().unwrap_or_default() as i32,
            )),
            Value::Null => Ok(TaskState::Unspecified),
            other => Err(D::Error::custom(format!(
                "task state must be a string or number, got {other}"
            ))),
        }
    }
}

/// The role of a message sender.
///
/// Proto ref: `enum Role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Unspecified role.
    #[default]
    Unspecified,
    /// Message from the user / client.
    User,
    /// Message from the agent / server.
    Agent,
}

impl Role {
    /// The protobuf enum number.
    pub fn proto_number(self) -> i32 {
        match self {
            Role::Unspecified => 0,
            Role::User => 1,
            Role::Agent => 2,
        }
    }

    /// Inverse of [`proto_number`](Self::proto_number).
    pub fn from_proto_number(n: i32) -> Self {
        match n {
            1 => Role::User,
            2 => Role::Agent,
            _ => Role::Unspecified,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
            Role::Unspecified => write!(f, "unspecified"),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Role::Unspecified => "ROLE_UNSPECIFIED",
            Role::User => "ROLE_USER",
            Role::Agent => "ROLE_AGENT",
        })
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => {
                let lower = s.to_ascii_lowercase();
                Ok(match lower.strip_prefix("role_").unwrap_or(lower.as_str()) {
                    "user" => Role::User,
                    "agent" | "assistant" => Role::Agent,
                    _ => Role::Unspecified,
                })
            }
            Value::Number(n) => Ok(Role::from_proto_number(n.as_i64().unwrap_or_default() as i32)),
            _ => Ok(Role::Unspecified),
        }
    }
}

// ============================================================================
// Parts and Messages
// ============================================================================

/// A file carried inside a [`Part`], either by reference or inline.
///
/// Proto ref: `message FilePart`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    /// URI the file can be fetched from.
    #[serde(
        rename = "fileWithUri",
        alias = "uri",
        alias = "file_with_uri",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub uri: Option<String>,

    /// Base64-encoded file content.
    #[serde(
        rename = "fileWithBytes",
        alias = "bytes",
        alias = "file_with_bytes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bytes: Option<String>,

    /// MIME type of the file.
    #[serde(alias = "mime_type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// File name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single content part of a [`Message`] or [`Artifact`].
///
/// Serialized as the protobuf oneof (`{"text": ..}`, `{"data": {"data": ..}}`,
/// `{"file": ..}`). Also accepts the SDK form with a `kind` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
        /// Optional part metadata (e.g. `event_type`).
        metadata: Option<Value>,
    },
    /// Structured JSON data.
    Data {
        /// The structured payload.
        data: Value,
        /// Optional part metadata.
        metadata: Option<Value>,
    },
    /// A file reference or inline file.
    File {
        /// The file.
        file: FilePart,
        /// Optional part metadata.
        metadata: Option<Value>,
    },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    /// Create a structured data part.
    pub fn data(data: Value) -> Self {
        Part::Data {
            data,
            metadata: None,
        }
    }

    /// Attach metadata to this part (builder-style).
    pub fn with_metadata(mut self, value: Value) -> Self {
        match &mut self {
            Part::Text { metadata, .. } | Part::Data { metadata, .. } | Part::File { metadata, .. } => {
                *metadata = Some(value)
            }
        }
        self
    }

    /// Part metadata, if any.
    pub fn metadata(&self) -> Option<&Value> {
        match self {
            Part::Text { metadata, .. } | Part::Data { metadata, .. } | Part::File { metadata, .. } => {
                metadata.as_ref()
            }
        }
    }

    /// The text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The payload of a data part.
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Part::Data { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let metadata = self.metadata();
        let mut map = serializer.serialize_map(None)?;
        match self {
            Part::Text { text, .. } => map.serialize_entry("text", text)?,
            Part::Data { data, .. } => {
                map.serialize_entry("data", &serde_json::json!({ "data": data }))?
            }
            Part::File { file, .. } => map.serialize_entry("file", file)?,
        }
        if let Some(metadata) = metadata {
            map.serialize_entry("metadata", metadata)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        let obj = value
            .as_object_mut()
            .ok_or_else(|| D::Error::custom("part must be a JSON object"))?;

        let metadata = obj.remove("metadata").filter(|m| !m.is_null());
        let kind = obj
            .remove("kind")
            .and_then(|k| k.as_str().map(str::to_owned));

        let text = obj.remove("text");
        let data = obj.remove("data");
        let file = obj.remove("file");

        match (kind.as_deref(), text, data, file) {
            (Some("text") | None, Some(text), _, _) => Ok(Part::Text {
                text: text.as_str().unwrap_or_default().to_string(),
                metadata,
            }),
            (Some("data"), _, Some(data), _) => Ok(Part::Data { data, metadata }),
            (None, _, Some(data), _) => Ok(Part::Data {
                data: unwrap_data_part(data),
                metadata,
            }),
            (Some("file") | None, _, _, Some(file)) => Ok(Part::File {
                file: serde_json::from_value(file).map_err(D::Error::custom)?,
                metadata,
            }),
            (Some(other), ..) => Err(D::Error::custom(format!(
                "unknown or incomplete part kind '{other}'"
            ))),
            (None, ..) => Err(D::Error::custom(
                "part has none of 'text', 'data' or 'file'",
            )),
        }
    }
}

/// Protobuf `DataPart` is `{"data": <Struct>}`; unwrap it when that is all
/// the object holds.
fn unwrap_data_part(data: Value) -> Value {
    match data {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// A message exchanged between a user and an agent.
///
/// Proto ref: `message Message`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    #[serde(alias = "message_id", default)]
    pub message_id: String,

    /// Conversation (session) this message belongs to.
    #[serde(alias = "context_id", default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Task this message belongs to.
    #[serde(alias = "task_id", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Sender role.
    #[serde(default)]
    pub role: Role,

    /// Ordered content parts.
    #[serde(rename = "content", alias = "parts", default)]
    pub parts: Vec<Part>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Extension URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl Message {
    /// Create a message with a fresh ID.
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            role,
            parts,
            ..Self::default()
        }
    }

    /// A user message with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Bind the message to a conversation (builder-style). Empty IDs are
    /// left unset.
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = non_empty(context_id.into());
        self
    }

    /// Bind the message to a task (builder-style). Empty IDs are left unset.
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = non_empty(task_id.into());
        self
    }

    /// Task ID, or `""` when unset.
    pub fn task_id_str(&self) -> &str {
        self.task_id.as_deref().unwrap_or_default()
    }

    /// Context ID, or `""` when unset.
    pub fn context_id_str(&self) -> &str {
        self.context_id.as_deref().unwrap_or_default()
    }
}

pub(crate) fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// The status of a task: its state plus an optional message (for
/// `InputRequired` this is the prompt for the human).
///
/// Proto ref: `message TaskStatus`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// The current state.
    #[serde(default)]
    pub state: TaskState,

    /// Message associated with this status.
    #[serde(rename = "update", alias = "message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// RFC 3339 timestamp of when this status was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TaskStatus {
    /// A status with just a state.
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Attach the status message (builder-style).
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }
}

/// An output produced by a task.
///
/// Proto ref: `message Artifact`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Unique artifact identifier.
    #[serde(alias = "artifact_id", default)]
    pub artifact_id: String,

    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Extension URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

/// A unit of work on the remote agent. Only the agent mutates a task; the
/// client observes it via `GetTask` or stream events.
///
/// Proto ref: `message Task`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    #[serde(default)]
    pub id: String,

    /// Conversation this task belongs to.
    #[serde(alias = "context_id", default)]
    pub context_id: String,

    /// Current status.
    #[serde(default)]
    pub status: TaskStatus,

    /// Artifacts produced so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,

    /// Prior messages, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Task {
    /// Shorthand for `self.status.state`.
    pub fn state(&self) -> TaskState {
        self.status.state
    }

    /// The message embedded in the current status, if any.
    pub fn status_message(&self) -> Option<&Message> {
        self.status.message.as_ref()
    }
}

/// Streamed notice that a task's status changed.
///
/// Proto ref: `message TaskStatusUpdateEvent`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    /// Task the update belongs to.
    #[serde(alias = "task_id", default)]
    pub task_id: String,

    /// Conversation the task belongs to.
    #[serde(alias = "context_id", default)]
    pub context_id: String,

    /// New status.
    #[serde(default)]
    pub status: TaskStatus,

    /// `true` on the last event of the stream.
    #[serde(rename = "final", default)]
    pub is_final: bool,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Streamed notice that an artifact was produced or extended.
///
/// Proto ref: `message TaskArtifactUpdateEvent`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    /// Task the artifact belongs to.
    #[serde(alias = "task_id", default)]
    pub task_id: String,

    /// Conversation the task belongs to.
    #[serde(alias = "context_id", default)]
    pub context_id: String,

    /// The artifact (or chunk of it).
    #[serde(default)]
    pub artifact: Artifact,

    /// Append to a previously sent artifact with the same ID.
    #[serde(default)]
    pub append: bool,

    /// Last chunk of this artifact.
    #[serde(alias = "last_chunk", default)]
    pub last_chunk: bool,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

// ============================================================================
// Oneof payloads
// ============================================================================

/// One event of a streaming call.
///
/// Proto ref: `message StreamResponse` (oneof `payload`)
#[derive(Debug, Clone, PartialEq)]
pub enum StreamResponse {
    /// Full task snapshot.
    Task(Task),
    /// A message chunk.
    Message(Message),
    /// A status change.
    StatusUpdate(TaskStatusUpdateEvent),
    /// An artifact change.
    ArtifactUpdate(TaskArtifactUpdateEvent),
}

impl StreamResponse {
    /// Status carried by this event (task snapshot or status update).
    pub fn status(&self) -> Option<&TaskStatus> {
        match self {
            StreamResponse::Task(task) => Some(&task.status),
            StreamResponse::StatusUpdate(update) => Some(&update.status),
            _ => None,
        }
    }
}

impl Serialize for StreamResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            StreamResponse::Task(inner) => map.serialize_entry("task", inner)?,
            StreamResponse::Message(inner) => map.serialize_entry("msg", inner)?,
            StreamResponse::StatusUpdate(inner) => map.serialize_entry("statusUpdate", inner)?,
            StreamResponse::ArtifactUpdate(inner) => {
                map.serialize_entry("artifactUpdate", inner)?
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StreamResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| D::Error::custom("stream response must be a JSON object"))?;

        let kind = obj.get("kind").and_then(Value::as_str).map(str::to_owned);
        if let Some(kind) = kind {
            return match kind.as_str() {
                "task" => from_value(value).map(StreamResponse::Task),
                "message" => from_value(value).map(StreamResponse::Message),
                "status-update" => from_value(value).map(StreamResponse::StatusUpdate),
                "artifact-update" => from_value(value).map(StreamResponse::ArtifactUpdate),
                other => Err(D::Error::custom(format!(
                    "unknown kind '{other}', expected one of: task, message, status-update, artifact-update"
                ))),
            };
        }

        if let Some(inner) = wrapped(obj, &["task"]) {
            return from_value(inner).map(StreamResponse::Task);
        }
        if let Some(inner) = wrapped(obj, &["msg", "message"]) {
            return from_value(inner).map(StreamResponse::Message);
        }
        if let Some(inner) = wrapped(obj, &["statusUpdate", "status_update"]) {
            return from_value(inner).map(StreamResponse::StatusUpdate);
        }
        if let Some(inner) = wrapped(obj, &["artifactUpdate", "artifact_update"]) {
            return from_value(inner).map(StreamResponse::ArtifactUpdate);
        }

        Err(D::Error::custom(
            "stream response has no 'kind' and no task/msg/statusUpdate/artifactUpdate payload",
        ))
    }
}

/// Result of a unary `SendMessage`.
///
/// Proto ref: `message SendMessageResponse` (oneof `payload`)
#[derive(Debug, Clone, PartialEq)]
pub enum SendMessageResponse {
    /// A task was created or updated.
    Task(Task),
    /// A direct message response.
    Message(Message),
}

impl SendMessageResponse {
    /// The task, when the agent answered with one.
    pub fn task(&self) -> Option<&Task> {
        match self {
            SendMessageResponse::Task(task) => Some(task),
            SendMessageResponse::Message(_) => None,
        }
    }
}

impl Serialize for SendMessageResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            SendMessageResponse::Task(inner) => map.serialize_entry("task", inner)?,
            SendMessageResponse::Message(inner) => map.serialize_entry("msg", inner)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SendMessageResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| D::Error::custom("send response must be a JSON object"))?;

        let kind = obj.get("kind").and_then(Value::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some("task") => return from_value(value).map(SendMessageResponse::Task),
            Some("message") => return from_value(value).map(SendMessageResponse::Message),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "unknown kind '{other}', expected one of: task, message"
                )))
            }
            None => {}
        }

        if let Some(inner) = wrapped(obj, &["task"]) {
            return from_value(inner).map(SendMessageResponse::Task);
        }
        if let Some(inner) = wrapped(obj, &["msg", "message"]) {
            return from_value(inner).map(SendMessageResponse::Message);
        }
        // Bare objects: a task has an id and a status, a message has a messageId.
        if obj.contains_key("id") && obj.contains_key("status") {
            return from_value(value).map(SendMessageResponse::Task);
        }
        if obj.contains_key("messageId") || obj.contains_key("message_id") {
            return from_value(value).map(SendMessageResponse::Message);
        }

        Err(D::Error::custom("send response holds neither a task nor a message"))
    }
}

fn wrapped(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| v.is_object())
        .cloned()
}

fn from_value<T: DeserializeOwned, E: serde::de::Error>(value: Value) -> Result<T, E> {
    serde_json::from_value(value).map_err(E::custom)
}

// ============================================================================
// Requests
// ============================================================================

/// Options for a send call.
///
/// Proto ref: `message SendMessageConfiguration`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageConfiguration {
    /// Output MIME types the client accepts.
    #[serde(alias = "accepted_output_modes", default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_output_modes: Vec<String>,

    /// Number of history messages to include in the returned task.
    #[serde(alias = "history_length", default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<i32>,

    /// Wait for the task to finish before answering.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocking: bool,
}

/// Body of `SendMessage` / `message:send` / `message/send`.
///
/// Proto ref: `message SendMessageRequest`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// The message to send.
    #[serde(alias = "request")]
    pub message: Message,

    /// Send options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SendMessageConfiguration>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl From<Message> for SendMessageRequest {
    fn from(message: Message) -> Self {
        Self {
            message,
            ..Self::default()
        }
    }
}

/// Filter for `ListTasks`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListTasksRequest {
    /// Only tasks of this conversation.
    pub context_id: Option<String>,
    /// Only tasks in this state.
    pub status: Option<TaskState>,
    /// Maximum number of tasks per page.
    pub page_size: Option<i32>,
    /// Continuation token from a previous page.
    pub page_token: Option<String>,
}

/// One page of `ListTasks`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksResponse {
    /// Tasks on this page.
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Token for the next page; empty on the last one.
    #[serde(alias = "next_page_token", default)]
    pub next_page_token: String,

    /// Total number of matching tasks, when the server reports it.
    #[serde(alias = "total_size", default)]
    pub total_size: i32,
}

// ============================================================================
// Agent Card
// ============================================================================

/// Optional capabilities an agent declares.
///
/// Proto ref: `message AgentCapabilities`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// The agent supports streaming responses.
    #[serde(default)]
    pub streaming: bool,

    /// The agent supports push notifications.
    #[serde(alias = "push_notifications", default)]
    pub push_notifications: bool,
}

/// A skill the agent advertises.
///
/// Proto ref: `message AgentSkill`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Unique skill identifier.
    #[serde(default)]
    pub id: String,
    /// Human-readable skill name.
    #[serde(default)]
    pub name: String,
    /// What the skill does.
    #[serde(default)]
    pub description: String,
    /// Categorization tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Example prompts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    /// Accepted input MIME types.
    #[serde(alias = "input_modes", default, skip_serializing_if = "Vec::is_empty")]
    pub input_modes: Vec<String>,
    /// Produced output MIME types.
    #[serde(alias = "output_modes", default, skip_serializing_if = "Vec::is_empty")]
    pub output_modes: Vec<String>,
}

/// Self-describing capability and address document of an agent.
///
/// Every field is optional on the wire; both `preferredTransport` and
/// `preferred_transport` are accepted.
///
/// Proto ref: `message AgentCard`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Human-readable agent name.
    #[serde(default)]
    pub name: String,

    /// What the agent does.
    #[serde(default)]
    pub description: String,

    /// Canonical URL of the agent.
    #[serde(default)]
    pub url: String,

    /// Agent version.
    #[serde(default)]
    pub version: String,

    /// A2A protocol version implemented.
    #[serde(alias = "protocol_version", default, skip_serializing_if = "String::is_empty")]
    pub protocol_version: String,

    /// Documentation link.
    #[serde(alias = "documentation_url", default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// Declared capabilities.
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Preferred transport: `grpc`, `rest` or `jsonrpc`.
    #[serde(alias = "preferred_transport", default, skip_serializing_if = "String::is_empty")]
    pub preferred_transport: String,

    /// Input MIME types accepted by default.
    #[serde(alias = "default_input_modes", default, skip_serializing_if = "Vec::is_empty")]
    pub default_input_modes: Vec<String>,

    /// Output MIME types produced by default.
    #[serde(alias = "default_output_modes", default, skip_serializing_if = "Vec::is_empty")]
    pub default_output_modes: Vec<String>,

    /// Advertised skills.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<AgentSkill>,
}

// ============================================================================
// JSON-RPC Foundation
// ============================================================================

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String identifier.
    String(String),
    /// Numeric identifier.
    Number(i64),
    /// Null.
    Null,
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "{}", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
            JsonRpcId::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request with a random UUID ID.
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(JsonRpcId::String(uuid::Uuid::new_v4().to_string())),
            method: method.into(),
            params: Some(params),
        }
    }
}

/// A JSON-RPC 2.0 response. Exactly one of `result` or `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier this response corresponds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a successful JSON-RPC response.
    pub fn success(id: Option<JsonRpcId>, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error JSON-RPC response.
    pub fn error(id: Option<JsonRpcId>, error: JsonRpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_state_serializes_as_proto_enum() {
        assert_eq!(
            serde_json::to_string(&TaskState::InputRequired).unwrap(),
            r#""TASK_STATE_INPUT_REQUIRED""#
        );
        assert_eq!(
            serde_json::to_string(&TaskState::Cancelled).unwrap(),
            r#""TASK_STATE_CANCELLED""#
        );
    }

    #[test]
    fn task_state_accepts_every_spelling() {
        for (raw, expected) in [
            (json!("TASK_STATE_WORKING"), TaskState::Working),
            (json!("working"), TaskState::Working),
            (json!("input-required"), TaskState::InputRequired),
            (json!("TASK_STATE_CANCELED"), TaskState::Cancelled),
            (json!("canceled"), TaskState::Cancelled),
            (json!("auth_required"), TaskState::AuthRequired),
            (json!(3), TaskState::Completed),
        ] {
            let state: TaskState = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(state, expected, "input {raw}");
        }
        assert!(serde_json::from_value::<TaskState>(json!("sleeping")).is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Cancelled.is_terminal());
        assert!(TaskState::Rejected.is_terminal());
        assert!(!TaskState::Working.is_terminal());
        assert!(!TaskState::InputRequired.is_terminal());
        assert!(!TaskState::Submitted.is_terminal());
    }

    #[test]
    fn proto_numbers_are_stable() {
        for state in [
            TaskState::Unspecified,
            TaskState::Submitted,
            TaskState::Working,
            TaskState::Completed,
            TaskState::Failed,
            TaskState::Cancelled,
            TaskState::InputRequired,
            TaskState::Rejected,
            TaskState::AuthRequired,
        ] {
            assert_eq!(TaskState::from_proto_number(state.proto_number()), state);
        }
        assert_eq!(TaskState::InputRequired.proto_number(), 6);
    }

    #[test]
    fn role_accepts_sdk_and_proto_forms() {
        assert_eq!(serde_json::from_value::<Role>(json!("user")).unwrap(), Role::User);
        assert_eq!(serde_json::from_value::<Role>(json!("ROLE_AGENT")).unwrap(), Role::Agent);
        assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("ROLE_USER"));
    }

    #[test]
    fn data_part_uses_nested_struct() {
        let part = Part::data(json!({"decision": "approve"}));
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"data": {"data": {"decision": "approve"}}})
        );
    }

    #[test]
    fn part_accepts_kind_form() {
        let part: Part =
            serde_json::from_value(json!({"kind": "data", "data": {"interaction_type": "approval"}}))
                .unwrap();
        assert_eq!(part.as_data(), Some(&json!({"interaction_type": "approval"})));

        let part: Part = serde_json::from_value(json!({"kind": "text", "text": "hi"})).unwrap();
        assert_eq!(part.as_text(), Some("hi"));
    }

    #[test]
    fn part_keeps_metadata() {
        let part: Part = serde_json::from_value(
            json!({"text": "hmm", "metadata": {"event_type": "thinking"}}),
        )
        .unwrap();
        assert_eq!(part.metadata(), Some(&json!({"event_type": "thinking"})));
    }

    #[test]
    fn message_accepts_parts_or_content() {
        let a: Message = serde_json::from_value(json!({
            "messageId": "m1", "role": "ROLE_AGENT", "content": [{"text": "a"}]
        }))
        .unwrap();
        let b: Message = serde_json::from_value(json!({
            "message_id": "m1", "role": "agent", "parts": [{"kind": "text", "text": "a"}]
        }))
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn task_status_message_lives_under_update() {
        let status = TaskStatus::new(TaskState::InputRequired)
            .with_message(Message::user_text("approve?"));
        let value = serde_json::to_value(&status).unwrap();
        assert!(value.get("update").is_some());
        assert!(value.get("message").is_none());

        let back: TaskStatus = serde_json::from_value(json!({
            "state": "input-required",
            "message": {"messageId": "x", "parts": []}
        }))
        .unwrap();
        assert_eq!(back.message.map(|m| m.message_id), Some("x".to_string()));
    }

    #[test]
    fn stream_response_wrapper_and_kind_forms_agree() {
        let wrapped: StreamResponse = serde_json::from_value(json!({
            "statusUpdate": {"taskId": "t", "contextId": "c", "status": {"state": "TASK_STATE_WORKING"}}
        }))
        .unwrap();
        let flat: StreamResponse = serde_json::from_value(json!({
            "kind": "status-update", "taskId": "t", "contextId": "c",
            "status": {"state": "working"}, "final": false
        }))
        .unwrap();
        assert_eq!(wrapped, flat);
    }

    #[test]
    fn stream_response_rejects_json_rpc_envelope() {
        let envelope = json!({"jsonrpc": "2.0", "id": 1, "result": {"msg": {}}});
        assert!(serde_json::from_value::<StreamResponse>(envelope).is_err());
    }

    #[test]
    fn send_response_detects_bare_task() {
        let resp: SendMessageResponse = serde_json::from_value(json!({
            "id": "t1", "contextId": "c1", "status": {"state": "completed"}
        }))
        .unwrap();
        assert_eq!(resp.task().map(|t| t.id.as_str()), Some("t1"));
    }

    #[test]
    fn agent_card_accepts_snake_case_transport() {
        let card: AgentCard = serde_json::from_value(json!({
            "name": "a", "url": "http://h/v1/agents/a", "preferred_transport": "rest",
            "capabilities": {"streaming": true}, "somethingElse": 1
        }))
        .unwrap();
        assert_eq!(card.preferred_transport, "rest");
        assert!(card.capabilities.streaming);
    }
}
