//! Shared test utilities for integration tests.
//!
//! - [`MockAgent`]: an in-process axum server answering scripted responses
//!   and recording every request
//! - [`ScriptedTransport`]: a [`Transport`] fed from queues, for driving the
//!   client facade and the approval orchestrator without a network
//! - [`ScriptedConsole`]: a [`Console`] with canned input lines

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use a2a_universal::approval::Console;
use a2a_universal::client::{EventStream, Transport, TransportKind};
use a2a_universal::error::{A2AError, A2AResult};
use a2a_universal::types::*;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Install a test subscriber once; `RUST_LOG`-style filtering is not needed.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ============================================================================
// Mock agent server
// ============================================================================

/// One request seen by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Scripted HTTP agent. Responses queued for a route are served in order;
/// the last one repeats. Unknown routes answer 404.
#[derive(Clone, Default)]
pub struct MockAgent {
    state: Arc<MockState>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: &str, path: &str, canned: Canned) {
        self.state
            .routes
            .lock()
            .unwrap()
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(canned);
    }

    /// Answer `method path` with a JSON body.
    pub fn on_json(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.push(
            method,
            path,
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                content_type: "application/json",
                body: body.to_string(),
            },
        );
        self
    }

    /// Answer `method path` with a raw event-stream body.
    pub fn on_sse(&self, method: &str, path: &str, body: &str) -> &Self {
        self.push(
            method,
            path,
            Canned {
                status: StatusCode::OK,
                content_type: "text/event-stream",
                body: body.to_string(),
            },
        );
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests whose path equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Start serving on a random local port. Returns the base URL.
    pub async fn start(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .fallback(handle)
            .with_state(self.state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let canned = {
        let mut routes = state.routes.lock().unwrap();
        routes.get_mut(&format!("{method} {path}")).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    match canned {
        Some(c) => (c.status, [(header::CONTENT_TYPE, c.content_type)], c.body).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no route for {method} {path}")).into_response(),
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A card in the canonical JSON shape.
pub fn card_json(name: &str, transport: &str, url: &str) -> Value {
    json!({
        "name": name,
        "description": "test agent",
        "version": "1.0.0",
        "url": url,
        "preferred_transport": transport,
        "capabilities": {"streaming": true}
    })
}

/// A task in the given state, optionally carrying a status message.
pub fn task(id: &str, context_id: &str, state: TaskState, message: Option<Message>) -> Task {
    let mut status = TaskStatus::new(state);
    status.message = message;
    Task {
        id: id.to_string(),
        context_id: context_id.to_string(),
        status,
        ..Task::default()
    }
}

/// An agent message asking for approval.
pub fn approval_request(message_id: &str, prompt: &str) -> Message {
    let mut message = Message::new(
        Role::Agent,
        vec![
            Part::text(prompt),
            Part::data(json!({"interaction_type": "tool_approval", "tool": "shell"})),
        ],
    );
    message.message_id = message_id.to_string();
    message
}

/// An agent text message.
pub fn agent_text(text: &str) -> Message {
    Message::new(Role::Agent, vec![Part::text(text)])
}

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Default)]
struct Script {
    sends: Mutex<VecDeque<A2AResult<SendMessageResponse>>>,
    tasks: Mutex<VecDeque<A2AResult<Task>>>,
    streams: Mutex<VecDeque<Vec<StreamResponse>>>,
    sent: Mutex<Vec<SendMessageRequest>>,
    get_task_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

/// A [`Transport`] answering from queues. Clones share the script, so a test
/// can keep one handle and give another to the client.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next `send_message`.
    pub fn respond(&self, response: SendMessageResponse) -> &Self {
        self.script.sends.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure for the next `send_message`.
    pub fn fail_send(&self, error: A2AError) -> &Self {
        self.script.sends.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a `get_task` snapshot. The last one repeats.
    pub fn snapshot(&self, task: Task) -> &Self {
        self.script.tasks.lock().unwrap().push_back(Ok(task));
        self
    }

    /// Queue the events of the next `stream_message`.
    pub fn stream(&self, events: Vec<StreamResponse>) -> &Self {
        self.script.streams.lock().unwrap().push_back(events);
        self
    }

    /// Requests passed to `send_message`, oldest first.
    pub fn sent(&self) -> Vec<SendMessageRequest> {
        self.script.sent.lock().unwrap().clone()
    }

    pub fn get_task_calls(&self) -> usize {
        self.script.get_task_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.script.close_calls.load(Ordering::SeqCst)
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }

    async fn send_message(
        &self,
        _agent_id: &str,
        request: SendMessageRequest,
    ) -> A2AResult<SendMessageResponse> {
        self.script.sent.lock().unwrap().push(request);
        self.script
            .sends
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(A2AError::Other("no scripted send response".into())))
    }

    async fn stream_message(
        &self,
        _agent_id: &str,
        request: SendMessageRequest,
        cancel: CancellationToken,
    ) -> A2AResult<EventStream> {
        self.script.sent.lock().unwrap().push(request);
        let events = self
            .script
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(EventStream::from_events(
            futures::stream::iter(events.into_iter().map(Ok)),
            &cancel,
        ))
    }

    async fn list_agents(&self) -> A2AResult<Vec<AgentCard>> {
        Ok(vec![])
    }

    async fn get_agent_card(&self, agent_id: &str) -> A2AResult<AgentCard> {
        Ok(AgentCard {
            name: agent_id.to_string(),
            ..AgentCard::default()
        })
    }

    async fn get_task(&self, _agent_id: &str, task_id: &str) -> A2AResult<Task> {
        self.script.get_task_calls.fetch_add(1, Ordering::SeqCst);
        let mut tasks = self.script.tasks.lock().unwrap();
        let next = if tasks.len() > 1 {
            tasks.pop_front()
        } else {
            tasks.front().cloned()
        };
        next.unwrap_or_else(|| Err(A2AError::Other(format!("no scripted task {task_id}"))))
    }

    async fn list_tasks(&self, _request: &ListTasksRequest) -> A2AResult<ListTasksResponse> {
        Ok(ListTasksResponse::default())
    }

    async fn cancel_task(&self, _agent_id: &str, task_id: &str) -> A2AResult<Task> {
        Ok(task(task_id, "", TaskState::Cancelled, None))
    }

    async fn close(&self) -> A2AResult<()> {
        self.script.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Scripted console
// ============================================================================

/// A [`Console`] reading canned lines and capturing output.
pub struct ScriptedConsole {
    interactive: bool,
    input: Mutex<VecDeque<String>>,
    output: Mutex<String>,
}

impl ScriptedConsole {
    pub fn interactive(lines: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            interactive: true,
            input: Mutex::new(lines.iter().map(|l| format!("{l}\n")).collect()),
            output: Mutex::new(String::new()),
        })
    }

    pub fn detached() -> Arc<Self> {
        Arc::new(Self {
            interactive: false,
            input: Mutex::new(VecDeque::new()),
            output: Mutex::new(String::new()),
        })
    }

    pub fn output(&self) -> String {
        self.output.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> usize {
        self.output().matches("[APPROVAL]").count()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn write(&self, text: &str) {
        self.output.lock().unwrap().push_str(text);
    }

    async fn read_line(&self) -> Option<String> {
        self.input.lock().unwrap().pop_front()
    }
}
