//! Integration tests for the client facade over a scripted transport.

mod common;

use a2a_universal::client::{A2AClient, TransportKind};
use a2a_universal::error::A2AError;
use a2a_universal::types::*;
use common::{agent_text, task, ScriptedTransport};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn operations_delegate_with_the_agent_id() {
    let transport = ScriptedTransport::new();
    transport.respond(SendMessageResponse::Message(agent_text("pong")));
    transport.snapshot(task("t1", "c1", TaskState::Working, None));
    let client = A2AClient::with_transport(transport.boxed(), "ops");

    assert_eq!(client.agent_id(), "ops");
    assert_eq!(client.transport_kind(), TransportKind::Rest);
    assert!(client.agent_card().is_none());

    let response = client.send_text_in_context("ping", "c1").await.unwrap();
    assert!(matches!(response, SendMessageResponse::Message(_)));
    assert_eq!(transport.sent()[0].message.context_id.as_deref(), Some("c1"));

    assert_eq!(client.get_task("t1").await.unwrap().state(), TaskState::Working);
    assert_eq!(
        client.cancel_task("t1").await.unwrap().state(),
        TaskState::Cancelled
    );
    assert!(client
        .list_tasks(&ListTasksRequest::default())
        .await
        .unwrap()
        .tasks
        .is_empty());
}

#[tokio::test]
async fn uncached_card_is_fetched_through_the_transport() {
    let transport = ScriptedTransport::new();
    let client = A2AClient::with_transport(transport.boxed(), "ops");

    assert_eq!(client.get_agent_card("").await.unwrap().name, "ops");
    assert_eq!(client.get_agent_card("billing").await.unwrap().name, "billing");
}

#[tokio::test]
async fn close_is_idempotent_and_delegates() {
    let transport = ScriptedTransport::new();
    let client = A2AClient::with_transport(transport.boxed(), "ops");

    client.close().await.unwrap();
    client.close().await.unwrap();
    assert_eq!(transport.close_calls(), 2);
}

#[tokio::test]
async fn cancelled_token_fails_calls() {
    let transport = ScriptedTransport::new();
    transport.respond(SendMessageResponse::Message(agent_text("late")));
    let cancel = CancellationToken::new();
    let client =
        A2AClient::with_transport(transport.boxed(), "ops").with_cancellation(cancel.clone());

    cancel.cancel();
    let err = client.send_text("hi").await.unwrap_err();
    assert!(matches!(err, A2AError::Cancelled));
    assert!(client.cancellation_token().is_cancelled());
}

#[tokio::test]
async fn stream_text_yields_scripted_events() {
    let transport = ScriptedTransport::new();
    transport.stream(vec![
        StreamResponse::Task(task("t1", "c1", TaskState::Submitted, None)),
        StreamResponse::Message(agent_text("working on it")),
        StreamResponse::Task(task("t1", "c1", TaskState::Completed, None)),
    ]);
    let client = A2AClient::with_transport(transport.boxed(), "ops");

    let states: Vec<_> = client
        .stream_text("go")
        .await
        .unwrap()
        .into_stream()
        .map(|event| event.unwrap().status().map(|s| s.state))
        .collect()
        .await;

    assert_eq!(
        states,
        vec![Some(TaskState::Submitted), None, Some(TaskState::Completed)]
    );
    assert_eq!(transport.sent()[0].message.parts[0].as_text(), Some("go"));
}

#[test]
fn flat_sdk_payloads_decode() {
    let body = serde_json::json!({
        "kind": "task",
        "id": "t1",
        "contextId": "c1",
        "status": {
            "state": "input-required",
            "message": {
                "kind": "message",
                "messageId": "m1",
                "role": "agent",
                "parts": [
                    {"kind": "text", "text": "Run tests?"},
                    {"kind": "data", "data": {"interaction_type": "tool_approval"}}
                ]
            }
        },
        "history": [{"messageId": "m0", "role": "user", "parts": [{"kind": "text", "text": "hi"}]}]
    });

    let response: SendMessageResponse = serde_json::from_value(body).unwrap();
    let task = response.task().unwrap();
    assert_eq!(task.state(), TaskState::InputRequired);
    assert_eq!(task.history[0].role, Role::User);
    let prompt = task.status_message().unwrap();
    assert!(a2a_universal::utils::is_approval_request(prompt));

    // Re-encoded in the canonical shape.
    let encoded = serde_json::to_value(&response).unwrap();
    assert_eq!(encoded["task"]["status"]["state"], "TASK_STATE_INPUT_REQUIRED");
    assert_eq!(encoded["task"]["status"]["update"]["role"], "ROLE_AGENT");
    assert_eq!(
        encoded["task"]["status"]["update"]["content"][1]["data"]["data"]["interaction_type"],
        "tool_approval"
    );
}
