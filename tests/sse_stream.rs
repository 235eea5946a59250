//! Integration tests for SSE decoding and the bounded stream worker.

use std::time::Duration;

use a2a_universal::client::{decode_payload, EventStream, SseDecoder, STREAM_CHANNEL_CAPACITY};
use a2a_universal::types::*;
use futures::StreamExt;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn status_frame(task_id: &str, state: &str) -> String {
    let payload = json!({"statusUpdate": {"taskId": task_id, "contextId": "c", "status": {"state": state}}});
    format!("event: message\ndata: {payload}\n\n")
}

fn chunked(body: String, size: usize) -> Vec<Result<Vec<u8>, std::io::Error>> {
    body.into_bytes()
        .chunks(size)
        .map(|c| Ok(c.to_vec()))
        .collect()
}

#[tokio::test]
async fn single_message_then_eof() {
    let body = concat!(
        "event: message\n",
        "data: {\"msg\":{\"messageId\":\"m1\",\"role\":\"ROLE_AGENT\",\"parts\":[{\"text\":\"hi\"}]}}\n",
        "\n"
    );
    let mut stream = EventStream::from_sse(
        futures::stream::iter(vec![Ok::<_, std::io::Error>(body.as_bytes().to_vec())]),
        &CancellationToken::new(),
    );

    let first = stream.next().await.unwrap().unwrap();
    assert!(matches!(first, StreamResponse::Message(_)));
    assert!(stream.next().await.is_none());
    // Closed exactly once: further reads keep reporting the end.
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn frames_split_across_tiny_chunks_keep_their_order() {
    let body: String = (0..25)
        .map(|i| status_frame(&format!("t{i}"), "TASK_STATE_WORKING"))
        .collect();
    let stream = EventStream::from_sse(
        futures::stream::iter(chunked(body, 7)),
        &CancellationToken::new(),
    );

    let ids: Vec<String> = stream
        .into_stream()
        .map(|event| match event.unwrap() {
            StreamResponse::StatusUpdate(update) => update.task_id,
            other => panic!("unexpected {other:?}"),
        })
        .collect()
        .await;

    let expected: Vec<String> = (0..25).map(|i| format!("t{i}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn body_ending_mid_frame_drops_the_partial_block() {
    let mut body = status_frame("t1", "TASK_STATE_WORKING");
    body.push_str("data: {\"statusUpdate\":{\"taskId\":\"t2\"");
    let mut stream = EventStream::from_sse(
        futures::stream::iter(chunked(body, 16)),
        &CancellationToken::new(),
    );

    assert!(stream.next().await.unwrap().is_ok());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn read_error_ends_the_stream_quietly() {
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
        Ok(status_frame("t1", "TASK_STATE_WORKING").into_bytes()),
        Err(std::io::Error::other("connection reset")),
        Ok(status_frame("t2", "TASK_STATE_WORKING").into_bytes()),
    ];
    let mut stream = EventStream::from_sse(futures::stream::iter(chunks), &CancellationToken::new());

    assert!(stream.next().await.unwrap().is_ok());
    assert!(stream.next().await.is_none());
}

#[test]
fn large_payloads_have_no_line_limit() {
    let blob = "A".repeat(2 * 1024 * 1024);
    let payload = json!({"msg": {
        "messageId": "m1",
        "role": "ROLE_AGENT",
        "parts": [{"file": {"bytes": blob, "mimeType": "image/png"}}]
    }});
    let frame = format!("data: {payload}\n\n");

    let mut decoder = SseDecoder::new();
    let mut events = Vec::new();
    for chunk in frame.as_bytes().chunks(64 * 1024) {
        events.extend(decoder.feed(chunk));
    }
    assert_eq!(events.len(), 1);
    assert!(!decoder.has_pending());
}

#[test]
fn multibyte_text_split_between_chunks() {
    let frame = "data: {\"msg\":{\"messageId\":\"m\",\"role\":\"ROLE_AGENT\",\"parts\":[{\"text\":\"héllo ✓\"}]}}\n\n";
    let bytes = frame.as_bytes();
    let split = frame.find('é').unwrap() + 1;

    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(&bytes[..split]).is_empty());
    let events = decoder.feed(&bytes[split..]);
    match &events[..] {
        [StreamResponse::Message(m)] => assert_eq!(m.parts[0].as_text(), Some("héllo ✓")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn envelope_decodes_like_the_bare_payload() {
    let bare = json!({"task": {"id": "t1", "contextId": "c1", "status": {"state": "TASK_STATE_INPUT_REQUIRED"}}});
    let envelope = json!({"jsonrpc": "2.0", "id": 1, "result": bare});

    let direct = decode_payload(&bare.to_string()).unwrap();
    let wrapped = decode_payload(&envelope.to_string()).unwrap();
    assert_eq!(direct, wrapped);
}

#[test]
fn crlf_and_non_message_events() {
    let body = concat!(
        "event: ping\r\n",
        "data: {}\r\n",
        "\r\n",
        "event: message\r\n",
        "data: {\"kind\":\"status-update\",\"taskId\":\"t\",\"contextId\":\"c\",\"status\":{\"state\":\"working\"},\"final\":false}\r\n",
        "\r\n",
    );
    let events = SseDecoder::new().feed(body.as_bytes());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status().map(|s| s.state), Some(TaskState::Working));
}

#[tokio::test]
async fn cancellation_stops_a_blocked_worker() {
    let cancel = CancellationToken::new();
    // More frames than the channel holds and a body that never ends.
    let frames: Vec<Result<Vec<u8>, std::io::Error>> = (0..STREAM_CHANNEL_CAPACITY * 3)
        .map(|i| Ok(status_frame(&format!("t{i}"), "TASK_STATE_WORKING").into_bytes()))
        .collect();
    let body = futures::stream::iter(frames).chain(futures::stream::pending());
    let mut stream = EventStream::from_sse(body, &cancel);

    assert!(stream.next().await.unwrap().is_ok());
    cancel.cancel();

    // Buffered events may still drain, then the stream ends.
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        let mut n = 0;
        while stream.next().await.is_some() {
            n += 1;
        }
        n
    })
    .await
    .expect("stream should end after cancellation");
    assert!(drained <= STREAM_CHANNEL_CAPACITY + 1);
}

#[tokio::test]
async fn pre_decoded_events_are_forwarded() {
    let events = vec![
        Ok(StreamResponse::Message(Message::user_text("a"))),
        Err(a2a_universal::error::A2AError::Transport("gone".into())),
        Ok(StreamResponse::Message(Message::user_text("never"))),
    ];
    let mut stream = EventStream::from_events(futures::stream::iter(events), &CancellationToken::new());

    assert!(stream.next().await.unwrap().is_ok());
    assert!(stream.next().await.unwrap().is_err());
    assert!(stream.next().await.is_none());
}
