//! Server-Sent Events (SSE) decoding and the bounded stream worker.
//!
//! [`SseDecoder`] turns raw body bytes into [`StreamResponse`] values. Blocks
//! are separated by a blank line; each block carries an optional `event:`
//! name and one or more `data:` lines. A payload is parsed directly as a
//! `StreamResponse` first, then as a JSON-RPC envelope whose `result` holds
//! one. Anything else is dropped; a bad frame never ends the stream.
//!
//! [`EventStream`] is the consumer side: one spawned worker per stream feeds a
//! channel of capacity [`STREAM_CHANNEL_CAPACITY`]. The worker races every
//! send against a cancellation token, and dropping the channel sender is the
//! only end-of-stream signal.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::A2AResult;
use crate::types::{JsonRpcResponse, StreamResponse};

/// Capacity of the channel between a stream worker and its consumer.
pub const STREAM_CHANNEL_CAPACITY: usize = 10;

/// Incremental SSE decoder.
///
/// Buffers bytes until a full line is available, so frames may be split
/// across chunks at any byte (including inside a UTF-8 sequence) and lines
/// have no length limit.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    // Bytes of `buf` already searched for a line break.
    scanned: usize,
    event: String,
    data: Vec<String>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of body bytes, returning every event completed by it, in
    /// order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamResponse> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buf[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            let line = String::from_utf8_lossy(&self.buf[start..end]).into_owned();
            start = end + 1;
            from = start;
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len();
        events
    }

    /// `true` when a partial line or an undispatched block is buffered.
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty() || !self.data.is_empty()
    }

    fn process_line(&mut self, line: &str) -> Option<StreamResponse> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }

        // Comments are keep-alives.
        if line.starts_with(':') {
            return None;
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.event = field_value(name).to_string();
        } else if let Some(data) = line.strip_prefix("data:") {
            self.data.push(field_value(data).to_string());
        }
        // id:, retry: and unknown fields are ignored.
        None
    }

    fn dispatch(&mut self) -> Option<StreamResponse> {
        let event = std::mem::take(&mut self.event);
        let data = std::mem::take(&mut self.data).join("\n");

        if data.is_empty() {
            return None;
        }
        if !event.is_empty() && event != "message" {
            tracing::debug!(event = %event, "ignoring SSE block with non-message event");
            return None;
        }
        decode_payload(&data)
    }
}

/// A field value loses exactly one leading space.
fn field_value(raw: &str) -> &str {
    raw.strip_prefix(' ').unwrap_or(raw)
}

/// Decode one SSE `data` payload: direct `StreamResponse`, then JSON-RPC
/// envelope `result`, else `None`.
pub fn decode_payload(data: &str) -> Option<StreamResponse> {
    let direct_err = match serde_json::from_str::<StreamResponse>(data) {
        Ok(event) => return Some(event),
        Err(e) => e,
    };

    match serde_json::from_str::<JsonRpcResponse>(data) {
        Ok(envelope) => {
            if let Some(error) = envelope.error {
                tracing::debug!(
                    code = error.code,
                    message = %error.message,
                    "dropping JSON-RPC error frame"
                );
                return None;
            }
            let result = envelope.result?;
            match serde_json::from_value(result) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!("dropping JSON-RPC frame with unrecognized result: {e}");
                    None
                }
            }
        }
        Err(_) => {
            tracing::debug!("dropping undecodable SSE frame: {direct_err}");
            None
        }
    }
}

/// A stream of A2A events produced by a streaming call.
///
/// Supports pull-based (`next()`) and push-based (`futures::Stream` via
/// [`into_stream()`](Self::into_stream)) consumption. `next()` returns `None`
/// once the worker has finished. Dropping the stream cancels the worker and
/// releases the underlying connection.
///
/// # Example
///
/// ```no_run
/// # async fn example(mut stream: a2a_universal::client::EventStream) {
/// while let Some(event) = stream.next().await {
///     match event {
///         Ok(response) => println!("Got event: {:?}", response),
///         Err(e) => eprintln!("Stream error: {}", e),
///     }
/// }
/// # }
/// ```
pub struct EventStream {
    receiver: mpsc::Receiver<A2AResult<StreamResponse>>,
    cancel: CancellationToken,
    _task: tokio::task::JoinHandle<()>,
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl EventStream {
    /// Spawn a worker decoding an SSE body.
    ///
    /// The worker stops when the body ends, when reading it fails (no error
    /// is surfaced; the stream simply ends), or when `cancel` fires. A block
    /// left incomplete at end-of-body is dropped.
    pub fn from_sse<S, B, E>(body: S, cancel: &CancellationToken) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let token = cancel.child_token();
        let worker_token = token.clone();

        let task = tokio::spawn(async move {
            let mut body = Box::pin(body);
            let mut decoder = SseDecoder::new();

            loop {
                let chunk = tokio::select! {
                    _ = worker_token.cancelled() => {
                        tracing::debug!("SSE stream cancelled");
                        return;
                    }
                    chunk = body.next() => chunk,
                };

                match chunk {
                    None => break,
                    Some(Err(e)) => {
                        tracing::debug!("SSE body read failed, closing stream: {e}");
                        break;
                    }
                    Some(Ok(bytes)) => {
                        for event in decoder.feed(bytes.as_ref()) {
                            if !forward(&tx, Ok(event), &worker_token).await {
                                return;
                            }
                        }
                    }
                }
            }

            if decoder.has_pending() {
                tracing::debug!("SSE body ended mid-frame; dropping partial block");
            }
        });

        Self {
            receiver: rx,
            cancel: token,
            _task: task,
        }
    }

    /// Spawn a worker forwarding already-decoded events.
    ///
    /// The first `Err` item is forwarded and ends the stream.
    pub fn from_events<S>(events: S, cancel: &CancellationToken) -> Self
    where
        S: Stream<Item = A2AResult<StreamResponse>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let token = cancel.child_token();
        let worker_token = token.clone();

        let task = tokio::spawn(async move {
            let mut events = Box::pin(events);
            loop {
                let item = tokio::select! {
                    _ = worker_token.cancelled() => return,
                    item = events.next() => item,
                };
                let Some(item) = item else { break };
                let is_err = item.is_err();
                if !forward(&tx, item, &worker_token).await || is_err {
                    break;
                }
            }
        });

        Self {
            receiver: rx,
            cancel: token,
            _task: task,
        }
    }

    /// Get the next event. `None` means the stream has ended.
    pub async fn next(&mut self) -> Option<A2AResult<StreamResponse>> {
        self.receiver.recv().await
    }

    /// Stop the worker. Events already buffered can still be drained.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Convert this stream into a `futures::Stream`.
    pub fn into_stream(self) -> EventStreamAdapter {
        EventStreamAdapter { inner: self }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Adapter that implements `futures::Stream` for an [`EventStream`].
///
/// Created by [`EventStream::into_stream()`].
#[derive(Debug)]
pub struct EventStreamAdapter {
    inner: EventStream,
}

impl Stream for EventStreamAdapter {
    type Item = A2AResult<StreamResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.receiver.poll_recv(cx)
    }
}

/// Blocking send that gives up when the stream is cancelled or the consumer
/// is gone.
async fn forward<T>(tx: &mpsc::Sender<T>, item: T, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskState;

    fn feed_str(decoder: &mut SseDecoder, s: &str) -> Vec<StreamResponse> {
        decoder.feed(s.as_bytes())
    }

    #[test]
    fn comment_and_unknown_fields_are_ignored() {
        let mut decoder = SseDecoder::new();
        assert!(feed_str(&mut decoder, ": keepalive\nid: 1\nretry: 5000\n\n").is_empty());
    }

    #[test]
    fn blank_block_emits_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(feed_str(&mut decoder, "data:\n\n").is_empty());
    }

    #[test]
    fn direct_payload() {
        let mut decoder = SseDecoder::new();
        let events = feed_str(
            &mut decoder,
            "event: message\ndata: {\"msg\":{\"messageId\":\"m1\",\"content\":[{\"text\":\"hi\"}]}}\n\n",
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamResponse::Message(m) if m.message_id == "m1"));
    }

    #[test]
    fn missing_event_name_means_message() {
        let mut decoder = SseDecoder::new();
        let events = feed_str(
            &mut decoder,
            "data: {\"task\":{\"id\":\"t1\",\"status\":{\"state\":\"TASK_STATE_WORKING\"}}}\n\n",
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status().map(|s| s.state), Some(TaskState::Working));
    }

    #[test]
    fn other_event_names_are_skipped() {
        let mut decoder = SseDecoder::new();
        let events = feed_str(&mut decoder, "event: ping\ndata: {\"task\":{\"id\":\"t\"}}\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn crlf_lines() {
        let mut decoder = SseDecoder::new();
        let events = feed_str(&mut decoder, "data: {\"task\":{\"id\":\"t\"}}\r\n\r\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(feed_str(&mut decoder, "data: {\"task\":{\"i").is_empty());
        assert!(decoder.has_pending());
        assert!(feed_str(&mut decoder, "d\":\"t\"}}\n").is_empty());
        let events = feed_str(&mut decoder, "\n");
        assert_eq!(events.len(), 1);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn only_one_leading_space_is_stripped() {
        let mut decoder = SseDecoder::new();
        feed_str(&mut decoder, "event:message\ndata:  indented\ndata:tight\n");
        assert_eq!(decoder.event, "message");
        assert_eq!(decoder.data, vec![" indented", "tight"]);
    }

    #[test]
    fn partial_line_is_not_rescanned() {
        let mut decoder = SseDecoder::new();
        let payload = "data: {\"task\":{\"id\":\"long\"}}";
        for (i, chunk) in payload.as_bytes().chunks(4).enumerate() {
            assert!(decoder.feed(chunk).is_empty());
            assert_eq!(decoder.scanned, decoder.buf.len(), "after chunk {i}");
        }
        let events = feed_str(&mut decoder, "\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(decoder.scanned, 0);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn envelope_error_is_dropped() {
        assert!(decode_payload(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32603,"message":"boom"}}"#
        )
        .is_none());
    }

    #[test]
    fn garbage_is_dropped() {
        assert!(decode_payload("{not valid json}").is_none());
        assert!(decode_payload(r#"{"hello":"world"}"#).is_none());
    }

    #[tokio::test]
    async fn worker_closes_after_last_frame() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"task\":{\"id\":\"a\"}}\n\n".to_vec()),
            Ok(b"data: {\"task\":{\"id\":\"b\"}}\n\ndata: {\"task\"".to_vec()),
        ];
        let cancel = CancellationToken::new();
        let mut stream = EventStream::from_sse(futures::stream::iter(chunks), &cancel);

        let mut ids = Vec::new();
        while let Some(event) = stream.next().await {
            if let StreamResponse::Task(task) = event.unwrap() {
                ids.push(task.id);
            }
        }
        assert_eq!(ids, vec!["a", "b"]);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn dropping_stream_leaves_parent_token_alone() {
        let parent = CancellationToken::new();
        let stream = EventStream::from_sse(
            futures::stream::pending::<Result<Vec<u8>, std::io::Error>>(),
            &parent,
        );
        drop(stream);
        assert!(!parent.is_cancelled());
    }
}
