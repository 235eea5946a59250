//! Error types for the universal A2A client.
//!
//! The taxonomy follows the layers of the client:
//! - discovery failures (no candidate card URL answered)
//! - transport construction failures (bad address, TLS set-up)
//! - request failures (non-2xx HTTP, JSON-RPC error objects, gRPC status)
//! - approval protocol violations (iteration cap, polling timeout)
//!
//! Frame-level decode failures inside a stream never surface here; the
//! stream decoder drops them and keeps going.

use crate::types::JsonRpcError;

// ---------------------------------------------------------------------------
// Standard JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// A2A-specific error codes
// ---------------------------------------------------------------------------

/// The requested task was not found.
pub const TASK_NOT_FOUND: i64 = -32001;

/// The task cannot be canceled in its current state.
pub const TASK_NOT_CANCELABLE: i64 = -32002;

/// The requested operation is not supported.
pub const UNSUPPORTED_OPERATION: i64 = -32004;

// ---------------------------------------------------------------------------
// A2AError enum
// ---------------------------------------------------------------------------

/// Unified error type for every client operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    /// No discovery candidate returned a usable agent card. Wraps the error
    /// of the last attempt.
    #[error("agent discovery failed: {0}")]
    Discovery(Box<A2AError>),

    /// A transport adapter could not be constructed (malformed address,
    /// unreadable CA certificate, TLS set-up).
    #[error("failed to create transport: {0}")]
    TransportInit(String),

    /// Transport-level error (connection failed, request failed, etc.).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error with status code and response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid JSON received from remote (parse or deserialization failure).
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A JSON-RPC error object was returned by the remote agent.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// A gRPC call failed. The status is carried through unchanged.
    #[error("gRPC error ({code:?}): {message}")]
    Grpc {
        /// gRPC status code.
        code: tonic::Code,
        /// Status message.
        message: String,
    },

    /// The non-streaming approval loop ran out of rounds.
    #[error("maximum iterations ({max_iterations}) exceeded in approval flow")]
    ApprovalLoopExceeded {
        /// The configured round cap.
        max_iterations: usize,
    },

    /// Polling a resumed task did not reach a terminal or input-required
    /// state within the allowed budget.
    #[error("task did not complete within {seconds} seconds")]
    PollTimeout {
        /// Budget in seconds.
        seconds: u64,
    },

    /// The operation was cancelled through the client's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Catch-all for errors that don't fit other categories.
    #[error("{0}")]
    Other(String),
}

/// Convenience result type for A2A operations.
pub type A2AResult<T> = Result<T, A2AError>;

impl A2AError {
    /// Wrap an error as a discovery failure.
    pub fn discovery(source: A2AError) -> Self {
        Self::Discovery(Box::new(source))
    }

    /// Map a `reqwest` error onto the transport taxonomy, tagging it with
    /// what was being attempted.
    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            A2AError::Timeout(format!("{context} timed out: {err}"))
        } else if err.is_connect() {
            A2AError::Transport(format!("{context}: connection failed: {err}"))
        } else {
            A2AError::Transport(format!("{context} failed: {err}"))
        }
    }

    /// Returns `true` for the named approval-protocol conditions.
    pub fn is_approval_violation(&self) -> bool {
        matches!(
            self,
            A2AError::ApprovalLoopExceeded { .. } | A2AError::PollTimeout { .. }
        )
    }

    /// The HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            A2AError::Http { status, .. } => Some(*status),
            A2AError::Discovery(inner) => inner.http_status(),
            _ => None,
        }
    }
}

impl From<JsonRpcError> for A2AError {
    fn from(err: JsonRpcError) -> Self {
        A2AError::JsonRpc {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

impl From<tonic::Status> for A2AError {
    fn from(status: tonic::Status) -> Self {
        A2AError::Grpc {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::InvalidJson(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_json_rpc() {
        assert_eq!(PARSE_ERROR, -32700);
        assert_eq!(INVALID_REQUEST, -32600);
        assert_eq!(METHOD_NOT_FOUND, -32601);
        assert_eq!(INVALID_PARAMS, -32602);
        assert_eq!(INTERNAL_ERROR, -32603);
        assert_eq!(TASK_NOT_FOUND, -32001);
        assert_eq!(TASK_NOT_CANCELABLE, -32002);
        assert_eq!(UNSUPPORTED_OPERATION, -32004);
    }

    #[test]
    fn json_rpc_error_object_converts() {
        let err: A2AError = JsonRpcError {
            code: TASK_NOT_FOUND,
            message: "no such task".to_string(),
            data: Some(serde_json::json!({"id": "t1"})),
        }
        .into();
        match err {
            A2AError::JsonRpc {
                code,
                message,
                data,
            } => {
                assert_eq!(code, -32001);
                assert_eq!(message, "no such task");
                assert_eq!(data, Some(serde_json::json!({"id": "t1"})));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn grpc_status_propagates_code_and_message() {
        let err: A2AError = tonic::Status::not_found("agent 'x' not registered").into();
        match err {
            A2AError::Grpc { code, message } => {
                assert_eq!(code, tonic::Code::NotFound);
                assert_eq!(message, "agent 'x' not registered");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn approval_violations_have_distinct_messages() {
        let cap = A2AError::ApprovalLoopExceeded { max_iterations: 10 };
        assert_eq!(
            cap.to_string(),
            "maximum iterations (10) exceeded in approval flow"
        );
        assert!(cap.is_approval_violation());

        let poll = A2AError::PollTimeout { seconds: 300 };
        assert_eq!(poll.to_string(), "task did not complete within 300 seconds");
        assert!(poll.is_approval_violation());

        assert!(!A2AError::Cancelled.is_approval_violation());
    }

    #[test]
    fn discovery_wraps_last_error() {
        let err = A2AError::discovery(A2AError::Http {
            status: 404,
            body: "not found".to_string(),
        });
        assert_eq!(err.http_status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));
    }
}
