//! Human-in-the-loop approval handling.
//!
//! An agent pauses a task in `INPUT_REQUIRED` with a status message whose
//! data part carries `interaction_type: "approval"` (or `"tool_approval"`).
//! [`ApprovalOrchestrator`] spots these, asks the human through a
//! [`Console`], sends the decision back and follows the task until it
//! settles:
//!
//! ```no_run
//! use std::sync::Arc;
//! use a2a_universal::approval::{ApprovalOrchestrator, Outcome, StdConsole};
//! use a2a_universal::builders::ClientBuilder;
//! use a2a_universal::types::Message;
//!
//! # async fn run() -> a2a_universal::error::A2AResult<()> {
//! let client = ClientBuilder::new("http://localhost:50051")
//!     .with_agent_id("ops")
//!     .build()
//!     .await?;
//! let mut orchestrator = ApprovalOrchestrator::new(&client, Arc::new(StdConsole::new()));
//! match orchestrator
//!     .process_non_streaming_response(Message::user_text("clean the build dir"))
//!     .await?
//! {
//!     Outcome::AwaitingApproval { task_id, .. } => println!("resume {task_id} later"),
//!     other => println!("{other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

pub mod console;
pub mod orchestrator;
pub mod render;

pub use console::{prompt_for_approval, Console, Decision, StdConsole};
pub use orchestrator::{ApprovalOrchestrator, ApprovalResult, Outcome, StreamState};
pub use render::{render_task, MessageRenderer};

/// Rounds of the non-streaming approval loop before giving up.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Delay between two `GetTask` calls while a resumed task runs.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// `GetTask` calls before polling gives up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 300;

/// Overall polling budget, independent of the caller's own deadline.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Tunables for [`ApprovalOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalConfig {
    /// Cap on non-streaming approval rounds.
    pub max_iterations: usize,
    /// Sleep between polls.
    pub poll_interval: Duration,
    /// Cap on poll calls.
    pub max_poll_attempts: u32,
    /// Wall-clock cap on a whole polling run.
    pub poll_timeout: Duration,
    /// Print `thinking` parts.
    pub show_thinking: bool,
    /// Print `tool_call` / `tool_result` parts.
    pub show_tools: bool,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            show_thinking: false,
            show_tools: false,
        }
    }
}
