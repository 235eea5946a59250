//! The terminal boundary of the approval flow.
//!
//! The orchestrator never touches stdin/stdout directly; it asks a
//! [`Console`] whether a human is attached, writes through it, and reads one
//! line at a time from it.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// A human's answer to an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Let the agent go ahead.
    Approve,
    /// Refuse.
    Deny,
}

impl Decision {
    /// Wire value sent back to the agent.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Deny => "deny",
        }
    }

    /// Accepts `approve`/`a` and `deny`/`d`, ignoring case and surrounding
    /// whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "approve" | "a" => Some(Decision::Approve),
            "deny" | "d" => Some(Decision::Deny),
            _ => None,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal I/O used by the approval flow.
#[async_trait]
pub trait Console: Send + Sync {
    /// `true` when a human can answer prompts.
    fn is_interactive(&self) -> bool;

    /// Write text as-is (no newline added).
    fn write(&self, text: &str);

    /// Read one line of input. `None` on end-of-input or a read error.
    async fn read_line(&self) -> Option<String>;
}

/// [`Console`] on the process's stdin/stdout.
#[derive(Debug)]
pub struct StdConsole {
    stdin: Mutex<BufReader<Stdin>>,
}

impl StdConsole {
    /// Wrap the process's standard streams.
    pub fn new() -> Self {
        Self {
            stdin: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn write(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        // Nothing useful to do if stdout is gone.
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    async fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        let mut stdin = self.stdin.lock().await;
        match stdin.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                tracing::debug!("reading approval input failed: {e}");
                None
            }
        }
    }
}

/// Ask until the answer is recognized. End-of-input counts as a denial.
pub async fn prompt_for_approval(console: &dyn Console) -> Decision {
    loop {
        console.write("[APPROVAL] Approve or deny? (approve/deny/a/d): ");
        let Some(line) = console.read_line().await else {
            return Decision::Deny;
        };
        match Decision::parse(&line) {
            Some(decision) => return decision,
            None => console.write("Please enter 'approve' or 'deny' (or 'a'/'d')\n"),
        }
    }
}
