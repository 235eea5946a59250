//! Plain-text rendering of agent messages and tasks.
//!
//! Parts are routed by their metadata `event_type`:
//!
//! | `event_type` | shown when | output |
//! |---|---|---|
//! | `thinking` | `show_thinking` | `THINKING: ` once per `block_id`, then the text |
//! | `tool_call` | `show_tools` | `TOOL: {name}`, once per `tool_call_id` |
//! | `tool_call` with `is_error`, or `tool_result` | `show_tools` | ` OK` or ` ✗` plus the error |
//! | `approval` / `tool_approval` | always | the text |
//!
//! Untagged text parts are printed as they come. Approval payloads are never
//! printed raw.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde_json::Value;

use crate::types::{Message, Part, Role, Task, TaskState};
use crate::utils::{
    data_str, get_text_parts, is_approval_part, is_approval_request, metadata_str,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Block {
    #[default]
    None,
    Text,
    Thinking,
    Tool,
    Approval,
}

/// Stateful renderer; thinking blocks and tool calls can span several
/// messages of one stream, so keep one renderer per conversation.
#[derive(Debug, Default)]
pub struct MessageRenderer {
    show_thinking: bool,
    show_tools: bool,
    thinking_block: Option<String>,
    thinking_prefix_printed: bool,
    seen_tool_calls: HashSet<String>,
    last: Block,
}

impl MessageRenderer {
    /// Create a renderer.
    pub fn new(show_thinking: bool, show_tools: bool) -> Self {
        Self {
            show_thinking,
            show_tools,
            ..Self::default()
        }
    }

    /// Forget block and tool-call tracking, e.g. between conversations.
    pub fn reset(&mut self) {
        *self = Self::new(self.show_thinking, self.show_tools);
    }

    /// Forget the tool calls of a finished task. Call IDs are only unique
    /// within a task.
    pub fn end_task(&mut self) {
        self.seen_tool_calls.clear();
    }

    /// Render one message. Returns an empty string when nothing is visible.
    pub fn render_message(&mut self, message: &Message) -> String {
        let mut out = String::new();
        let approval = is_approval_request(message);

        for part in &message.parts {
            if approval {
                if let Some(text) = part.as_text().filter(|t| !t.is_empty()) {
                    self.switch_to(Block::Approval, &mut out);
                    out.push_str(text);
                    continue;
                }
                if is_approval_part(part) {
                    self.last = Block::Approval;
                    continue;
                }
            }

            match metadata_str(part, "event_type") {
                Some("thinking") => self.thinking(part, &mut out),
                Some("approval" | "tool_approval") => {
                    self.switch_to(Block::Approval, &mut out);
                    if let Some(text) = part.as_text() {
                        out.push_str(text);
                    }
                }
                Some("tool_call") if has_metadata(part, "is_error") => {
                    self.close_thinking(&mut out);
                    self.tool_result(part, &mut out);
                }
                Some("tool_result") => {
                    self.close_thinking(&mut out);
                    self.tool_result(part, &mut out);
                }
                Some("tool_call") => {
                    self.close_thinking(&mut out);
                    self.tool_call(part, &mut out);
                }
                _ => {
                    if let Some(text) = part.as_text().filter(|t| !t.is_empty()) {
                        self.switch_to(Block::Text, &mut out);
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }

    /// Render a message followed by a newline, or nothing if it is invisible.
    pub fn render_message_line(&mut self, message: &Message) -> String {
        let mut out = self.render_message(message);
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn close_thinking(&mut self, out: &mut String) {
        if self.thinking_block.take().is_some() {
            out.push('\n');
            self.thinking_prefix_printed = false;
            self.last = Block::None;
        }
    }

    fn switch_to(&mut self, block: Block, out: &mut String) {
        self.close_thinking(out);
        if self.last != Block::None && self.last != block {
            out.push('\n');
        }
        self.last = block;
    }

    fn thinking(&mut self, part: &Part, out: &mut String) {
        if !self.show_thinking {
            return;
        }
        if self.last != Block::None && self.last != Block::Thinking {
            out.push('\n');
        }

        let block_id = metadata_str(part, "block_id")
            .filter(|id| !id.is_empty())
            .unwrap_or("unknown")
            .to_string();
        let text = part
            .as_text()
            .filter(|t| !t.is_empty())
            .or_else(|| data_str(part, "text"))
            .unwrap_or_default();

        if self.thinking_block.as_deref() != Some(block_id.as_str()) {
            if self.thinking_block.is_some() && !text.is_empty() {
                out.push('\n');
            }
            self.thinking_block = Some(block_id);
            self.thinking_prefix_printed = false;
        }
        // An empty part only marks the start of a block.
        if text.is_empty() {
            return;
        }
        if !self.thinking_prefix_printed {
            out.push_str("THINKING: ");
            self.thinking_prefix_printed = true;
        }
        out.push_str(text);
        self.last = Block::Thinking;
    }

    fn tool_call(&mut self, part: &Part, out: &mut String) {
        if !self.show_tools {
            return;
        }
        let call_id = metadata_str(part, "tool_call_id").or_else(|| data_str(part, "id"));
        if call_id.is_some_and(|id| self.seen_tool_calls.contains(id)) {
            return;
        }
        let Some(name) = metadata_str(part, "tool_name").or_else(|| data_str(part, "name")) else {
            return;
        };

        if self.last != Block::None && self.last != Block::Tool {
            out.push('\n');
        }
        if let Some(id) = call_id {
            self.seen_tool_calls.insert(id.to_string());
        }
        let _ = write!(out, "TOOL: {name}");
        self.last = Block::Tool;
    }

    fn tool_result(&mut self, part: &Part, out: &mut String) {
        if !self.show_tools {
            return;
        }
        let result_key = metadata_str(part, "tool_call_id")
            .or_else(|| data_str(part, "tool_call_id"))
            .map(|id| format!("{id}_result"));
        if let Some(key) = &result_key {
            if !self.seen_tool_calls.insert(key.clone()) {
                return;
            }
        }

        let is_error = part
            .metadata()
            .and_then(|m| m.get("is_error"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if is_error {
            out.push_str(" ✗\n");
            let message = data_str(part, "error")
                .filter(|e| !e.is_empty())
                .or_else(|| data_str(part, "content"))
                .or_else(|| part.as_text())
                .unwrap_or_default();
            if !message.is_empty() {
                let _ = writeln!(out, "   Error: {message}");
            }
        } else {
            out.push_str(" OK\n");
        }
        self.last = Block::Tool;
    }
}

fn has_metadata(part: &Part, key: &str) -> bool {
    part.metadata().is_some_and(|m| m.get(key).is_some())
}

/// Human-readable task summary: IDs, state, artifact count and history.
pub fn render_task(task: &Task) -> String {
    const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
    let mut out = String::new();

    let _ = writeln!(out, "\nTask Details");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Task ID:     {}", task.id);
    let _ = writeln!(out, "Context ID:  {}", task.context_id);

    let state = task.state();
    let name = state
        .as_proto_str()
        .trim_start_matches("TASK_STATE_")
        .to_string();
    let label = match state {
        TaskState::Completed => format!("[SUCCESS] {name}"),
        TaskState::Failed => format!("[FAILED] {name}"),
        TaskState::Cancelled => format!("[CANCELLED] {name}"),
        TaskState::Working => format!("[IN PROGRESS] {name}"),
        TaskState::Submitted => format!("[SUBMITTED] {name}"),
        _ => name,
    };
    let _ = writeln!(out, "Status:      {label}");
    if let Some(ts) = &task.status.timestamp {
        let _ = writeln!(out, "Updated:     {ts}");
    }

    if !task.artifacts.is_empty() {
        let _ = writeln!(out, "Artifacts:   {}", task.artifacts.len());
    }

    if !task.history.is_empty() {
        let _ = writeln!(out, "\nHistory ({} messages):", task.history.len());
        let _ = writeln!(out, "{RULE}");
        for (i, message) in task.history.iter().enumerate() {
            let role = match message.role {
                Role::User => "User",
                Role::Agent => "Agent",
                Role::Unspecified => "Unknown",
            };
            let _ = write!(out, "{}. [{role}] ", i + 1);
            for text in get_text_parts(&message.parts) {
                if text.chars().count() > 200 {
                    let head: String = text.chars().take(200).collect();
                    let _ = writeln!(out, "{head}...");
                } else if !text.is_empty() {
                    let _ = writeln!(out, "{text}");
                }
            }
        }
    }

    let _ = writeln!(out, "{RULE}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;
    use serde_json::json;

    fn agent(parts: Vec<Part>) -> Message {
        Message::new(Role::Agent, parts)
    }

    #[test]
    fn plain_text() {
        let mut r = MessageRenderer::new(false, false);
        assert_eq!(r.render_message(&agent(vec![Part::text("hello")])), "hello");
        assert_eq!(r.render_message_line(&agent(vec![])), "");
    }

    #[test]
    fn approval_payload_is_hidden() {
        let mut r = MessageRenderer::new(false, false);
        let msg = agent(vec![
            Part::text("Allow shell?"),
            Part::data(json!({"interaction_type": "tool_approval", "tool": "shell"})),
        ]);
        assert_eq!(r.render_message(&msg), "Allow shell?");
    }

    #[test]
    fn thinking_is_opt_in_and_prefixed_once_per_block() {
        let thinking = |text: &str, block: &str| {
            Part::text(text).with_metadata(json!({"event_type": "thinking", "block_id": block}))
        };
        let msg = agent(vec![thinking("", "b1"), thinking("step one ", "b1"), thinking("step two", "b1")]);

        let mut hidden = MessageRenderer::new(false, false);
        assert_eq!(hidden.render_message(&msg), "");

        let mut shown = MessageRenderer::new(true, false);
        assert_eq!(shown.render_message(&msg), "THINKING: step one step two");
        assert_eq!(
            shown.render_message(&agent(vec![Part::text("answer")])),
            "\nanswer"
        );
    }

    #[test]
    fn tool_calls_are_deduplicated() {
        let call = Part::data(json!({"name": "search", "id": "c1"}))
            .with_metadata(json!({"event_type": "tool_call"}));
        let ok = Part::data(json!({"tool_call_id": "c1"}))
            .with_metadata(json!({"event_type": "tool_call", "is_error": false}));
        let msg = agent(vec![call.clone(), ok.clone()]);

        let mut r = MessageRenderer::new(false, true);
        assert_eq!(r.render_message(&msg), "TOOL: search OK\n");
        assert_eq!(r.render_message(&agent(vec![call, ok])), "");

        let mut hidden = MessageRenderer::new(false, false);
        assert_eq!(hidden.render_message(&msg), "");
    }

    #[test]
    fn tool_calls_render_again_after_their_task_ends() {
        let call = Part::data(json!({"name": "search", "id": "c1"}))
            .with_metadata(json!({"event_type": "tool_call"}));
        let mut r = MessageRenderer::new(false, true);
        assert_eq!(r.render_message(&agent(vec![call.clone()])), "TOOL: search");
        assert_eq!(r.render_message(&agent(vec![call.clone()])), "");

        r.end_task();
        assert!(r.seen_tool_calls.is_empty());
        assert_eq!(r.render_message(&agent(vec![call])), "TOOL: search");
    }

    #[test]
    fn tool_errors_show_the_message() {
        let failed = Part::data(json!({"tool_call_id": "c2", "error": "permission denied"}))
            .with_metadata(json!({"event_type": "tool_result", "is_error": true}));
        let mut r = MessageRenderer::new(false, true);
        assert_eq!(
            r.render_message(&agent(vec![failed])),
            " ✗\n   Error: permission denied\n"
        );
    }

    #[test]
    fn task_summary() {
        let task = Task {
            id: "t1".to_string(),
            context_id: "c1".to_string(),
            status: TaskStatus::new(TaskState::Completed),
            history: vec![Message::user_text("hi")],
            ..Task::default()
        };
        let out = render_task(&task);
        assert!(out.contains("Task ID:     t1"));
        assert!(out.contains("Context ID:  c1"));
        assert!(out.contains("Status:      [SUCCESS] COMPLETED"));
        assert!(out.contains("1. [User] hi"));
    }
}
