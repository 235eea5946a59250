//! Utility functions for creating and classifying A2A Message objects.

use serde_json::{json, Value};

use crate::types::{Message, Part, Role};

/// Data-part field that marks a message as an approval request.
pub const INTERACTION_TYPE_KEY: &str = "interaction_type";

/// `interaction_type` values that request human approval.
pub const APPROVAL_INTERACTION_TYPES: [&str; 2] = ["approval", "tool_approval"];

/// `true` when a data part carries an approval `interaction_type`.
pub fn is_approval_part(part: &Part) -> bool {
    part.as_data()
        .and_then(|data| data.get(INTERACTION_TYPE_KEY))
        .and_then(Value::as_str)
        .is_some_and(|it| APPROVAL_INTERACTION_TYPES.contains(&it))
}

/// `true` when any data part of the message asks for approval.
pub fn is_approval_request(message: &Message) -> bool {
    message.parts.iter().any(is_approval_part)
}

/// The approval payloads of a message, in part order.
pub fn approval_data(message: &Message) -> Vec<&Value> {
    message
        .parts
        .iter()
        .filter(|part| is_approval_part(part))
        .filter_map(Part::as_data)
        .collect()
}

/// The user's reply to an approval request: a text echo of the decision
/// plus a `{"decision": ...}` data part, bound to the task and context.
///
/// Empty IDs are allowed but logged, since the agent cannot route the reply
/// without them.
pub fn create_approval_response(context_id: &str, task_id: &str, decision: &str) -> Message {
    if context_id.is_empty() || task_id.is_empty() {
        tracing::warn!(
            context_id,
            task_id,
            "creating approval response with empty IDs"
        );
    }

    Message::new(
        Role::User,
        vec![Part::text(decision), Part::data(json!({ "decision": decision }))],
    )
    .with_context_id(context_id)
    .with_task_id(task_id)
}
