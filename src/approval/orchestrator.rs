//! Drives a conversation through human approval rounds.

use std::collections::HashSet;
use std::sync::Arc;

use crate::approval::console::{prompt_for_approval, Console, Decision};
use crate::approval::render::{render_task, MessageRenderer};
use crate::approval::ApprovalConfig;
use crate::client::{A2AClient, EventStream};
use crate::error::{A2AError, A2AResult};
use crate::types::{
    Message, SendMessageResponse, StreamResponse, Task, TaskArtifactUpdateEvent, TaskState,
    TaskStatusUpdateEvent,
};
use crate::utils::{approval_data, create_approval_response, is_approval_request};

/// What [`ApprovalOrchestrator::check_and_handle_approval`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalResult {
    /// Not an approval request, or this approval was already answered.
    NotHandled,
    /// An approval request, but nobody is at the terminal to answer it.
    Deferred,
    /// The human decided and the decision was sent.
    Handled {
        /// The agent's answer to the decision message.
        response: SendMessageResponse,
        /// What the human chose.
        decision: Decision,
    },
}

/// Where a conversation ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The agent answered with a plain message.
    Message(Message),
    /// The task reached a state that needs no further driving.
    Task(Task),
    /// The task waits for an approval that can't be given here. Resume it
    /// later by sending a decision in the same context.
    AwaitingApproval {
        /// Task waiting for input.
        task_id: String,
        /// Its conversation.
        context_id: String,
    },
    /// The event stream closed.
    StreamEnded {
        /// Last task seen on the stream.
        task_id: String,
        /// Last context seen on the stream.
        context_id: String,
        /// Last state seen on the stream.
        state: TaskState,
    },
}

/// IDs and state tracked while consuming a stream. Empty values in an event
/// never overwrite known ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamState {
    /// Current task ID.
    pub task_id: String,
    /// Current context ID.
    pub context_id: String,
    /// Last reported state.
    pub state: TaskState,
}

impl StreamState {
    fn set_ids(&mut self, task_id: &str, context_id: &str) {
        if !task_id.is_empty() {
            self.task_id = task_id.to_string();
        }
        if !context_id.is_empty() {
            self.context_id = context_id.to_string();
        }
    }

    /// Take IDs and state from a status update.
    pub fn update_from_status_update(&mut self, update: &TaskStatusUpdateEvent) {
        self.set_ids(&update.task_id, &update.context_id);
        self.state = update.status.state;
    }

    /// Take IDs from a message chunk.
    pub fn update_from_message(&mut self, message: &Message) {
        self.set_ids(message.task_id_str(), message.context_id_str());
    }

    /// Take IDs and state from a task snapshot.
    pub fn update_from_task(&mut self, task: &Task) {
        self.set_ids(&task.id, &task.context_id);
        self.state = task.state();
    }

    /// Take IDs from an artifact update.
    pub fn update_from_artifact(&mut self, update: &TaskArtifactUpdateEvent) {
        self.set_ids(&update.task_id, &update.context_id);
    }
}

/// Either a message still to send, or a task already fetched.
enum Step {
    Send(Message),
    Inspect(Task),
}

/// Approval bookkeeping for one conversation.
///
/// Each approval is prompted at most once per task: the handled set is keyed
/// by task ID plus the approval's identity, so a retransmitted request is
/// ignored while a second, different request on the same task still prompts.
pub struct ApprovalOrchestrator<'a> {
    client: &'a A2AClient,
    console: Arc<dyn Console>,
    config: ApprovalConfig,
    handled: HashSet<String>,
    renderer: MessageRenderer,
}

impl std::fmt::Debug for ApprovalOrchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalOrchestrator")
            .field("agent_id", &self.client.agent_id())
            .field("config", &self.config)
            .field("handled", &self.handled.len())
            .finish()
    }
}

impl<'a> ApprovalOrchestrator<'a> {
    /// Orchestrator with the default configuration.
    pub fn new(client: &'a A2AClient, console: Arc<dyn Console>) -> Self {
        Self::with_config(client, console, ApprovalConfig::default())
    }

    /// Orchestrator with explicit tunables.
    pub fn with_config(
        client: &'a A2AClient,
        console: Arc<dyn Console>,
        config: ApprovalConfig,
    ) -> Self {
        let renderer = MessageRenderer::new(config.show_thinking, config.show_tools);
        Self {
            client,
            console,
            config,
            handled: HashSet::new(),
            renderer,
        }
    }

    /// The tunables in use.
    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    /// `true` once an approval on this task has been answered.
    pub fn is_handled(&self, task_id: &str) -> bool {
        let prefix = format!("{task_id}/");
        self.handled.iter().any(|key| key.starts_with(&prefix))
    }

    /// Prompt for and submit a decision if `message` is an approval request
    /// that has not been answered yet.
    pub async fn check_and_handle_approval(
        &mut self,
        message: &Message,
        task_id: &str,
        context_id: &str,
    ) -> A2AResult<ApprovalResult> {
        if !is_approval_request(message) {
            return Ok(ApprovalResult::NotHandled);
        }

        let key = handled_key(message, task_id);
        if !task_id.is_empty() && self.handled.contains(&key) {
            tracing::debug!(task_id, "approval already handled, skipping");
            return Ok(ApprovalResult::NotHandled);
        }
        if !self.console.is_interactive() {
            return Ok(ApprovalResult::Deferred);
        }
        if !task_id.is_empty() {
            self.handled.insert(key);
        }

        let rendered = self.renderer.render_message_line(message);
        self.console.write(&rendered);
        if !task_id.is_empty() || !context_id.is_empty() {
            self.console.write(&format!(
                "[INFO] Session: {context_id} | Task: {task_id}\n"
            ));
            self.console
                .write("[INFO] Resumption will happen automatically after approval\n");
        }

        let decision = prompt_for_approval(self.console.as_ref()).await;
        tracing::info!(
            decision = decision.as_str(),
            task_id,
            context_id,
            "user approval decision"
        );

        let reply = create_approval_response(context_id, task_id, decision.as_str());
        let response = self.client.send_message(reply).await?;
        Ok(ApprovalResult::Handled { response, decision })
    }

    /// Handle one streamed event: track IDs, render visible messages, and
    /// answer approvals carried by `INPUT_REQUIRED` statuses or message
    /// chunks. A handled approval does not end the stream.
    pub async fn process_stream_chunk(
        &mut self,
        chunk: &StreamResponse,
        state: &mut StreamState,
    ) -> A2AResult<ApprovalResult> {
        let result = self.handle_chunk(chunk, state).await;
        if state.state.is_terminal() {
            self.renderer.end_task();
        }
        result
    }

    async fn handle_chunk(
        &mut self,
        chunk: &StreamResponse,
        state: &mut StreamState,
    ) -> A2AResult<ApprovalResult> {
        match chunk {
            StreamResponse::StatusUpdate(update) => {
                state.update_from_status_update(update);
                let Some(message) = &update.status.message else {
                    return Ok(ApprovalResult::NotHandled);
                };
                if update.status.state == TaskState::InputRequired
                    && is_approval_request(message)
                {
                    let (task_id, context_id) = (state.task_id.clone(), state.context_id.clone());
                    return self
                        .check_and_handle_approval(message, &task_id, &context_id)
                        .await;
                }
                self.show(message);
                Ok(ApprovalResult::NotHandled)
            }
            StreamResponse::Message(message) => {
                state.update_from_message(message);
                if !is_approval_request(message) {
                    self.show(message);
                    return Ok(ApprovalResult::NotHandled);
                }
                let (task_id, context_id) = (state.task_id.clone(), state.context_id.clone());
                self.check_and_handle_approval(message, &task_id, &context_id)
                    .await
            }
            StreamResponse::Task(task) => {
                state.update_from_task(task);
                match task.status_message() {
                    Some(message) if task.state() == TaskState::InputRequired => {
                        let (task_id, context_id) =
                            (state.task_id.clone(), state.context_id.clone());
                        self.check_and_handle_approval(message, &task_id, &context_id)
                            .await
                    }
                    _ => Ok(ApprovalResult::NotHandled),
                }
            }
            StreamResponse::ArtifactUpdate(update) => {
                state.update_from_artifact(update);
                Ok(ApprovalResult::NotHandled)
            }
        }
    }

    /// Consume a stream to its end, answering approvals as they arrive.
    ///
    /// When an approval put the task back to `WORKING` and the stream then
    /// closed before a terminal state, the task is polled to completion,
    /// since resumed execution is not guaranteed to report on this stream.
    pub async fn run_stream(&mut self, mut stream: EventStream) -> A2AResult<Outcome> {
        let mut state = StreamState::default();
        let mut resumed = false;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            match self.process_stream_chunk(&chunk, &mut state).await? {
                ApprovalResult::NotHandled => {}
                ApprovalResult::Deferred => {
                    stream.cancel();
                    self.print_waiting(&state.task_id, &state.context_id);
                    return Ok(Outcome::AwaitingApproval {
                        task_id: state.task_id,
                        context_id: state.context_id,
                    });
                }
                ApprovalResult::Handled { response, .. } => match response {
                    SendMessageResponse::Task(task) => {
                        state.update_from_task(&task);
                        if task.state() == TaskState::Working {
                            tracing::info!(task_id = %task.id, "task resumed after approval");
                            resumed = true;
                        }
                    }
                    SendMessageResponse::Message(reply) => self.show(&reply),
                },
            }
        }

        if resumed && !state.state.is_terminal() && !state.task_id.is_empty() {
            tracing::info!(
                task_id = %state.task_id,
                "stream closed before the resumed task finished, polling"
            );
            let task = self.poll_task(&state.task_id).await?;
            self.console.write(&render_task(&task));
            return Ok(self.finish(Outcome::Task(task)));
        }

        Ok(Outcome::StreamEnded {
            task_id: state.task_id,
            context_id: state.context_id,
            state: state.state,
        })
    }

    /// Send `initial` and keep going through approval rounds until the task
    /// settles, the session can't answer, or the round cap is hit.
    pub async fn process_non_streaming_response(&mut self, initial: Message) -> A2AResult<Outcome> {
        let outcome = self.run_rounds(initial).await?;
        Ok(self.finish(outcome))
    }

    async fn run_rounds(&mut self, initial: Message) -> A2AResult<Outcome> {
        let mut step = Step::Send(initial);

        for round in 1..=self.config.max_iterations {
            let task = match step {
                Step::Send(message) => match self.client.send_message(message).await? {
                    SendMessageResponse::Message(reply) => {
                        self.show(&reply);
                        return Ok(Outcome::Message(reply));
                    }
                    SendMessageResponse::Task(task) => task,
                },
                Step::Inspect(task) => task,
            };
            tracing::debug!(round, task_id = %task.id, state = %task.state(), "approval round");

            if task.state() != TaskState::InputRequired {
                self.show_task(&task);
                return Ok(Outcome::Task(task));
            }
            let Some(prompt) = task.status_message().cloned() else {
                self.console.write(&render_task(&task));
                return Ok(Outcome::Task(task));
            };

            if !self.console.is_interactive() {
                self.print_waiting(&task.id, &task.context_id);
                self.console.write(&render_task(&task));
                return Ok(Outcome::AwaitingApproval {
                    task_id: task.id,
                    context_id: task.context_id,
                });
            }

            let response = match self
                .check_and_handle_approval(&prompt, &task.id, &task.context_id)
                .await?
            {
                ApprovalResult::Handled { response, .. } => response,
                ApprovalResult::NotHandled | ApprovalResult::Deferred => {
                    self.show(&prompt);
                    return Ok(Outcome::Task(task));
                }
            };

            let next = match response {
                SendMessageResponse::Message(reply) => {
                    self.show(&reply);
                    return Ok(Outcome::Message(reply));
                }
                SendMessageResponse::Task(next) => next,
            };
            match next.state() {
                TaskState::Working => {
                    tracing::info!(task_id = %next.id, "task resumed after approval, polling");
                    let polled = self.poll_task(&next.id).await?;
                    if polled.state() == TaskState::InputRequired {
                        step = Step::Inspect(polled);
                        continue;
                    }
                    self.console.write(&render_task(&polled));
                    return Ok(Outcome::Task(polled));
                }
                TaskState::InputRequired => {
                    step = Step::Send(
                        Message::user_text("")
                            .with_context_id(next.context_id.as_str())
                            .with_task_id(next.id.as_str()),
                    );
                }
                _ => {
                    self.show_task(&next);
                    return Ok(Outcome::Task(next));
                }
            }
        }

        Err(A2AError::ApprovalLoopExceeded {
            max_iterations: self.config.max_iterations,
        })
    }

    /// Poll a task until it is terminal or needs input again.
    ///
    /// Bounded by `max_poll_attempts` and, independently of any caller
    /// deadline, by `poll_timeout`.
    pub async fn poll_task(&self, task_id: &str) -> A2AResult<Task> {
        let budget = self.config.poll_timeout;
        match tokio::time::timeout(budget, self.poll_until_settled(task_id)).await {
            Ok(result) => result,
            Err(_) => Err(A2AError::PollTimeout {
                seconds: budget.as_secs(),
            }),
        }
    }

    async fn poll_until_settled(&self, task_id: &str) -> A2AResult<Task> {
        let attempts = self.config.max_poll_attempts;
        for attempt in 1..=attempts {
            let task = self.client.get_task(task_id).await?;
            let state = task.state();
            if state.is_terminal() || state == TaskState::InputRequired {
                tracing::debug!(task_id, attempt, %state, "polling finished");
                return Ok(task);
            }
            if attempt < attempts {
                tokio::select! {
                    _ = self.client.cancellation_token().cancelled() => return Err(A2AError::Cancelled),
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }
        }
        Err(A2AError::PollTimeout {
            seconds: self
                .config
                .poll_interval
                .saturating_mul(attempts)
                .as_secs(),
        })
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        if let Outcome::Task(task) = &outcome {
            if task.state().is_terminal() {
                self.renderer.end_task();
            }
        }
        outcome
    }

    fn show(&mut self, message: &Message) {
        let out = self.renderer.render_message_line(message);
        if !out.is_empty() {
            self.console.write(&out);
        }
    }

    fn show_task(&mut self, task: &Task) {
        match task.status_message() {
            Some(message) => self.show(message),
            None => self.console.write(&render_task(task)),
        }
    }

    fn print_waiting(&self, task_id: &str, context_id: &str) {
        self.console.write(&format!(
            "[INFO] Task created and waiting for approval\n\
             [INFO] Task ID: {task_id}\n\
             [INFO] Session: {context_id}\n\
             [INFO] To approve, send \"approve\" in session {context_id}\n"
        ));
    }
}

/// `{task_id}/{identity}`; the identity is the message ID, or the approval
/// payloads when the agent sent no ID.
///
/// Dedup is per approval message, not per task: a task that asks twice with
/// distinct messages is prompted twice. `is_handled` answers the per-task
/// question.
fn handled_key(message: &Message, task_id: &str) -> String {
    if !message.message_id.is_empty() {
        return format!("{task_id}/{}", message.message_id);
    }
    let payload = serde_json::to_string(&approval_data(message)).unwrap_or_default();
    format!("{task_id}/{payload}")
}
