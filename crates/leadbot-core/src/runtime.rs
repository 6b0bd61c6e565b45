//! Turn controller — the conversation state machine.
//!
//! Each submission runs one cycle:
//! 1. `CheckingFinished`: a concluded conversation only gets a notice
//! 2. `Generating`: append the user text once, ask the backend for the next message
//! 3. `ExecutingTools`: run requested tools in order, append one result per call
//! 4. Loop back to 2 unless `end_call` ran, or stop at `Done`
//!
//! Every appended message is mirrored as a [`TurnEvent`] on the event bus.

use std::collections::HashSet;

use leadbot_types::{
    Result,
    event::TurnEvent,
    message::{Message, Role},
    session::ConversationState,
    tool::ToolResult,
};
use log::{debug, error, info, warn};

use crate::event_bus::EventBus;
use crate::ports::ChatRequest;
use crate::session::ConversationContext;
use crate::tools::Tool;

pub const CONCLUDED_NOTICE: &str =
    "No te preocupes, ya registré tus datos. La conversación ha finalizado.";
pub const ALREADY_SAVED_MESSAGE: &str = "La información ya fue guardada.";
const END_CALL_REPEATED: &str = "end_call ya fue solicitado en este turno.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    CheckingFinished,
    Generating,
    ExecutingTools,
    Done,
}

pub struct TurnController {
    context: ConversationContext,
    event_bus: EventBus,
}

impl TurnController {
    pub fn new(context: ConversationContext, event_bus: EventBus) -> Self {
        Self { context, event_bus }
    }

    /// Run one full cycle for `user_input`, from `CheckingFinished` to `Done`.
    ///
    /// Only a failing generation call returns `Err`; tool failures are
    /// recorded as tool results and the cycle carries on.
    pub async fn run_cycle(&self, state: &mut ConversationState, user_input: &str) -> Result<()> {
        let max_generations = self.context.config().max_iterations.max(1);
        let mut generations = 0usize;
        let mut user_appended = false;
        let mut turn = TurnState::CheckingFinished;

        loop {
            debug!("[{}] {:?}", state.thread_id(), turn);
            turn = match turn {
                TurnState::CheckingFinished => self.check_finished(state),
                TurnState::Generating => {
                    if !user_appended {
                        self.append(state, Message::user(user_input));
                        user_appended = true;
                    }
                    if generations >= max_generations {
                        warn!(
                            "[{}] stopped after {} generation steps without a reply",
                            state.thread_id(),
                            generations
                        );
                        self.event_bus.emit(TurnEvent::Error {
                            message: format!(
                                "Agent loop exceeded {} generation steps",
                                max_generations
                            ),
                        });
                        TurnState::Done
                    } else {
                        generations += 1;
                        self.generate(state).await?
                    }
                }
                TurnState::ExecutingTools => self.execute_tools(state).await,
                TurnState::Done => return Ok(()),
            };
        }
    }

    fn check_finished(&self, state: &mut ConversationState) -> TurnState {
        if state.is_finished() {
            self.append(state, Message::system_note(CONCLUDED_NOTICE));
            TurnState::Done
        } else {
            TurnState::Generating
        }
    }

    async fn generate(&self, state: &mut ConversationState) -> Result<TurnState> {
        let config = self.context.config();
        let mut messages = Vec::with_capacity(state.len() + 1);
        messages.push(Message::system(config.instructions()));
        messages.extend(state.history().iter().cloned());

        let req = ChatRequest {
            messages,
            tools: self.context.tools().definitions(),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        };

        let response = self.context.llm().chat_completion(req).await.map_err(|e| {
            error!("[{}] generation failed: {}", state.thread_id(), e);
            self.event_bus.emit(TurnEvent::Error {
                message: e.to_string(),
            });
            e
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                "[{}] tokens: prompt={} completion={}",
                state.thread_id(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let message = into_agent_message(response.message);
        let next = if message.has_tool_calls() {
            TurnState::ExecutingTools
        } else {
            TurnState::Done
        };
        self.append(state, message);
        Ok(next)
    }

    async fn execute_tools(&self, state: &mut ConversationState) -> TurnState {
        let calls = state
            .last()
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();
        let tools = self.context.tools();
        let mut end_requested = false;

        for call in &calls {
            let result = match tools.resolve(&call.name) {
                None => {
                    warn!("[{}] unknown tool requested: {}", state.thread_id(), call.name);
                    self.event_bus.emit(TurnEvent::Error {
                        message: format!("Unknown tool: {}", call.name),
                    });
                    ToolResult::failed(&call.id, format!("Unknown tool: {}", call.name))
                }
                Some(Tool::EndCall) if end_requested => {
                    ToolResult::failed(&call.id, END_CALL_REPEATED)
                }
                Some(Tool::SaveInformation) if state.is_record_saved() => {
                    ToolResult::ok(&call.id, ALREADY_SAVED_MESSAGE)
                }
                Some(tool) => {
                    let result = tools.execute(tool, call).await;
                    match tool {
                        Tool::EndCall => end_requested = true,
                        Tool::SaveInformation if result.success => state.mark_record_saved(),
                        Tool::SaveInformation => {}
                    }
                    result
                }
            };

            self.append(state, Message::tool_result(result.call_id, &call.name, result.output));
        }

        // end_call takes effect once the whole batch has run
        if end_requested {
            state.mark_finished();
            info!("[{}] conversation concluded", state.thread_id());
            TurnState::Done
        } else {
            TurnState::Generating
        }
    }

    fn append(&self, state: &mut ConversationState, message: Message) {
        let event = TurnEvent::from_message(state.push(message));
        self.event_bus.emit(event);
    }
}

/// Backends answer as the assistant; some omit or repeat call ids.
fn into_agent_message(mut message: Message) -> Message {
    message.role = Role::Assistant;
    message.tool_call_id = None;
    message.name = None;

    let mut seen = HashSet::new();
    for call in &mut message.tool_calls {
        if call.id.is_empty() || !seen.insert(call.id.clone()) {
            call.id = uuid::Uuid::new_v4().to_string();
            seen.insert(call.id.clone());
        }
    }
    message
}
