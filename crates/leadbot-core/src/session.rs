//! Sessions bind a conversation identity to its state and to the
//! collaborators the controller needs.

use std::sync::Arc;

use leadbot_types::{
    Result,
    config::AgentConfig,
    event::TurnEvent,
    session::{ConversationState, SessionSummary},
};
use log::info;

use crate::event_bus::EventBus;
use crate::ports::{LlmPort, PersistencePort};
use crate::runtime::TurnController;
use crate::tools::ToolRegistry;

/// Collaborators injected into every session. Immutable, so one context can
/// serve any number of concurrent sessions.
#[derive(Clone)]
pub struct ConversationContext {
    llm: Arc<dyn LlmPort>,
    tools: Arc<ToolRegistry>,
    config: Arc<AgentConfig>,
}

impl ConversationContext {
    pub fn new(
        config: AgentConfig,
        llm: Arc<dyn LlmPort>,
        persistence: Arc<dyn PersistencePort>,
    ) -> Self {
        let tools = ToolRegistry::new(persistence).with_verification(config.verify_qualification);
        Self::with_tools(config, llm, tools)
    }

    pub fn with_tools(config: AgentConfig, llm: Arc<dyn LlmPort>, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools: Arc::new(tools),
            config: Arc::new(config),
        }
    }

    pub fn llm(&self) -> &dyn LlmPort {
        self.llm.as_ref()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// One conversation. State lives in memory for the lifetime of the value.
pub struct Session {
    state: ConversationState,
    controller: TurnController,
    event_bus: EventBus,
}

impl Session {
    /// Start a conversation; a fresh thread id is generated when none is given.
    pub fn create(context: ConversationContext, identity: Option<String>) -> Self {
        let id = identity.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        info!(
            "Session {} started (llm: {}, persistence: {})",
            id,
            context.llm().backend_name(),
            context.tools().persistence_backend()
        );
        let event_bus = EventBus::new();
        Self {
            state: ConversationState::new(id),
            controller: TurnController::new(context, event_bus.clone()),
            event_bus,
        }
    }

    /// Drive one controller cycle and return the events it produced, in order.
    pub async fn submit(&mut self, text: &str) -> Result<Vec<TurnEvent>> {
        let outcome = self.controller.run_cycle(&mut self.state, text).await;
        let events = self.event_bus.drain();
        outcome.map(|()| events)
    }

    pub fn id(&self) -> &str {
        self.state.thread_id()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Subscribe here to see events while a cycle is still running.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from(&self.state)
    }
}
