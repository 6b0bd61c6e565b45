use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::{Message, Role};

/// Events emitted by the turn controller, one per appended message plus errors.
/// Callers render these to show the conversation as it progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The user's raw text was accepted into the history
    User { text: String },

    /// The agent answered without requesting any tool
    AgentReply { text: String },

    /// The agent requested one or more tools
    AgentToolCalls { calls: Vec<ToolCallSummary> },

    /// A tool finished and its output was appended
    ToolResult { name: String, content: String },

    /// A notice appended by the controller
    SystemNote { text: String },

    /// Something went wrong that the caller should see
    Error { message: String },
}

/// Display form of a requested tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallSummary {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl TurnEvent {
    /// Project an appended message onto its caller-facing event.
    pub fn from_message(msg: &Message) -> Self {
        match msg.role {
            Role::User => TurnEvent::User {
                text: msg.content.clone(),
            },
            Role::Assistant if msg.has_tool_calls() => TurnEvent::AgentToolCalls {
                calls: msg
                    .tool_calls
                    .iter()
                    .map(|tc| ToolCallSummary {
                        name: tc.name.clone(),
                        arguments: tc.arguments.clone(),
                    })
                    .collect(),
            },
            Role::Assistant => TurnEvent::AgentReply {
                text: msg.content.clone(),
            },
            Role::Tool => TurnEvent::ToolResult {
                name: msg.name.clone().unwrap_or_default(),
                content: msg.content.clone(),
            },
            Role::System | Role::SystemNote => TurnEvent::SystemNote {
                text: msg.content.clone(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TurnEvent::Error { .. })
    }
}
