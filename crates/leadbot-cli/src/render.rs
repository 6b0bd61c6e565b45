//! Terminal rendering of turn events, one line each.

use serde_json::{Map, Value};

use leadbot_types::event::{ToolCallSummary, TurnEvent};

/// Format a single event the way the conversation is printed.
pub fn render_event(event: &TurnEvent, agent_name: &str) -> String {
    match event {
        TurnEvent::User { text } => format!("👤 Usuario: {}", text),
        TurnEvent::AgentReply { text } => format!("🤖 {}: {}", agent_name, text),
        TurnEvent::AgentToolCalls { calls } => calls
            .iter()
            .map(render_tool_call)
            .collect::<Vec<_>>()
            .join("\n"),
        TurnEvent::ToolResult { content, .. } => format!("📤 Return: \"{}\"", content),
        TurnEvent::SystemNote { text } => format!("🤖 Sistema: {}", text),
        TurnEvent::Error { message } => format!("❌ Error: {}", message),
    }
}

pub fn render_tool_call(call: &ToolCallSummary) -> String {
    format!("🔧 Tool: {}({})", call.name, format_arguments(&call.arguments))
}

/// `k="v"` for strings, bare JSON for everything else, in the order the model sent them.
pub fn format_arguments(arguments: &Map<String, Value>) -> String {
    arguments
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}=\"{}\"", key, s),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
