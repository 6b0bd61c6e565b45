//! Port traits — the hexagonal architecture boundary.
//!
//! The core only depends on these traits.
//! Implementations live in `leadbot-platform` (HTTP and spreadsheet adapters).

use async_trait::async_trait;
use leadbot_types::{
    Result,
    message::Message,
    record::ClientRecord,
    tool::ToolDefinition,
};

// ─── Generation Port ─────────────────────────────────────────

/// Request to send to the generation backend
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Leading system instructions followed by the full history
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Complete (non-streaming) response from the generation backend
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Produce the agent's next message, optionally carrying tool calls
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Persistence Port ────────────────────────────────────────

/// Append-only store for collected client records.
///
/// Implementations must accept concurrent appends from unrelated sessions;
/// each call writes exactly one row.
#[async_trait]
pub trait PersistencePort: Send + Sync {
    async fn append_record(&self, timestamp: &str, record: &ClientRecord) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
