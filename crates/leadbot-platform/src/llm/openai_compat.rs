//! OpenAI-compatible generation adapter.
//!
//! Works with Gemini (through its OpenAI endpoint), OpenAI, DeepSeek, and any
//! provider using the OpenAI chat completions API format.

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use leadbot_core::ports::*;
use leadbot_types::{
    AgentError, Result,
    config::{LlmConfig, LlmProvider},
    message::{Message, Role, ToolCall},
};

use crate::retry::{http_client, is_retryable_status, transport_error, with_retry};

/// Provider that speaks the OpenAI chat completions protocol.
pub struct OpenAiCompatProvider {
    config: LlmConfig,
    endpoint: String,
    http: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let base_url = match (&config.api_base, config.provider) {
            (Some(base), _) if !base.trim().is_empty() => base.trim().to_string(),
            (_, LlmProvider::Custom) => {
                return Err(AgentError::Config(
                    "a custom LLM provider needs an API base URL".to_string(),
                ))
            }
            (_, provider) => provider.default_base_url().to_string(),
        };
        if config.api_key.is_empty() {
            warn!("No API key configured for {}", config.provider.label());
        }

        let endpoint = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            config.provider.chat_completions_path()
        );
        let http = http_client(config.request_timeout_secs.max(1))?;
        Ok(Self { config, endpoint, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, body: &Value) -> Result<ApiResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.request_timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = format!("HTTP {}: {}", status, text);
            return Err(if is_retryable_status(status) {
                AgentError::Network(message)
            } else {
                AgentError::Llm(message)
            });
        }

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))
    }
}

#[async_trait]
impl LlmPort for OpenAiCompatProvider {
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse> {
        let body = build_request_body(&req);
        debug!("POST {} ({} messages)", self.endpoint, req.messages.len());

        let data = with_retry("chat completion", self.config.max_retries, || {
            self.send_once(&body)
        })
        .await?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Llm("No choices in response".to_string()))?;

        let message = parse_api_message(choice.message);
        let usage = data.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse { message, usage })
    }

    fn backend_name(&self) -> &str {
        self.config.provider.label()
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct ApiResponse {
    pub(crate) choices: Vec<ApiChoice>,
    pub(crate) usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ApiChoice {
    pub(crate) message: ApiMessage,
}

#[derive(Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) tool_calls: Vec<ApiToolCall>,
}

#[derive(Deserialize)]
pub(crate) struct ApiToolCall {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) function: ApiFunction,
}

#[derive(Deserialize)]
pub(crate) struct ApiFunction {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) arguments: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ApiUsage {
    #[serde(default)]
    pub(crate) prompt_tokens: u32,
    #[serde(default)]
    pub(crate) completion_tokens: u32,
    #[serde(default)]
    pub(crate) total_tokens: u32,
}

// ─── Serialization helpers ───────────────────────────────────

pub(crate) fn build_request_body(req: &ChatRequest) -> Value {
    let messages: Vec<Value> = req.messages.iter().map(message_to_json).collect();

    let mut body = json!({
        "model": req.model,
        "messages": messages,
        "max_tokens": req.max_tokens,
        "temperature": req.temperature,
    });

    if !req.tools.is_empty() {
        let tools: Vec<Value> = req
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body["tools"] = json!(tools);
    }

    body
}

pub(crate) fn message_to_json(msg: &Message) -> Value {
    let role = match msg.role {
        Role::System | Role::SystemNote => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let mut obj = json!({
        "role": role,
        "content": msg.content,
    });

    if let Some(ref id) = msg.tool_call_id {
        obj["tool_call_id"] = json!(id);
    }

    if msg.has_tool_calls() {
        if msg.content.is_empty() {
            obj["content"] = Value::Null;
        }
        let calls: Vec<Value> = msg
            .tool_calls
            .iter()
            .map(|tc| {
                json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments_json(),
                    }
                })
            })
            .collect();
        obj["tool_calls"] = json!(calls);
    }

    obj
}

pub(crate) fn parse_api_message(api: ApiMessage) -> Message {
    let tool_calls: Vec<ToolCall> = api
        .tool_calls
        .into_iter()
        .map(|tc| {
            let arguments = parse_arguments(&tc.function.name, tc.function.arguments.as_deref());
            ToolCall::with_id(tc.id.unwrap_or_default(), tc.function.name, arguments)
        })
        .collect();

    Message::assistant_with_tools(api.content.unwrap_or_default(), tool_calls)
}

/// Arguments arrive as a JSON-encoded object; anything else is kept under `_raw`
/// so the tool reports a readable error instead of the call vanishing.
fn parse_arguments(tool: &str, raw: Option<&str>) -> Map<String, Value> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Arguments for {} are not an object: {}", tool, other);
            Map::from_iter([("_raw".to_string(), other)])
        }
        Err(e) => {
            warn!("Arguments for {} are not valid JSON: {}", tool, e);
            Map::from_iter([("_raw".to_string(), Value::String(raw.to_string()))])
        }
    }
}
