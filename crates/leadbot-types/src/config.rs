use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AgentError;

/// Top-level agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub persistence: PersistenceConfig,
    /// Display name the agent introduces itself with
    pub agent_name: String,
    pub system_prompt: String,
    /// Generation steps allowed per submission before the cycle is cut short
    pub max_iterations: usize,
    /// Recompute the qualification label instead of trusting the one supplied
    pub verify_qualification: bool,
}

/// Replaced with `agent_name` when the prompt is rendered.
pub const AGENT_NAME_PLACEHOLDER: &str = "{agent_name}";

impl AgentConfig {
    /// System prompt with the configured agent name filled in.
    pub fn instructions(&self) -> String {
        self.system_prompt
            .replace(AGENT_NAME_PLACEHOLDER, &self.agent_name)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            persistence: PersistenceConfig::default(),
            agent_name: "Frank".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 8,
            verify_qualification: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Google,
            model: "gemini-2.5-flash-lite".to_string(),
            api_key: String::new(),
            api_base: None,
            max_tokens: 1024,
            temperature: 0.3,
            request_timeout_secs: 30,
            max_retries: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    DeepSeek,
    OpenAI,
    Anthropic,
    Google,
    Custom,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &str {
        match self {
            LlmProvider::DeepSeek => "https://api.deepseek.com",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
            LlmProvider::Google => "https://generativelanguage.googleapis.com",
            LlmProvider::Custom => "",
        }
    }

    /// Path of the OpenAI-compatible chat completions endpoint under the base URL.
    pub fn chat_completions_path(&self) -> &str {
        match self {
            LlmProvider::Google => "/v1beta/openai/chat/completions",
            _ => "/v1/chat/completions",
        }
    }

    pub fn all() -> &'static [LlmProvider] {
        &[
            LlmProvider::DeepSeek,
            LlmProvider::OpenAI,
            LlmProvider::Anthropic,
            LlmProvider::Google,
            LlmProvider::Custom,
        ]
    }

    pub fn label(&self) -> &str {
        match self {
            LlmProvider::DeepSeek => "DeepSeek",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::Google => "Google",
            LlmProvider::Custom => "Custom",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .or_else(|| match wanted.to_ascii_lowercase().as_str() {
                "gemini" | "google_genai" => Some(LlmProvider::Google),
                "claude" => Some(LlmProvider::Anthropic),
                _ => None,
            })
            .ok_or_else(|| AgentError::Config(format!("unknown LLM provider: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub backend: PersistenceBackendType,
    /// Service-account key file
    pub credentials_path: String,
    pub spreadsheet_name: String,
    /// Skips the lookup by name when set
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackendType::Auto,
            credentials_path: "credenciales.json".to_string(),
            spreadsheet_name: "Irrelevant".to_string(),
            spreadsheet_id: None,
            sheet_name: "Ejercicio 1".to_string(),
            request_timeout_secs: 30,
            max_retries: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceBackendType {
    /// Google Sheets when the credential file exists, memory otherwise
    Auto,
    Sheets,
    Memory,
}

impl FromStr for PersistenceBackendType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PersistenceBackendType::Auto),
            "sheets" | "google-sheets" | "gsheets" => Ok(PersistenceBackendType::Sheets),
            "memory" => Ok(PersistenceBackendType::Memory),
            other => Err(AgentError::Config(format!(
                "unknown persistence backend: {}",
                other
            ))),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"
## 1. Agent Identity and Objective:
- Agent Name: {agent_name}
- Company: Irrelevant
- Objective: Collect client information for event requests, qualify them according to business rules, and save data in Google Sheets.
- Country: Colombia

## 2. Response Format:
- Always respond in **Spanish**.
- Maintain a polite, clear, and professional tone.

## 3. Business Rules:
- The agent must collect:
1. Nombre (name)
2. Email
3. Tipo de evento (event_type)
4. Presupuesto (budget)
- Only when **all 4 pieces of information** are provided, call the tool `save_information`.
- Qualification label for `save_information`:
  - Not a corporate event -> "no calificado"
  - Budget below USD 1.000 -> "no calificado"
  - Corporate event, budget of at least USD 1.000 and complete contact data -> "calificado"
- The conversation must follow the flow strictly and sequentially.
- After you call `save_information`, you must use the tool `end_call` in the next step.

## 4. Process:
### Step 1: Greeting and Welcome
- Greet the user and ask for their data. Example:
"Buen día. Le habla {agent_name} en nombre de Irrelevant y estoy aquí para ayudarle. Por favor deme el tipo de evento, presupuesto estimado, nombre y email"
- When all data is present, use `save_information`. Then go to step 2.
### Step 2: End conversation
- Use the tool `end_call` immediately no matter what the user says; you must finish.
"#;
