//! Command-line and environment configuration.
//!
//! Every flag can also come from the environment (or a `.env` file loaded
//! before parsing); unset values fall back to the agent defaults.

use clap::Args;

use leadbot_types::config::{AgentConfig, LlmConfig, PersistenceConfig};
use leadbot_types::Result;

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// LLM provider (google, openai, deepseek, anthropic, custom)
    #[arg(long, env = "LLM_PROVIDER", default_value = "google", global = true)]
    pub provider: String,

    #[arg(long, env = "LLM_MODEL", default_value = "gemini-2.5-flash-lite", global = true)]
    pub model: String,

    /// Falls back to GOOGLE_API_KEY when unset
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "LLM_API_BASE", global = true)] // No default, the provider decides
    pub api_base: Option<String>,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.3, global = true)]
    pub temperature: f32,

    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = 1024, global = true)]
    pub max_tokens: u32,

    /// Timeout for each remote call, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub request_timeout: u64,

    /// Extra attempts after a transient network failure
    #[arg(long, env = "MAX_RETRIES", default_value_t = 1, global = true)]
    pub max_retries: u32,

    /// Persistence backend (auto, sheets, memory)
    #[arg(long, env = "PERSISTENCE_BACKEND", default_value = "auto", global = true)]
    pub persistence: String,

    /// Service-account key file
    #[arg(long, env = "GOOGLE_CREDENTIALS_PATH", default_value = "credenciales.json", global = true)]
    pub credentials: String,

    #[arg(long, env = "SPREADSHEET_NAME", default_value = "Irrelevant", global = true)]
    pub spreadsheet: String,

    /// Skips the Drive lookup by name
    #[arg(long, env = "SPREADSHEET_ID", global = true)]
    pub spreadsheet_id: Option<String>,

    #[arg(long, env = "SHEET_NAME", default_value = "Ejercicio 1", global = true)]
    pub sheet: String,

    #[arg(long, env = "AGENT_NAME", default_value = "Frank", global = true)]
    pub agent_name: String,

    /// Generation steps allowed per user message
    #[arg(long, env = "MAX_ITERATIONS", default_value_t = 8, global = true)]
    pub max_iterations: usize,

    /// Recompute the qualification label before saving
    #[arg(long, env = "VERIFY_QUALIFICATION", global = true)]
    pub verify_qualification: bool,
}

impl ConfigArgs {
    pub fn into_agent_config(self) -> Result<AgentConfig> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .unwrap_or_default();

        let defaults = AgentConfig::default();
        Ok(AgentConfig {
            llm: LlmConfig {
                provider: self.provider.parse()?,
                model: self.model,
                api_key,
                api_base: self.api_base.filter(|b| !b.trim().is_empty()),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                request_timeout_secs: self.request_timeout,
                max_retries: self.max_retries,
            },
            persistence: PersistenceConfig {
                backend: self.persistence.parse()?,
                credentials_path: self.credentials,
                spreadsheet_name: self.spreadsheet,
                spreadsheet_id: self.spreadsheet_id.filter(|id| !id.trim().is_empty()),
                sheet_name: self.sheet,
                request_timeout_secs: self.request_timeout,
                max_retries: self.max_retries,
            },
            agent_name: self.agent_name,
            max_iterations: self.max_iterations.max(1),
            verify_qualification: self.verify_qualification,
            ..defaults
        })
    }
}
