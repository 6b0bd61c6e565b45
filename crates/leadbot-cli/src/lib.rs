//! Composition root for the lead intake agent.
//!
//! Wires the platform adapters into a [`ConversationContext`], then hands
//! sessions to the scripted scenarios or the interactive loop.

pub mod config;
pub mod render;
pub mod scenarios;

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;

use leadbot_core::ConversationContext;
use leadbot_platform::llm::OpenAiCompatProvider;
use leadbot_platform::persistence::auto_detect_persistence;

use crate::config::ConfigArgs;
use crate::scenarios::Scenario;

#[derive(Debug, Parser)]
#[command(
    name = "leadbot",
    about = "Conversational lead intake agent",
    long_about = "Collects name, email, event type and budget, qualifies the lead, stores it in Google Sheets and closes the conversation.",
    after_help = "Examples:\n  leadbot qualified\n  leadbot interactive --persistence memory\n  leadbot"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    #[command(about = "Run the scripted corporate event conversation (qualified lead)")]
    Qualified,
    #[command(about = "Run the scripted birthday party conversation (unqualified lead)")]
    Unqualified,
    #[command(about = "Chat with the agent from the terminal until 'salir'")]
    Interactive,
}

impl Command {
    fn scenario(self) -> Scenario {
        match self {
            Command::Qualified => Scenario::Qualified,
            Command::Unqualified => Scenario::Unqualified,
            Command::Interactive => Scenario::Interactive,
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = cli.config.into_agent_config()?;

    info!("--- Agent Configuration ---");
    info!("LLM Provider: {}", config.llm.provider.label());
    info!("Model: {}", config.llm.model);
    info!("Persistence: {:?}", config.persistence.backend);
    info!("Spreadsheet: {} / {}", config.persistence.spreadsheet_name, config.persistence.sheet_name);
    info!("Max Iterations: {}", config.max_iterations);
    info!("Verify Qualification: {}", config.verify_qualification);
    info!("---------------------------");

    let llm = OpenAiCompatProvider::new(config.llm.clone())?;
    let persistence = auto_detect_persistence(&config.persistence).await?;
    let context = ConversationContext::new(config, Arc::new(llm), persistence);

    let mut input = scenarios::stdin_lines();
    let scenario = match cli.command {
        Some(command) => command.scenario(),
        None => match scenarios::choose_from_menu(&mut input).await? {
            Some(scenario) => scenario,
            None => {
                println!("¡Hasta luego!");
                return Ok(());
            }
        },
    };

    scenarios::run_scenario(scenario, context, &mut input).await?;
    Ok(())
}
