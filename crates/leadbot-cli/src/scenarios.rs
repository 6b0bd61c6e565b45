//! Scripted conversations, the interactive loop and the start menu.

use std::io::Write;

use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use leadbot_core::{ConversationContext, Session};
use leadbot_types::Result;

use crate::render::render_event;

pub const QUALIFIED_SCRIPT: &[&str] = &[
    "Hola",
    "Evento corporativo con presupuesto de 1500 dólares. Me llamo Laura y mi correo es laura@empresa.com",
    "Dale gracias",
    // The conversation is already over at this point
    "Hola",
];

pub const UNQUALIFIED_SCRIPT: &[&str] = &[
    "Hola",
    "Necesito organizar una fiesta de cumpleaños, tengo 500 dólares de presupuesto. Soy Carlos y mi email es carlos@gmail.com",
    "Perfecto, gracias",
];

const EXIT_KEYWORDS: [&str; 3] = ["salir", "exit", "quit"];
const FAREWELL: &str = "¡Hasta luego!";
const RULE: &str = "==================================================";

pub type InputLines = Lines<BufReader<Stdin>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Qualified,
    Unqualified,
    Interactive,
}

impl Scenario {
    pub fn title(&self) -> &'static str {
        match self {
            Scenario::Qualified => "🚀 Ejecutando Caso 1: Cliente Calificado",
            Scenario::Unqualified => "🚀 Ejecutando Caso 2: Cliente No Calificado",
            Scenario::Interactive => "🚀 Modo Interactivo",
        }
    }

    pub fn script(&self) -> Option<&'static [&'static str]> {
        match self {
            Scenario::Qualified => Some(QUALIFIED_SCRIPT),
            Scenario::Unqualified => Some(UNQUALIFIED_SCRIPT),
            Scenario::Interactive => None,
        }
    }
}

/// Menu answer to scenario; anything but 1, 2 or 3 is rejected.
pub fn parse_menu_choice(raw: &str) -> Option<Scenario> {
    match raw.trim() {
        "1" => Some(Scenario::Qualified),
        "2" => Some(Scenario::Unqualified),
        "3" => Some(Scenario::Interactive),
        _ => None,
    }
}

/// Case-insensitive match against the words that end the interactive loop.
pub fn is_exit_keyword(raw: &str) -> bool {
    let word = raw.trim().to_lowercase();
    EXIT_KEYWORDS.contains(&word.as_str())
}

pub fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Session whose events are printed as soon as they are emitted.
pub fn printing_session(context: ConversationContext) -> Session {
    let agent_name = context.config().agent_name.clone();
    let session = Session::create(context, None);
    session
        .event_bus()
        .subscribe(move |event| println!("{}", render_event(event, &agent_name)));
    session
}

/// Returns `None` when input ends before a valid choice.
pub async fn choose_from_menu(input: &mut InputLines) -> Result<Option<Scenario>> {
    println!("🤖 Agente Conversacional Irrelevant");
    println!("{}", "=".repeat(40));
    println!("Selecciona una opción:");
    println!("1. Caso de uso calificado");
    println!("2. Caso de uso no calificado");
    println!("3. Modo interactivo");
    println!("{}", "=".repeat(40));

    loop {
        prompt("Ingresa tu opción (1, 2 o 3): ");
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        match parse_menu_choice(&line) {
            Some(scenario) => return Ok(Some(scenario)),
            None => println!("❌ Opción inválida. Por favor ingresa 1, 2 o 3."),
        }
    }
}

pub async fn run_scenario(
    scenario: Scenario,
    context: ConversationContext,
    input: &mut InputLines,
) -> Result<()> {
    println!("{}", scenario.title());
    println!("{}", RULE);

    match scenario.script() {
        Some(script) => run_script(context, script).await,
        None => run_interactive(context, input).await,
    }
}

/// Feed each scripted message through one session; a failed turn aborts.
pub async fn run_script(context: ConversationContext, script: &[&str]) -> Result<()> {
    let mut session = printing_session(context);
    for text in script {
        println!();
        session.submit(text).await?;
    }
    debug!("Script finished: {:?}", session.summary());
    Ok(())
}

pub async fn run_interactive(context: ConversationContext, input: &mut InputLines) -> Result<()> {
    println!("Escribe 'salir' para terminar");
    println!();

    let mut session = printing_session(context);
    loop {
        prompt("👤 Tú: ");
        let Some(line) = input.next_line().await? else {
            println!();
            break;
        };
        if is_exit_keyword(&line) {
            break;
        }

        println!();
        // The failure was already printed as an error event
        if let Err(e) = session.submit(&line).await {
            debug!("Turn failed: {}", e);
        }
        println!();
    }

    println!("{}", FAREWELL);
    Ok(())
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}
