//! Terminal output contract and input handling.

use leadbot_cli::render::{format_arguments, render_event};
use leadbot_cli::scenarios::{
    is_exit_keyword, parse_menu_choice, Scenario, QUALIFIED_SCRIPT, UNQUALIFIED_SCRIPT,
};
use leadbot_types::event::{ToolCallSummary, TurnEvent};
use serde_json::{json, Map, Value};

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_user_and_agent_lines() {
    let user = TurnEvent::User { text: "Hola".to_string() };
    assert_eq!(render_event(&user, "Frank"), "👤 Usuario: Hola");

    let reply = TurnEvent::AgentReply { text: "Buen día".to_string() };
    assert_eq!(render_event(&reply, "Frank"), "🤖 Frank: Buen día");
    assert_eq!(render_event(&reply, "Ana"), "🤖 Ana: Buen día");
}

#[test]
fn test_tool_call_line() {
    let event = TurnEvent::AgentToolCalls {
        calls: vec![ToolCallSummary {
            name: "save_information".to_string(),
            arguments: args(json!({
                "name": "Laura",
                "email": "laura@empresa.com",
                "event_type": "corporativo",
                "budget": 1500,
                "qualified": "calificado"
            })),
        }],
    };
    let line = render_event(&event, "Frank");
    assert!(line.starts_with("🔧 Tool: save_information("));
    assert!(line.contains("name=\"Laura\""));
    assert!(line.contains("budget=1500"));
    assert!(line.contains("qualified=\"calificado\""));
    assert!(line.ends_with(')'));
}

#[test]
fn test_multiple_calls_one_line_each() {
    let event = TurnEvent::AgentToolCalls {
        calls: vec![
            ToolCallSummary {
                name: "save_information".to_string(),
                arguments: args(json!({ "name": "Laura" })),
            },
            ToolCallSummary {
                name: "end_call".to_string(),
                arguments: Map::new(),
            },
        ],
    };
    let rendered = render_event(&event, "Frank");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines, vec!["🔧 Tool: save_information(name=\"Laura\")", "🔧 Tool: end_call()"]);
}

#[test]
fn test_arguments_keep_model_order() {
    let raw = r#"{"name":"Laura","email":"laura@empresa.com","event_type":"corporativo","budget":1500,"qualified":"calificado"}"#;
    let arguments: Map<String, Value> = serde_json::from_str(raw).unwrap();
    assert_eq!(
        format_arguments(&arguments),
        "name=\"Laura\", email=\"laura@empresa.com\", event_type=\"corporativo\", budget=1500, qualified=\"calificado\""
    );
}

#[test]
fn test_format_arguments_non_strings() {
    let formatted = format_arguments(&args(json!({ "budget": 750.5, "vip": true })));
    assert!(formatted.contains("budget=750.5"));
    assert!(formatted.contains("vip=true"));
}

#[test]
fn test_result_note_and_error_lines() {
    let result = TurnEvent::ToolResult {
        name: "end_call".to_string(),
        content: "Despidete del usuario! Nuestra tarea ya fue realizada".to_string(),
    };
    assert_eq!(
        render_event(&result, "Frank"),
        "📤 Return: \"Despidete del usuario! Nuestra tarea ya fue realizada\""
    );

    let note = TurnEvent::SystemNote { text: "Fin".to_string() };
    assert_eq!(render_event(&note, "Frank"), "🤖 Sistema: Fin");

    let error = TurnEvent::Error { message: "Unknown tool: x".to_string() };
    assert_eq!(render_event(&error, "Frank"), "❌ Error: Unknown tool: x");
}

#[test]
fn test_exit_keywords() {
    assert!(is_exit_keyword("salir"));
    assert!(is_exit_keyword("  SALIR "));
    assert!(is_exit_keyword("Exit"));
    assert!(is_exit_keyword("quit"));
    assert!(!is_exit_keyword("salir ya"));
    assert!(!is_exit_keyword("hola"));
}

#[test]
fn test_menu_choices() {
    assert_eq!(parse_menu_choice("1"), Some(Scenario::Qualified));
    assert_eq!(parse_menu_choice(" 2 "), Some(Scenario::Unqualified));
    assert_eq!(parse_menu_choice("3"), Some(Scenario::Interactive));
    assert_eq!(parse_menu_choice("4"), None);
    assert_eq!(parse_menu_choice(""), None);
}

#[test]
fn test_scripts() {
    assert_eq!(QUALIFIED_SCRIPT.len(), 4);
    assert_eq!(QUALIFIED_SCRIPT.first(), QUALIFIED_SCRIPT.last());
    assert!(QUALIFIED_SCRIPT[1].contains("laura@empresa.com"));
    assert_eq!(UNQUALIFIED_SCRIPT.len(), 3);
    assert!(UNQUALIFIED_SCRIPT[1].contains("500 dólares"));
    assert_eq!(Scenario::Interactive.script(), None);
}
