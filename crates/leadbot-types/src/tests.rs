#[cfg(test)]
mod tests {
    use crate::AgentError;
    use crate::message::*;
    use crate::event::*;
    use crate::tool::*;
    use crate::record::*;
    use crate::config::*;
    use crate::session::*;
    use serde_json::{json, Map, Value};

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_system() {
        let msg = Message::system("You are an agent");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.content, "You are an agent");
        assert!(msg.tool_call_id.is_none());
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_message_tool_result_links_call() {
        let msg = Message::tool_result("call_123", "end_call", "bye");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.content, "bye");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_123"));
        assert_eq!(msg.name.as_deref(), Some("end_call"));
    }

    #[test]
    fn test_message_with_tool_calls_serialization() {
        let msg = Message::assistant_with_tools(
            "",
            vec![ToolCall::with_id("call_1", "end_call", Map::new())],
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("end_call"));
        assert!(json.contains("call_1"));

        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, msg);
    }

    #[test]
    fn test_tool_call_new_generates_unique_ids() {
        let a = ToolCall::new("end_call", Map::new());
        let b = ToolCall::new("end_call", Map::new());
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_tool_call_arguments_json() {
        let call = ToolCall::with_id("c", "save_information", args(json!({"budget": 1500})));
        let parsed: Value = serde_json::from_str(&call.arguments_json()).unwrap();
        assert_eq!(parsed["budget"], 1500);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), r#""assistant""#);
        assert_eq!(serde_json::to_string(&Role::SystemNote).unwrap(), r#""system_note""#);
    }

    // ─── TurnEvent Tests ─────────────────────────────────────

    #[test]
    fn test_event_from_user_message() {
        let event = TurnEvent::from_message(&Message::user("Hola"));
        assert_eq!(event, TurnEvent::User { text: "Hola".to_string() });
    }

    #[test]
    fn test_event_from_agent_reply() {
        let event = TurnEvent::from_message(&Message::assistant("Buen día"));
        assert_eq!(event, TurnEvent::AgentReply { text: "Buen día".to_string() });
    }

    #[test]
    fn test_event_from_agent_tool_calls_ignores_text() {
        let msg = Message::assistant_with_tools(
            "thinking",
            vec![ToolCall::with_id("c1", "end_call", Map::new())],
        );
        match TurnEvent::from_message(&msg) {
            TurnEvent::AgentToolCalls { calls } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "end_call");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_event_from_tool_and_note() {
        let tool = TurnEvent::from_message(&Message::tool_result("c1", "end_call", "bye"));
        assert_eq!(
            tool,
            TurnEvent::ToolResult { name: "end_call".to_string(), content: "bye".to_string() }
        );
        let note = TurnEvent::from_message(&Message::system_note("done"));
        assert_eq!(note, TurnEvent::SystemNote { text: "done".to_string() });
        assert!(!note.is_error());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let json = serde_json::to_value(TurnEvent::Error { message: "x".into() }).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["message"], "x");
    }

    // ─── ClientRecord Tests ──────────────────────────────────

    #[test]
    fn test_record_from_arguments() {
        let record = ClientRecord::from_arguments(&args(json!({
            "name": "Laura",
            "email": "laura@empresa.com",
            "event_type": "corporativo",
            "budget": 1500,
            "qualified": "calificado"
        })))
        .unwrap();
        assert_eq!(record.name, "Laura");
        assert_eq!(record.budget, 1500.0);
        assert_eq!(record.qualified, Qualification::Qualified);
        assert!(record.has_contact());
    }

    #[test]
    fn test_record_accepts_string_budget_and_bool_label() {
        let record = ClientRecord::from_arguments(&args(json!({
            "name": "Carlos",
            "email": "carlos@gmail.com",
            "event_type": "fiesta de cumpleaños",
            "budget": "$500",
            "qualified": false
        })))
        .unwrap();
        assert_eq!(record.budget, 500.0);
        assert_eq!(record.qualified, Qualification::NotQualified);
    }

    #[test]
    fn test_record_missing_contact_defaults_to_empty() {
        let record = ClientRecord::from_arguments(&args(json!({
            "event_type": "corporativo",
            "budget": 2000,
            "qualified": "no calificado"
        })))
        .unwrap();
        assert!(record.name.is_empty());
        assert!(!record.has_contact());
    }

    #[test]
    fn test_record_rejects_unreadable_budget() {
        let err = ClientRecord::from_arguments(&args(json!({
            "budget": "mucho",
            "qualified": "calificado"
        })))
        .unwrap_err();
        assert!(matches!(err, AgentError::Serialization(_)));
        assert!(err.to_string().contains("budget"));
    }

    #[test]
    fn test_record_rejects_unknown_label() {
        let result = ClientRecord::from_arguments(&args(json!({
            "budget": 1000,
            "qualified": "tal vez"
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_row_layout() {
        let record = ClientRecord {
            name: "Laura".into(),
            email: "laura@empresa.com".into(),
            event_type: "corporativo".into(),
            budget: 1500.0,
            qualified: Qualification::Qualified,
        };
        let row = record.to_row("2024-01-01 10:00:00");
        assert_eq!(
            row,
            vec![
                json!("2024-01-01 10:00:00"),
                json!("Laura"),
                json!("laura@empresa.com"),
                json!("corporativo"),
                json!(1500),
                json!("calificado"),
            ]
        );
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("1500"), Some(1500.0));
        assert_eq!(parse_amount("1.500 dólares"), Some(1500.0));
        assert_eq!(parse_amount("$1,500"), Some(1500.0));
        assert_eq!(parse_amount("1,500.50"), Some(1500.5));
        assert_eq!(parse_amount("2_000"), Some(2000.0));
        assert_eq!(parse_amount("99.5"), Some(99.5));
        assert_eq!(parse_amount("USD 750"), Some(750.0));
        assert_eq!(parse_amount("nada"), None);
    }

    #[test]
    fn test_parse_amount_comma_decimal_and_sign() {
        assert_eq!(parse_amount("1.500,50"), Some(1500.5));
        assert_eq!(parse_amount("$ 12.000.000,75"), Some(12_000_000.75));
        assert_eq!(parse_amount("-500"), Some(-500.0));
        assert_eq!(parse_amount("USD -1,500.25"), Some(-1500.25));
        assert_eq!(parse_amount("-$750"), Some(-750.0));
        assert_eq!(parse_amount("evento-corporativo 1500"), Some(1500.0));
    }

    #[test]
    fn test_record_budget_with_comma_decimal() {
        let mut args = Map::new();
        args.insert("name".to_string(), json!("Laura"));
        args.insert("email".to_string(), json!("laura@empresa.com"));
        args.insert("event_type".to_string(), json!("corporativo"));
        args.insert("budget".to_string(), json!("1.500,50"));
        args.insert("qualified".to_string(), json!("calificado"));
        let record = ClientRecord::from_arguments(&args).unwrap();
        assert_eq!(record.budget, 1500.5);
    }

    #[test]
    fn test_qualification_labels() {
        assert_eq!(Qualification::parse_label("Calificado"), Some(Qualification::Qualified));
        assert_eq!(Qualification::parse_label("NO CALIFICADO"), Some(Qualification::NotQualified));
        assert_eq!(Qualification::parse_label("not_qualified"), Some(Qualification::NotQualified));
        assert_eq!(Qualification::parse_label("sí"), Some(Qualification::Qualified));
        assert_eq!(Qualification::parse_label("quizás"), None);
        assert_eq!(Qualification::NotQualified.to_string(), "no calificado");
    }

    #[test]
    fn test_normalize_text_folds_accents() {
        assert_eq!(normalize_text("  Evento CORPORATIVO Público "), "evento corporativo publico");
    }

    // ─── Tool Tests ──────────────────────────────────────────

    #[test]
    fn test_tool_result_constructors() {
        assert!(ToolResult::ok("c", "done").success);
        assert!(!ToolResult::failed("c", "boom").success);
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition {
            name: "end_call".to_string(),
            description: "End".to_string(),
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: Map::new(),
                required: vec![],
            },
        };
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["parameters"]["type"], "object");
        assert!(json["parameters"].get("required").is_none());
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.agent_name, "Frank");
        assert_eq!(config.llm.provider, LlmProvider::Google);
        assert_eq!(config.llm.model, "gemini-2.5-flash-lite");
        assert_eq!(config.persistence.backend, PersistenceBackendType::Auto);
        assert_eq!(config.persistence.sheet_name, "Ejercicio 1");
        assert!(config.max_iterations > 0);
        assert!(!config.verify_qualification);
        assert!(config.system_prompt.contains("save_information"));
        assert!(config.system_prompt.contains("end_call"));
    }

    #[test]
    fn test_instructions_use_agent_name() {
        let config = AgentConfig::default();
        let prompt = config.instructions();
        assert!(prompt.contains("Agent Name: Frank"));
        assert!(prompt.contains("Le habla Frank"));
        assert!(!prompt.contains(AGENT_NAME_PLACEHOLDER));

        let renamed = AgentConfig {
            agent_name: "Lucía".to_string(),
            ..AgentConfig::default()
        };
        let prompt = renamed.instructions();
        assert!(prompt.contains("Agent Name: Lucía"));
        assert!(!prompt.contains("Frank"));
    }

    #[test]
    fn test_custom_prompt_without_placeholder_is_kept() {
        let config = AgentConfig {
            system_prompt: "Eres un asistente.".to_string(),
            agent_name: "Lucía".to_string(),
            ..AgentConfig::default()
        };
        assert_eq!(config.instructions(), "Eres un asistente.");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("openai".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("Gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Google);
        assert!("nope".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_provider_endpoints() {
        assert_eq!(LlmProvider::Google.chat_completions_path(), "/v1beta/openai/chat/completions");
        assert_eq!(LlmProvider::OpenAI.chat_completions_path(), "/v1/chat/completions");
        assert_eq!(LlmProvider::all().len(), 5);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Memory".parse::<PersistenceBackendType>().unwrap(), PersistenceBackendType::Memory);
        assert_eq!("sheets".parse::<PersistenceBackendType>().unwrap(), PersistenceBackendType::Sheets);
        assert!(matches!("disk".parse::<PersistenceBackendType>(), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AgentConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.persistence.spreadsheet_name, "Irrelevant");
    }

    // ─── ConversationState Tests ─────────────────────────────

    #[test]
    fn test_conversation_state_initial() {
        let state = ConversationState::new("thread-1");
        assert_eq!(state.thread_id(), "thread-1");
        assert!(state.is_empty());
        assert!(!state.is_finished());
        assert!(!state.is_record_saved());
    }

    #[test]
    fn test_conversation_state_push_and_flags() {
        let mut state = ConversationState::new("t");
        let stored = state.push(Message::user("Hola")).clone();
        assert_eq!(stored.content, "Hola");
        assert_eq!(state.len(), 1);
        state.mark_finished();
        state.mark_finished();
        assert!(state.is_finished());

        let summary = SessionSummary::from(&state);
        assert_eq!(summary.message_count, 1);
        assert!(summary.finished);
    }

    // ─── Error Tests ─────────────────────────────────────────

    #[test]
    fn test_error_display_and_transience() {
        assert_eq!(AgentError::Timeout(500).to_string(), "Timeout after 500ms");
        assert!(AgentError::Network("reset".into()).is_transient());
        assert!(!AgentError::Auth("denied".into()).is_transient());
    }

    #[test]
    fn test_error_from_serde() {
        let err: AgentError = serde_json::from_str::<Value>("{oops").unwrap_err().into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
