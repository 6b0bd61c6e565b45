//! The two actions the agent can take and the registry that runs them.
//!
//! Tools follow the OpenAI function-calling schema so they work across providers.

use std::sync::Arc;

use leadbot_types::{
    message::ToolCall,
    record::ClientRecord,
    tool::{ToolDefinition, ToolParameters, ToolResult},
};
use log::{info, warn};
use serde_json::{json, Map};

use crate::ports::PersistencePort;
use crate::qualification::qualify_record;

pub const SAVED_MESSAGE: &str =
    "Dile al usuario que la información ha sido guardada y un asesor se pondrá en contacto con él.";
pub const SAVE_ERROR_PREFIX: &str = "Error al guardar la información: ";
pub const END_CALL_MESSAGE: &str = "Despidete del usuario! Nuestra tarea ya fue realizada";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Every tool the agent knows about. Names outside this set do not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    SaveInformation,
    EndCall,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::SaveInformation, Tool::EndCall];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::SaveInformation => "save_information",
            Tool::EndCall => "end_call",
        }
    }

    /// Exact, case-sensitive match.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn definition(&self) -> ToolDefinition {
        match self {
            Tool::SaveInformation => save_information_tool(),
            Tool::EndCall => end_call_tool(),
        }
    }
}

/// Registry of available tools
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    persistence: Arc<dyn PersistencePort>,
    verify_qualification: bool,
}

impl ToolRegistry {
    pub fn new(persistence: Arc<dyn PersistencePort>) -> Self {
        Self {
            definitions: Tool::ALL.iter().map(Tool::definition).collect(),
            persistence,
            verify_qualification: false,
        }
    }

    /// Recompute the qualification label before persisting instead of trusting the caller.
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_qualification = enabled;
        self
    }

    pub fn resolve(&self, name: &str) -> Option<Tool> {
        Tool::from_name(name)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }

    pub fn persistence_backend(&self) -> &str {
        self.persistence.backend_name()
    }

    /// Run a resolved tool. Failures come back as text, never as `Err`.
    pub async fn execute(&self, tool: Tool, call: &ToolCall) -> ToolResult {
        match tool {
            Tool::SaveInformation => self.save_information(call).await,
            Tool::EndCall => ToolResult::ok(&call.id, END_CALL_MESSAGE),
        }
    }

    async fn save_information(&self, call: &ToolCall) -> ToolResult {
        let mut record = match ClientRecord::from_arguments(&call.arguments) {
            Ok(r) => r,
            Err(e) => {
                warn!("save_information called with unusable arguments: {}", e);
                return ToolResult::failed(&call.id, format!("{}{}", SAVE_ERROR_PREFIX, e));
            }
        };

        if self.verify_qualification {
            let computed = qualify_record(&record);
            if computed != record.qualified {
                warn!(
                    "Qualification label '{}' overridden with '{}' for {}",
                    record.qualified, computed, record.email
                );
                record.qualified = computed;
            }
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        match self.persistence.append_record(&timestamp, &record).await {
            Ok(()) => {
                info!(
                    "Client record saved to {} ({})",
                    self.persistence.backend_name(),
                    record.qualified
                );
                ToolResult::ok(&call.id, SAVED_MESSAGE)
            }
            Err(e) => {
                warn!("Persistence failed on {}: {}", self.persistence.backend_name(), e);
                ToolResult::failed(&call.id, format!("{}{}", SAVE_ERROR_PREFIX, e))
            }
        }
    }
}

fn save_information_tool() -> ToolDefinition {
    let mut props = Map::new();
    props.insert("name".to_string(), json!({
        "type": "string",
        "description": "Nombre del cliente"
    }));
    props.insert("email".to_string(), json!({
        "type": "string",
        "description": "Dirección de correo electrónico del cliente"
    }));
    props.insert("event_type".to_string(), json!({
        "type": "string",
        "description": "Tipo de evento solicitado (ej: fiesta privada, corporativo, etc.)"
    }));
    props.insert("budget".to_string(), json!({
        "type": "number",
        "description": "Presupuesto que el cliente tiene disponible para el evento, en USD"
    }));
    props.insert("qualified".to_string(), json!({
        "type": "string",
        "enum": ["calificado", "no calificado"],
        "description": "Estado de calificación según las reglas de negocio: \
            si no es corporativo → no calificado; \
            si el presupuesto es menor a USD 1.000 → no calificado; \
            si es corporativo, presupuesto ≥ 1.000 y contacto completo → calificado"
    }));

    ToolDefinition {
        name: Tool::SaveInformation.name().to_string(),
        description: "Guarda la información completa del cliente cuando todos los datos están disponibles"
            .to_string(),
        parameters: ToolParameters {
            schema_type: "object".to_string(),
            properties: props,
            required: vec![
                "name".to_string(),
                "email".to_string(),
                "event_type".to_string(),
                "budget".to_string(),
                "qualified".to_string(),
            ],
        },
    }
}

fn end_call_tool() -> ToolDefinition {
    ToolDefinition {
        name: Tool::EndCall.name().to_string(),
        description: "Finaliza la conversación cuando la tarea ha sido completada".to_string(),
        parameters: ToolParameters {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        },
    }
}
