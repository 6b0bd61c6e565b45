//! The client record collected by the agent and the qualification label it carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AgentError, Result};

pub const QUALIFIED_LABEL: &str = "calificado";
pub const NOT_QUALIFIED_LABEL: &str = "no calificado";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    Qualified,
    NotQualified,
}

impl Qualification {
    /// Label written to the store.
    pub fn label(&self) -> &'static str {
        match self {
            Qualification::Qualified => QUALIFIED_LABEL,
            Qualification::NotQualified => NOT_QUALIFIED_LABEL,
        }
    }

    pub fn from_flag(qualified: bool) -> Self {
        if qualified {
            Qualification::Qualified
        } else {
            Qualification::NotQualified
        }
    }

    /// Accepts the Spanish labels used in the store as well as English and yes/no forms.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let label = normalize_text(raw).replace(['_', '-'], " ");
        match label.as_str() {
            "calificado" | "qualified" | "si" | "yes" | "true" | "1" => {
                Some(Qualification::Qualified)
            }
            "no calificado" | "not qualified" | "unqualified" | "no" | "false" | "0" => {
                Some(Qualification::NotQualified)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured payload handed to the persistence backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub name: String,
    pub email: String,
    pub event_type: String,
    /// Currency units
    pub budget: f64,
    pub qualified: Qualification,
}

impl ClientRecord {
    /// Build a record from `save_information` call arguments.
    ///
    /// Text fields default to empty when absent; only `budget` and `qualified`
    /// must be interpretable.
    pub fn from_arguments(args: &Map<String, Value>) -> Result<Self> {
        let text = |key: &str| match args.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let budget = match args.get("budget") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => parse_amount(s),
            _ => None,
        }
        .ok_or_else(|| invalid("budget", args.get("budget")))?;

        let qualified = match args.get("qualified") {
            Some(Value::Bool(b)) => Some(Qualification::from_flag(*b)),
            Some(Value::String(s)) => Qualification::parse_label(s),
            _ => None,
        }
        .ok_or_else(|| invalid("qualified", args.get("qualified")))?;

        Ok(Self {
            name: text("name"),
            email: text("email"),
            event_type: text("event_type"),
            budget,
            qualified,
        })
    }

    /// Both contact fields were provided.
    pub fn has_contact(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Row layout of the store: timestamp, name, email, event type, budget, label.
    pub fn to_row(&self, timestamp: &str) -> Vec<Value> {
        vec![
            Value::from(timestamp),
            Value::from(self.name.as_str()),
            Value::from(self.email.as_str()),
            Value::from(self.event_type.as_str()),
            budget_value(self.budget),
            Value::from(self.qualified.label()),
        ]
    }
}

fn invalid(field: &str, value: Option<&Value>) -> AgentError {
    match value {
        Some(v) => AgentError::Serialization(format!("invalid value for {}: {}", field, v)),
        None => AgentError::Serialization(format!("missing field {}", field)),
    }
}

/// Whole amounts go out as integers so the sheet does not show "1500.0".
fn budget_value(budget: f64) -> Value {
    if budget.fract() == 0.0 && budget.abs() < i64::MAX as f64 {
        Value::from(budget as i64)
    } else {
        Value::from(budget)
    }
}

/// Parse an amount typed by a person: "1500", "$1,500", "1.500 dólares",
/// "1.500,50", "2_000.50", "-500".
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let prefix = raw[..start].trim();
    let negative = prefix.starts_with('-') || prefix.ends_with('-');

    let digits: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '_'))
        .filter(|c| *c != '_')
        .collect();

    let normalized = match (digits.rfind('.'), digits.rfind(',')) {
        // Both present: whichever comes last is the decimal mark
        (Some(dot), Some(comma)) if dot > comma => digits.replace(',', ""),
        (Some(_), Some(_)) => digits.replace('.', "").replace(',', "."),
        _ if is_grouped(&digits, '.') => digits.replace('.', ""),
        _ if is_grouped(&digits, ',') => digits.replace(',', ""),
        _ => digits.replace(',', "."),
    };

    let amount = normalized.parse::<f64>().ok()?;
    Some(if negative { -amount } else { amount })
}

/// "1.500" or "12,000,000": every group after the first has exactly three digits.
fn is_grouped(s: &str, sep: char) -> bool {
    let mut parts = s.split(sep);
    let head = parts.next().unwrap_or_default();
    let tail: Vec<&str> = parts.collect();
    !tail.is_empty()
        && !head.is_empty()
        && head.len() <= 3
        && tail.iter().all(|p| p.len() == 3)
}

/// Lower-case and strip Spanish accents so labels compare loosely.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}
