//! Business rule deciding whether a request is worth a follow-up.

use leadbot_types::record::{normalize_text, ClientRecord, Qualification};

/// Smallest budget, in currency units, that can qualify.
pub const MIN_BUDGET: f64 = 1000.0;

/// "corporativo", "Evento Corporativo", "corporate event" all count.
pub fn is_corporate(event_type: &str) -> bool {
    normalize_text(event_type).contains("corporat")
}

/// Corporate event, budget of at least [`MIN_BUDGET`] and complete contact data.
pub fn qualify(event_type: &str, budget: f64, contact_complete: bool) -> Qualification {
    if !is_corporate(event_type) || budget < MIN_BUDGET || !contact_complete {
        return Qualification::NotQualified;
    }
    Qualification::Qualified
}

pub fn qualify_record(record: &ClientRecord) -> Qualification {
    qualify(&record.event_type, record.budget, record.has_contact())
}
