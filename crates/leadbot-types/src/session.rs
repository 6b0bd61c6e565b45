use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Everything one conversation has accumulated.
///
/// History is append-only and `finished` / `record_saved` only ever flip from
/// false to true; the type offers no way to undo either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    thread_id: String,
    history: Vec<Message>,
    finished: bool,
    record_saved: bool,
    created_at: String,
}

impl ConversationState {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            history: Vec::new(),
            finished: false,
            record_saved: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn last(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_record_saved(&self) -> bool {
        self.record_saved
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Append a message and hand back a reference to the stored copy.
    pub fn push(&mut self, message: Message) -> &Message {
        self.history.push(message);
        &self.history[self.history.len() - 1]
    }

    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn mark_record_saved(&mut self) {
        self.record_saved = true;
    }
}

/// Summary of a conversation for listing and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: String,
    pub message_count: usize,
    pub finished: bool,
}

impl From<&ConversationState> for SessionSummary {
    fn from(state: &ConversationState) -> Self {
        Self {
            id: state.thread_id.clone(),
            created_at: state.created_at.clone(),
            message_count: state.history.len(),
            finished: state.finished,
        }
    }
}
