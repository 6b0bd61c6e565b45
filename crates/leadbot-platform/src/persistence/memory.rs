//! In-memory persistence backend.
//! Used when no spreadsheet credentials are available; rows vanish on exit.

use std::sync::Mutex;

use async_trait::async_trait;
use leadbot_core::ports::PersistencePort;
use leadbot_types::{record::ClientRecord, Result};

#[derive(Default)]
pub struct MemoryPersistence {
    rows: Mutex<Vec<(String, ClientRecord)>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, with its timestamp.
    pub fn records(&self) -> Vec<(String, ClientRecord)> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PersistencePort for MemoryPersistence {
    async fn append_record(&self, timestamp: &str, record: &ClientRecord) -> Result<()> {
        let mut rows = self
            .rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rows.push((timestamp.to_string(), record.clone()));
        log::info!(
            "Stored record for {} in memory ({} total)",
            record.email,
            rows.len()
        );
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
