//! Pick the persistence backend from configuration.
//!
//! Auto priority: Google Sheets (credential file present) → Memory (fallback)

use std::sync::Arc;

use leadbot_core::ports::PersistencePort;
use leadbot_types::{
    config::{PersistenceBackendType, PersistenceConfig},
    Result,
};

use super::{MemoryPersistence, SheetsPersistence};

/// Returns a trait object so callers are backend-agnostic.
pub async fn auto_detect_persistence(config: &PersistenceConfig) -> Result<Arc<dyn PersistencePort>> {
    match config.backend {
        PersistenceBackendType::Memory => {
            log::info!("Persistence backend: memory");
            Ok(Arc::new(MemoryPersistence::new()))
        }
        PersistenceBackendType::Sheets => {
            log::info!("Persistence backend: Google Sheets");
            Ok(Arc::new(SheetsPersistence::new(config.clone())?))
        }
        PersistenceBackendType::Auto => {
            let found = tokio::fs::try_exists(&config.credentials_path)
                .await
                .unwrap_or(false);
            if found {
                log::info!(
                    "Persistence backend: Google Sheets ({})",
                    config.credentials_path
                );
                Ok(Arc::new(SheetsPersistence::new(config.clone())?))
            } else {
                log::warn!(
                    "{} not found, falling back to memory; records will not survive exit",
                    config.credentials_path
                );
                Ok(Arc::new(MemoryPersistence::new()))
            }
        }
    }
}
