use std::sync::Arc;
use tracing::info;

use history_core::config::{StorageBackend, StorageConfig};
use history_core::HistoryResult;
use history_domain::HistoryRepository;

use crate::{FileHistoryRepository, InMemoryHistoryRepository};

pub struct HistoryRepositoryFactory;

impl HistoryRepositoryFactory {
    pub async fn create(config: &StorageConfig) -> HistoryResult<Arc<dyn HistoryRepository>> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Initializing in-memory history repository");
                Ok(Arc::new(InMemoryHistoryRepository::new()))
            }
            StorageBackend::File => {
                info!(directory = %config.directory, "Initializing file history repository");
                let repo = FileHistoryRepository::new(&config.directory).await?;
                Ok(Arc::new(repo))
            }
        }
    }
}
