pub mod memory;
pub mod sled_store;

pub use memory::InMemoryRecordStore;
pub use sled_store::SledRecordStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{AppError, Result};
use crate::models::EnrichedRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for enriched-record storage. The core does not define a storage
/// format beyond the record schema; callers load a snapshot from here before
/// running clustering.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Save a record, keyed by its domain
    async fn save(&self, record: &EnrichedRecord) -> Result<()>;

    /// Load one record by domain
    async fn load(&self, domain: &str) -> Result<Option<EnrichedRecord>>;

    /// Load all records, ordered by domain
    async fn load_all(&self) -> Result<Vec<EnrichedRecord>>;

    /// Stored record count
    async fn count(&self) -> Result<usize>;
}

/// Create a record store from configuration
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        StoreBackend::Sled => {
            let path = config.path.clone().ok_or_else(|| {
                AppError::Configuration("sled backend requires store.path".to_string())
            })?;
            Ok(Arc::new(SledRecordStore::new(path)?))
        }
    }
}
