use crate::error::{AppError, Result};
use crate::models::EnrichedRecord;
use crate::store::RecordStore;
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

/// Persistent record store using the Sled embedded database.
///
/// Records carry arbitrary JSON field values, so they are serialized as JSON
/// rather than a non-self-describing binary format.
#[derive(Clone)]
pub struct SledRecordStore {
    db: Arc<Db>,
    records_tree: sled::Tree,
}

impl SledRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(&path)?;
        let records_tree = db.open_tree("records")?;

        tracing::info!(path = %path.as_ref().display(), "Initialized sled record store");

        Ok(Self {
            db: Arc::new(db),
            records_tree,
        })
    }

    fn serialize_record(record: &EnrichedRecord) -> Result<Vec<u8>> {
        serde_json::to_vec(record).map_err(AppError::from)
    }

    fn deserialize_record(bytes: &[u8]) -> Result<EnrichedRecord> {
        serde_json::from_slice(bytes).map_err(AppError::from)
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SledRecordStore {
    async fn save(&self, record: &EnrichedRecord) -> Result<()> {
        let bytes = Self::serialize_record(record)?;
        self.records_tree.insert(record.domain.as_bytes(), bytes)?;
        tracing::debug!(domain = %record.domain, "Record persisted");
        Ok(())
    }

    async fn load(&self, domain: &str) -> Result<Option<EnrichedRecord>> {
        match self.records_tree.get(domain.as_bytes())? {
            Some(bytes) => Ok(Some(Self::deserialize_record(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn load_all(&self) -> Result<Vec<EnrichedRecord>> {
        let mut records = Vec::with_capacity(self.records_tree.len());
        // Sled iterates keys in order, so output is already domain-sorted
        for item in self.records_tree.iter() {
            let (_, bytes) = item?;
            records.push(Self::deserialize_record(&bytes)?);
        }
        Ok(records)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records_tree.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledRecordStore::new(dir.path()).unwrap();

        let mut record = EnrichedRecord::new("example.com");
        record.fields.insert("host_name".to_string(), json!("HostCo"));
        record.risk_score = 35;
        store.save(&record).await.unwrap();

        let loaded = store.load("example.com").await.unwrap().unwrap();
        assert_eq!(loaded.domain, "example.com");
        assert_eq!(loaded.risk_score, 35);
        assert_eq!(loaded.fields.get("host_name"), Some(&json!("HostCo")));
    }

    #[tokio::test]
    async fn test_load_all_sorted_by_domain() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledRecordStore::new(dir.path()).unwrap();

        store.save(&EnrichedRecord::new("b.com")).await.unwrap();
        store.save(&EnrichedRecord::new("a.com")).await.unwrap();

        let all = store.load_all().await.unwrap();
        let domains: Vec<&str> = all.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains, vec!["a.com", "b.com"]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledRecordStore::new(dir.path()).unwrap();

        assert!(store.load("missing.com").await.unwrap().is_none());
    }
}
