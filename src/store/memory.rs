use crate::error::Result;
use crate::models::EnrichedRecord;
use crate::store::RecordStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory record store (for single runs and testing)
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<DashMap<String, EnrichedRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn save(&self, record: &EnrichedRecord) -> Result<()> {
        self.records.insert(record.domain.clone(), record.clone());
        tracing::debug!(domain = %record.domain, "Record saved");
        Ok(())
    }

    async fn load(&self, domain: &str) -> Result<Option<EnrichedRecord>> {
        Ok(self.records.get(domain).map(|entry| entry.clone()))
    }

    async fn load_all(&self) -> Result<Vec<EnrichedRecord>> {
        let mut records: Vec<EnrichedRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(records)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryRecordStore::new();
        let record = EnrichedRecord::new("example.com");

        store.save(&record).await.unwrap();

        let loaded = store.load("example.com").await.unwrap().unwrap();
        assert_eq!(loaded.domain, "example.com");
        assert!(store.load("other.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_by_domain() {
        let store = InMemoryRecordStore::new();

        let mut record = EnrichedRecord::new("example.com");
        record.risk_score = 10;
        store.save(&record).await.unwrap();

        record.risk_score = 55;
        store.save(&record).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let loaded = store.load("example.com").await.unwrap().unwrap();
        assert_eq!(loaded.risk_score, 55);
    }

    #[tokio::test]
    async fn test_load_all_is_ordered() {
        let store = InMemoryRecordStore::new();
        store.save(&EnrichedRecord::new("b.com")).await.unwrap();
        store.save(&EnrichedRecord::new("a.com")).await.unwrap();

        let all = store.load_all().await.unwrap();
        let domains: Vec<&str> = all.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }
}
