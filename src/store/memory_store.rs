use crate::domain::LocationRecord;
use crate::store::{LocationStore, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps readings for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<LocationRecord>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_records(records: Vec<LocationRecord>) -> Self {
        MemoryStore {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn append(&self, record: LocationRecord) -> Result<usize, StoreError> {
        let mut write_guard = self.records.write().await;
        write_guard.push(record);
        debug!("💾 Appended location, {} in memory", write_guard.len());
        Ok(write_guard.len())
    }

    async fn list(&self) -> Result<Vec<LocationRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
