//! In-memory record store for development and tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{CompanyRecord, StoreError};
use crate::traits::{split_key_path, RecordStore};

/// Used when no MongoDB URI is configured.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<String, CompanyRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, key_path: &str) -> Option<CompanyRecord> {
        self.records.read().await.get(key_path).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn write_record(&self, key_path: &str, record: &CompanyRecord) -> Result<(), StoreError> {
        split_key_path(key_path)?;
        self.records.write().await.insert(key_path.to_string(), record.clone());
        Ok(())
    }
}
