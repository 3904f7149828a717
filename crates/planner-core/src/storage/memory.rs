use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult};
use crate::types::TravelPlanRecord;

/// Process-local store. Records vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<HashMap<Uuid, TravelPlanRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<TravelPlanRecord> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn records(&self) -> Vec<TravelPlanRecord> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by_key(|record| record.timestamp);
        records
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put_if_absent(&self, record: &TravelPlanRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        match records.entry(record.id) {
            Entry::Occupied(_) => {
                log::warn!("Record {} already exists in memory store, insert skipped", record.id);
                Err(StoreError::AlreadyExists(record.id.to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }
}
