//! Record persistence.
//!
//! The handler only ever writes, and only through [`RecordStore::put_if_absent`].
//! Read helpers live on the concrete stores for tests and operators.

mod memory;
mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::TravelPlanRecord;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    AlreadyExists(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task join error: {0}")]
    Task(String),

    #[error("invalid table name '{0}'")]
    InvalidTable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Prepares the underlying collection. Safe to call more than once.
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Inserts `record` unless a record with the same id already exists, in
    /// which case [`StoreError::AlreadyExists`] is returned and the stored
    /// record is left untouched.
    async fn put_if_absent(&self, record: &TravelPlanRecord) -> StoreResult<()>;
}
