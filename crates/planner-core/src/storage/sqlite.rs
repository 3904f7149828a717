use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult};
use crate::types::TravelPlanRecord;

#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    db_path: PathBuf,
    table: String,
}

impl SqliteRecordStore {
    /// Fails when `table` is not a plain identifier, since it is spliced into
    /// SQL text.
    pub fn new(db_path: impl AsRef<Path>, table: impl Into<String>) -> StoreResult<Self> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(StoreError::InvalidTable(table));
        }

        Ok(Self {
            db_path: db_path.as_ref().to_path_buf(),
            table,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn with_connection<T, F>(&self, func: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> StoreResult<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || {
            let connection = open_connection(&db_path)?;
            func(&connection, &table)
        })
        .await
        .map_err(|error| StoreError::Task(error.to_string()))?
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<TravelPlanRecord>> {
        self.with_connection(move |connection, table| {
            connection
                .query_row(
                    &format!(
                        "SELECT id, location, budget, duration, age_group, transport, \
                         generated_plan, timestamp, ip_address FROM \"{table}\" WHERE id = ?1"
                    ),
                    params![id.to_string()],
                    read_row,
                )
                .optional()
                .map_err(StoreError::from)
        })
        .await
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.with_connection(|connection, table| {
            let count: i64 = connection.query_row(
                &format!("SELECT COUNT(*) FROM \"{table}\""),
                [],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
        .await
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn init(&self) -> StoreResult<()> {
        self.with_connection(|connection, table| {
            connection.execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS "{table}" (
                    id TEXT PRIMARY KEY,
                    location TEXT NOT NULL,
                    budget TEXT NOT NULL,
                    duration INTEGER NOT NULL,
                    age_group TEXT NOT NULL,
                    transport TEXT NOT NULL,
                    generated_plan TEXT NOT NULL,
                    timestamp INTEGER NOT NULL,
                    ip_address TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS "idx_{table}_timestamp" ON "{table}"(timestamp);
                "#
            ))?;
            Ok(())
        })
        .await
    }

    async fn put_if_absent(&self, record: &TravelPlanRecord) -> StoreResult<()> {
        let record = record.clone();
        self.with_connection(move |connection, table| {
            let inserted = connection.execute(
                &format!(
                    "INSERT INTO \"{table}\" (id, location, budget, duration, age_group, \
                     transport, generated_plan, timestamp, ip_address) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                     ON CONFLICT(id) DO NOTHING"
                ),
                params![
                    record.id.to_string(),
                    record.location,
                    record.budget,
                    record.duration,
                    record.age_group,
                    record.transport,
                    record.generated_plan,
                    record.timestamp,
                    record.ip_address,
                ],
            )?;

            if inserted == 0 {
                log::warn!("Record {} already exists in {}, insert skipped", record.id, table);
                return Err(StoreError::AlreadyExists(record.id.to_string()));
            }
            Ok(())
        })
        .await
    }
}

fn open_connection(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let connection = Connection::open(path)?;
    connection.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        "#,
    )?;
    Ok(connection)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<TravelPlanRecord> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;

    Ok(TravelPlanRecord {
        id,
        location: row.get(1)?,
        budget: row.get(2)?,
        duration: row.get(3)?,
        age_group: row.get(4)?,
        transport: row.get(5)?,
        generated_plan: row.get(6)?,
        timestamp: row.get(7)?,
        ip_address: row.get(8)?,
    })
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}
