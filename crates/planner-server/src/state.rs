use std::sync::Arc;

use anyhow::Context;
use planner_core::{MemoryRecordStore, RecordStore, SqliteRecordStore};
use planner_llm::CohereProvider;

use crate::config::{PlannerArgs, StoreBackend};
use crate::handlers::plan::TravelPlanHandler;

pub struct AppState {
    pub handler: TravelPlanHandler,
}

impl AppState {
    pub fn new(handler: TravelPlanHandler) -> Self {
        Self { handler }
    }

    /// Builds the store, completion client and CORS policy once per process.
    pub async fn from_args(args: &PlannerArgs) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match args.store_backend {
            StoreBackend::Sqlite => {
                log::info!(
                    "Using SQLite store at {} (table {})",
                    args.store_path.display(),
                    args.store_table
                );
                Arc::new(SqliteRecordStore::new(&args.store_path, &args.store_table)?)
            }
            StoreBackend::Memory => {
                log::warn!("Using in-memory store; records are lost on exit");
                Arc::new(MemoryRecordStore::new())
            }
        };
        store.init().await.context("failed to initialize record store")?;

        let settings = args.completion_settings()?;
        log::info!(
            "Completion service: {} (model {}, timeout {}s, retries {})",
            settings.base_url,
            settings.model,
            settings.timeout.as_secs(),
            settings.max_retries
        );
        let completion = Arc::new(CohereProvider::new(args.api_key.expose(), settings)?);

        let cors = args.cors_policy()?;
        log::info!(
            "CORS default origin {}, {} allowed origin(s)",
            cors.default_origin(),
            cors.allowed_origins().len()
        );

        let handler = TravelPlanHandler::new(completion, store, cors)
            .with_html_line_breaks(args.html_line_breaks);

        Ok(Self::new(handler))
    }
}
