use std::sync::Arc;

use crate::{
    config::Config,
    core::FieldResolver,
    infrastructure::{
        persistence::{SnapshotStore, SqliteSnapshotStore},
        record_store::{RecordStore, StoreOptions},
    },
    ingest::SheetImporter,
    services::AssistantService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub assistant: AssistantService,
    pub sheets: Arc<SheetImporter>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize snapshot database
        let snapshots =
            SqliteSnapshotStore::connect(&config.database.url, &config.store.storage_key).await?;
        Self::with_snapshots(config, Arc::new(snapshots)).await
    }

    /// Build state over any snapshot store
    pub async fn with_snapshots(config: Config, snapshots: Arc<dyn SnapshotStore>) -> anyhow::Result<Self> {
        let options = StoreOptions {
            resolver: FieldResolver::default(),
            node_id: config.store.node_id,
            series_cache_capacity: config.cache.series_capacity,
        };
        let store = RecordStore::open(snapshots, options).await?;
        let sheets = Arc::new(SheetImporter::new(config.sheet_fetch_timeout())?);

        Ok(Self {
            assistant: AssistantService::new(store.clone()),
            store,
            sheets,
            config,
        })
    }
}
