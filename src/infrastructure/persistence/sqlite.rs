use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, sqlite::SqlitePool, Row};
use std::str::FromStr;
use tracing::{debug, info};

use super::SnapshotStore;
use crate::error::{AppError, AppResult};
use crate::models::{Post, ViewState};

/// SQLite implementation of the snapshot store.
/// One row per key; each save overwrites the whole payload.
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
    storage_key: String,
}

impl SqliteSnapshotStore {
    /// Open (creating the file if needed) and initialise the snapshot table
    pub async fn connect(database_url: &str, storage_key: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database url {}: {}", database_url, e)))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            AppError::PersistenceError(format!("Failed to connect to SQLite at {}: {}", database_url, e))
        })?;

        let store = Self::with_pool(pool, storage_key);
        store.init().await?;
        info!("Snapshot store ready: url={} key={}", database_url, storage_key);
        Ok(store)
    }

    pub async fn new_in_memory(storage_key: &str) -> AppResult<Self> {
        let pool = SqlitePool::connect("sqlite::memory:").await.map_err(|e| {
            AppError::PersistenceError(format!("Failed to connect to in-memory SQLite: {}", e))
        })?;
        let store = Self::with_pool(pool, storage_key);
        store.init().await?;
        Ok(store)
    }

    fn with_pool(pool: SqlitePool, storage_key: &str) -> Self {
        Self {
            pool,
            storage_key: storage_key.to_string(),
        }
    }

    pub async fn init(&self) -> AppResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS snapshots (
                storage_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::PersistenceError(format!("Failed to create snapshots table: {}", e)))?;
        Ok(())
    }

    fn posts_key(&self) -> String {
        format!("{}:posts", self.storage_key)
    }

    fn view_key(&self) -> String {
        format!("{}:view", self.storage_key)
    }

    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        let row = sqlx::query("SELECT payload FROM snapshots WHERE storage_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>("payload")))
    }

    async fn write(&self, key: &str, payload: String) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO snapshots (storage_key, payload, updated) VALUES (?, ?, ?)
             ON CONFLICT(storage_key) DO UPDATE SET payload = excluded.payload, updated = excluded.updated",
        )
        .bind(key)
        .bind(&payload)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        debug!("Snapshot written: key={} bytes={}", key, payload.len());
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load_posts(&self) -> AppResult<Vec<Post>> {
        match self.read(&self.posts_key()).await? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_posts(&self, posts: &[Post]) -> AppResult<()> {
        let payload = serde_json::to_string(posts)
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        self.write(&self.posts_key(), payload).await
    }

    async fn load_view(&self) -> AppResult<Option<ViewState>> {
        match self.read(&self.view_key()).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn save_view(&self, view: &ViewState) -> AppResult<()> {
        let payload = serde_json::to_string(view)
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        self.write(&self.view_key(), payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;

    fn post(id: &str) -> Post {
        Post {
            id: id.into(),
            content: "hello".into(),
            platform: "X".into(),
            sentiment: Sentiment::Positive,
            engagement: 3,
            author: "amy".into(),
            url: None,
            hashtags: vec!["#a".into()],
            created_at: "2024-01-01T00:00:00.000Z".into(),
            location: None,
            language: "en".into(),
            media_type: "text".into(),
            reach: 9,
        }
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let store = SqliteSnapshotStore::new_in_memory("test").await.unwrap();
        assert!(store.load_posts().await.unwrap().is_empty());
        assert!(store.load_view().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = SqliteSnapshotStore::new_in_memory("test").await.unwrap();
        store.save_posts(&[post("1"), post("2")]).await.unwrap();
        store.save_posts(&[post("3")]).await.unwrap();
        let loaded = store.load_posts().await.unwrap();
        assert_eq!(loaded, vec![post("3")]);

        let mut view = ViewState::default();
        view.selected_platforms.insert("X".into());
        store.save_view(&view).await.unwrap();
        assert_eq!(store.load_view().await.unwrap(), Some(view));
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("snapshots.db").display());

        let store = SqliteSnapshotStore::connect(&url, "posts").await.unwrap();
        store.save_posts(&[post("1")]).await.unwrap();
        drop(store);

        let reopened = SqliteSnapshotStore::connect(&url, "posts").await.unwrap();
        assert_eq!(reopened.load_posts().await.unwrap().len(), 1);
    }
}
