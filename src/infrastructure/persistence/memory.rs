use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::SnapshotStore;
use crate::error::{AppError, AppResult};
use crate::models::{Post, ViewState};

/// In-process snapshot store. Can be switched into a failing mode to
/// exercise the "persistence failure is logged, state continues" path.
#[derive(Default)]
pub struct MemorySnapshotStore {
    posts: RwLock<Option<Vec<Post>>>,
    view: RwLock<Option<ViewState>>,
    failing: AtomicBool,
    post_saves: AtomicUsize,
    view_saves: AtomicUsize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a saved snapshot
    pub fn with_snapshot(posts: Vec<Post>, view: Option<ViewState>) -> Self {
        Self {
            posts: RwLock::new(Some(posts)),
            view: RwLock::new(view),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn post_saves(&self) -> usize {
        self.post_saves.load(Ordering::SeqCst)
    }

    pub fn view_saves(&self) -> usize {
        self.view_saves.load(Ordering::SeqCst)
    }

    pub async fn saved_posts(&self) -> Option<Vec<Post>> {
        self.posts.read().await.clone()
    }

    pub async fn saved_view(&self) -> Option<ViewState> {
        self.view.read().await.clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::PersistenceError("memory store is unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load_posts(&self) -> AppResult<Vec<Post>> {
        self.check()?;
        Ok(self.posts.read().await.clone().unwrap_or_default())
    }

    async fn save_posts(&self, posts: &[Post]) -> AppResult<()> {
        self.check()?;
        *self.posts.write().await = Some(posts.to_vec());
        self.post_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_view(&self) -> AppResult<Option<ViewState>> {
        self.check()?;
        Ok(self.view.read().await.clone())
    }

    async fn save_view(&self, view: &ViewState) -> AppResult<()> {
        self.check()?;
        *self.view.write().await = Some(view.clone());
        self.view_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
