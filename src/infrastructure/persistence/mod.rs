// Snapshot persistence - opaque load/save of the post collection and view state

pub mod memory;
pub mod sqlite;
pub mod writer;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Post, ViewState};

pub use memory::MemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;
pub use writer::PersistenceWriter;

/// Key-value snapshot store behind the record store.
/// Posts and view are saved under separate keys derived from one storage key.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Saved posts, or an empty list when nothing was saved yet
    async fn load_posts(&self) -> AppResult<Vec<Post>>;
    async fn save_posts(&self, posts: &[Post]) -> AppResult<()>;

    async fn load_view(&self) -> AppResult<Option<ViewState>>;
    async fn save_view(&self, view: &ViewState) -> AppResult<()>;
}
