// Infrastructure modules
pub mod cache;          // LRU series cache
pub mod id_generator;   // Post ID generation
pub mod persistence;    // Snapshot stores and background writer
pub mod record_store;   // Canonical post collection and view state

// Re-export infrastructure components
pub use cache::{Cache, SeriesCache};
pub use id_generator::PostIdGenerator;
pub use persistence::{MemorySnapshotStore, PersistenceWriter, SnapshotStore, SqliteSnapshotStore};
pub use record_store::{IngestReport, RecordStore, StoreOptions};
