// Post Insights - social post normalization, filtering and aggregation engine

// Domain models - posts, raw rows, view state, chart specs
pub mod models;

// Core engine - field resolution, filtering, metrics, series
pub mod core;

// Infrastructure - record store, persistence, id generation, caching
pub mod infrastructure;

// Ingestion edge - CSV/JSON decoding, data quality, remote sheets
pub mod ingest;

// Services built on the record store
pub mod services;

// Application wiring and HTTP surface
pub mod app_state;
pub mod config;
pub mod insights_interface;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use infrastructure::record_store::{IngestReport, RecordStore, StoreOptions};
