// Post Insights Core - normalization, filtering and aggregation over posts

pub mod field_access;
pub mod field_resolver;
pub mod filter_pipeline;
pub mod metrics;
pub mod series;

// Re-export commonly used types
pub use field_access::{read_field, FieldValue};
pub use field_resolver::{AliasTable, FieldResolver, ResolveContext};
pub use filter_pipeline::{filtered, filtered_at, predicate_matches};
pub use metrics::{metrics, Metrics};
pub use series::generate_series;
