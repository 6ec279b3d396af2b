// Services - higher-level logic above the record store

pub mod assistant;

pub use assistant::{AssistantReply, AssistantService, Insight, InsightKind};
