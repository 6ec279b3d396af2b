// Canonical post record - every imported row is normalized into this shape

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment label attached to a post.
/// Only the exact lowercase names are recognized; everything else is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Strict parse, no case folding. Unknown labels become `Neutral`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized social media post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub platform: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub engagement: u64,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(alias = "created_at")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_media_type", alias = "media_type")]
    pub media_type: String,
    #[serde(default)]
    pub reach: u64,
}

pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_PLATFORM: &str = "Unknown";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MEDIA_TYPE: &str = "text";

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_media_type() -> String {
    DEFAULT_MEDIA_TYPE.to_string()
}
