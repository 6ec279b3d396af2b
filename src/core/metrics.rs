// Metrics Aggregator - summary statistics over a (filtered) post slice

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::Post;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total: usize,
    pub unique_authors: usize,
    pub total_engagement: u64,
    pub total_reach: u64,
    /// Only sentiments that actually occur, in first-seen order
    pub sentiment_breakdown: IndexMap<String, usize>,
    /// Only platforms that actually occur, in first-seen order
    pub platform_breakdown: IndexMap<String, usize>,
}

impl Metrics {
    /// Most frequent sentiment; ties go to the one seen first
    pub fn dominant_sentiment(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (label, &count) in &self.sentiment_breakdown {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label.as_str(), count));
            }
        }
        best
    }
}

/// Single pass over `posts`
pub fn metrics<'a, I>(posts: I) -> Metrics
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut out = Metrics::default();
    let mut authors: HashSet<&str> = HashSet::new();

    for post in posts {
        out.total += 1;
        authors.insert(post.author.as_str());
        out.total_engagement = out.total_engagement.saturating_add(post.engagement);
        out.total_reach = out.total_reach.saturating_add(post.reach);
        *out
            .sentiment_breakdown
            .entry(post.sentiment.as_str().to_string())
            .or_insert(0) += 1;
        *out.platform_breakdown.entry(post.platform.clone()).or_insert(0) += 1;
    }

    out.unique_authors = authors.len();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;

    fn post(author: &str, platform: &str, sentiment: Sentiment, engagement: u64, reach: u64) -> Post {
        Post {
            id: format!("{}-{}", author, engagement),
            content: String::new(),
            platform: platform.into(),
            sentiment,
            engagement,
            author: author.into(),
            url: None,
            hashtags: vec![],
            created_at: "2024-01-01".into(),
            location: None,
            language: "en".into(),
            media_type: "text".into(),
            reach,
        }
    }

    #[test]
    fn test_empty_input() {
        let m = metrics(&Vec::<Post>::new());
        assert_eq!(m, Metrics::default());
        assert_eq!(m.total, 0);
        assert!(m.sentiment_breakdown.is_empty());
        assert!(m.platform_breakdown.is_empty());
        assert!(m.dominant_sentiment().is_none());
    }

    #[test]
    fn test_sums_and_breakdowns() {
        let posts = vec![
            post("amy", "X", Sentiment::Positive, 10, 100),
            post("bob", "Y", Sentiment::Negative, 5, 50),
            post("amy", "X", Sentiment::Positive, 1, 0),
        ];
        let m = metrics(&posts);
        assert_eq!(m.total, 3);
        assert_eq!(m.unique_authors, 2);
        assert_eq!(m.total_engagement, 16);
        assert_eq!(m.total_reach, 150);
        assert_eq!(m.sentiment_breakdown.get("positive"), Some(&2));
        assert_eq!(m.sentiment_breakdown.get("neutral"), None);
        assert_eq!(m.platform_breakdown.keys().collect::<Vec<_>>(), vec!["X", "Y"]);
        assert_eq!(m.sentiment_breakdown.values().sum::<usize>(), m.total);
        assert_eq!(m.dominant_sentiment(), Some(("positive", 2)));
    }
}
