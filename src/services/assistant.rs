// AssistantService - keyword-routed replies about the currently filtered posts
// Sits above the record store; every number it quotes comes from the metrics aggregator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Metrics;
use crate::infrastructure::record_store::RecordStore;
use crate::models::Post;

/// Posts above this multiple of the mean engagement are reported as spikes
const SPIKE_FACTOR: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Trend,
    Anomaly,
    Recommendation,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Insight {
    fn new(kind: InsightKind, title: &str, description: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description,
            value: None,
        }
    }

    fn with_value(mut self, value: String) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub content: String,
    pub insights: Vec<Insight>,
}

/// Topic picked from the query; first matching keyword group wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Summary,
    Sentiment,
    Trend,
    Recommendation,
    Anomaly,
    Help,
}

fn route(query: &str) -> Topic {
    let query = query.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| query.contains(w));
    if has(&["summary", "overview"]) {
        Topic::Summary
    } else if has(&["sentiment"]) {
        Topic::Sentiment
    } else if has(&["trend", "pattern"]) {
        Topic::Trend
    } else if has(&["recommendation", "advice"]) {
        Topic::Recommendation
    } else if has(&["anomaly", "unusual"]) {
        Topic::Anomaly
    } else {
        Topic::Help
    }
}

fn percent(part: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0 + 0.5).floor() as u64
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build a reply from already-filtered posts and their metrics
pub fn compose_reply(query: &str, metrics: &Metrics, posts: &[Post]) -> AssistantReply {
    let topic = route(query);
    debug!("Assistant query routed: topic={:?} posts={}", topic, metrics.total);

    if metrics.total == 0 && topic != Topic::Help {
        return AssistantReply {
            content: "There are no posts in the current view. Import data or relax the filters, then ask again.".to_string(),
            insights: vec![Insight::new(
                InsightKind::Summary,
                "No Data",
                "0 posts match the current filters".to_string(),
            )],
        };
    }

    match topic {
        Topic::Summary => summary_reply(metrics),
        Topic::Sentiment => sentiment_reply(metrics),
        Topic::Trend => trend_reply(metrics),
        Topic::Recommendation => recommendation_reply(metrics, posts),
        Topic::Anomaly => anomaly_reply(metrics, posts),
        Topic::Help => help_reply(),
    }
}

fn summary_reply(m: &Metrics) -> AssistantReply {
    AssistantReply {
        content: format!(
            "Based on your current data filter, you have {} posts from {} unique authors. \
             The total engagement is {} with a reach of {}.",
            m.total, m.unique_authors, m.total_engagement, m.total_reach
        ),
        insights: vec![
            Insight::new(InsightKind::Summary, "Data Overview", format!("{} posts analyzed", m.total))
                .with_value(format!("{} authors", m.unique_authors)),
            Insight::new(
                InsightKind::Trend,
                "Engagement Trend",
                "Total engagement across all platforms".to_string(),
            )
            .with_value(m.total_engagement.to_string()),
        ],
    }
}

fn sentiment_reply(m: &Metrics) -> AssistantReply {
    let (label, count) = m.dominant_sentiment().unwrap_or(("neutral", 0));
    let reading = match label {
        "positive" => "good brand perception",
        "negative" => "areas needing attention",
        _ => "neutral public opinion",
    };
    AssistantReply {
        content: format!(
            "Your sentiment analysis shows that {} sentiment dominates with {} posts ({}%). This indicates {}.",
            label,
            count,
            percent(count, m.total),
            reading
        ),
        insights: m
            .sentiment_breakdown
            .iter()
            .map(|(sentiment, &count)| {
                Insight::new(
                    InsightKind::Summary,
                    &format!("{} Sentiment", capitalize(sentiment)),
                    format!("{} posts ({}%)", count, percent(count, m.total)),
                )
                .with_value(count.to_string())
            })
            .collect(),
    }
}

fn top_platform(m: &Metrics) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (platform, &count) in &m.platform_breakdown {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((platform.as_str(), count));
        }
    }
    best
}

fn trend_reply(m: &Metrics) -> AssistantReply {
    let mut insights: Vec<Insight> = m
        .platform_breakdown
        .iter()
        .map(|(platform, &count)| {
            Insight::new(
                InsightKind::Trend,
                &format!("{} Activity", platform),
                format!("{} posts ({}%)", count, percent(count, m.total)),
            )
        })
        .collect();
    let average = m.total_engagement / m.total.max(1) as u64;
    insights.push(
        Insight::new(
            InsightKind::Trend,
            "Average Engagement",
            "Mean engagement per post".to_string(),
        )
        .with_value(average.to_string()),
    );

    let content = match top_platform(m) {
        Some((platform, count)) => format!(
            "Activity is spread over {} platforms. {} leads with {} of {} posts.",
            m.platform_breakdown.len(),
            platform,
            count,
            m.total
        ),
        None => "No platform activity to compare yet.".to_string(),
    };
    AssistantReply { content, insights }
}

fn recommendation_reply(m: &Metrics, posts: &[Post]) -> AssistantReply {
    let mut insights = Vec::new();
    if let Some((platform, _)) = top_platform(m) {
        insights.push(Insight::new(
            InsightKind::Recommendation,
            "Engagement Strategy",
            format!("Concentrate effort on {}, where most of your posts live", platform),
        ));
    }
    if let Some(best) = posts.iter().max_by_key(|p| p.engagement) {
        insights.push(
            Insight::new(
                InsightKind::Recommendation,
                "Content Optimization",
                format!("Study the top post by {} on {}", best.author, best.platform),
            )
            .with_value(best.engagement.to_string()),
        );
    }
    let negative = m.sentiment_breakdown.get("negative").copied().unwrap_or(0);
    let content = if negative > 0 {
        format!(
            "Focus on amplifying positive sentiment and respond promptly to the {} negative posts ({}%).",
            negative,
            percent(negative, m.total)
        )
    } else {
        "Focus on amplifying positive sentiment and grow engagement on the platforms with the highest reach.".to_string()
    };
    AssistantReply { content, insights }
}

fn anomaly_reply(m: &Metrics, posts: &[Post]) -> AssistantReply {
    let average = m.total_engagement / m.total.max(1) as u64;
    let threshold = average.saturating_mul(SPIKE_FACTOR).max(1);
    let spikes: Vec<&Post> = posts.iter().filter(|p| p.engagement > threshold).collect();

    let mut insights = Vec::new();
    if !spikes.is_empty() {
        insights.push(
            Insight::new(
                InsightKind::Anomaly,
                "Engagement Spike",
                format!("Unusually high engagement on {} posts", spikes.len()),
            )
            .with_value(format!("> {}", threshold)),
        );
    }
    let negative = m.sentiment_breakdown.get("negative").copied().unwrap_or(0);
    if percent(negative, m.total) >= 50 {
        insights.push(Insight::new(
            InsightKind::Anomaly,
            "Sentiment Drop",
            format!("{}% of posts are negative", percent(negative, m.total)),
        ));
    }

    let content = if insights.is_empty() {
        "Nothing unusual stands out in the current view.".to_string()
    } else {
        format!(
            "I found {} posts with engagement above {}x the average of {}, which might indicate viral or promoted content.",
            spikes.len(),
            SPIKE_FACTOR,
            average
        )
    };
    AssistantReply { content, insights }
}

fn help_reply() -> AssistantReply {
    AssistantReply {
        content: "I can help with sentiment analysis, trend identification, performance metrics, \
                  anomaly detection, and strategic recommendations. Could you be more specific?"
            .to_string(),
        insights: vec![Insight::new(
            InsightKind::Summary,
            "Available Analysis",
            "I can analyze sentiment, trends, performance, and anomalies".to_string(),
        )],
    }
}

#[derive(Clone)]
pub struct AssistantService {
    store: RecordStore,
}

impl AssistantService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn respond(&self, query: &str) -> AssistantReply {
        let posts = self.store.filtered_posts().await;
        let metrics = crate::core::metrics(&posts);
        compose_reply(query, &metrics, &posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics;
    use crate::models::Sentiment;

    fn post(platform: &str, sentiment: Sentiment, engagement: u64) -> Post {
        Post {
            id: format!("{}-{}", platform, engagement),
            content: String::new(),
            platform: platform.into(),
            sentiment,
            engagement,
            author: format!("author-{}", engagement),
            url: None,
            hashtags: vec![],
            created_at: "2024-01-01".into(),
            location: None,
            language: "en".into(),
            media_type: "text".into(),
            reach: 10,
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post("X", Sentiment::Positive, 1),
            post("X", Sentiment::Positive, 2),
            post("X", Sentiment::Negative, 3),
            post("Y", Sentiment::Neutral, 2),
            post("Y", Sentiment::Positive, 100),
        ]
    }

    #[test]
    fn test_routing() {
        assert_eq!(route("Give me an OVERVIEW"), Topic::Summary);
        assert_eq!(route("sentiment please"), Topic::Sentiment);
        assert_eq!(route("any patterns?"), Topic::Trend);
        assert_eq!(route("advice"), Topic::Recommendation);
        assert_eq!(route("unusual stuff"), Topic::Anomaly);
        assert_eq!(route("hello"), Topic::Help);
        // Earlier groups win when several match
        assert_eq!(route("sentiment summary"), Topic::Summary);
    }

    #[test]
    fn test_summary_quotes_metrics() {
        let posts = sample();
        let reply = compose_reply("summary", &metrics(&posts), &posts);
        assert!(reply.content.contains("5 posts from 4 unique authors"));
        assert_eq!(reply.insights[1].value.as_deref(), Some("108"));
    }

    #[test]
    fn test_sentiment_reply() {
        let posts = sample();
        let reply = compose_reply("sentiment", &metrics(&posts), &posts);
        assert!(reply.content.contains("positive sentiment dominates with 3 posts (60%)"));
        assert_eq!(reply.insights.len(), 3);
        assert_eq!(reply.insights[0].title, "Positive Sentiment");
    }

    #[test]
    fn test_anomaly_finds_spike() {
        let posts = sample();
        let reply = compose_reply("anything unusual?", &metrics(&posts), &posts);
        assert_eq!(reply.insights[0].kind, InsightKind::Anomaly);
        assert!(reply.insights[0].description.contains("1 posts"));
    }

    #[test]
    fn test_empty_data_is_graceful() {
        let reply = compose_reply("trend", &Metrics::default(), &[]);
        assert_eq!(reply.insights[0].title, "No Data");
        let help = compose_reply("hi", &Metrics::default(), &[]);
        assert_eq!(help.insights[0].title, "Available Analysis");
    }
}
