// Field Resolver - maps an arbitrary raw row onto the canonical Post shape
//
// Every canonical field has an ordered alias list. The first alias present in the
// row with a usable value wins; otherwise the field default applies. Resolution
// never fails: malformed cells degrade to defaults.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::post::{DEFAULT_AUTHOR, DEFAULT_LANGUAGE, DEFAULT_MEDIA_TYPE, DEFAULT_PLATFORM};
use crate::models::{Post, RawRow, RawValue, Sentiment};

/// Ordered alias names accepted for each canonical field
#[derive(Debug, Clone)]
pub struct AliasTable {
    pub id: Vec<String>,
    pub content: Vec<String>,
    pub platform: Vec<String>,
    pub sentiment: Vec<String>,
    pub engagement: Vec<String>,
    pub author: Vec<String>,
    pub url: Vec<String>,
    pub hashtags: Vec<String>,
    pub created_at: Vec<String>,
    pub location: Vec<String>,
    pub language: Vec<String>,
    pub media_type: Vec<String>,
    pub reach: Vec<String>,
}

fn names(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            id: names(&["id"]),
            content: names(&["content", "text", "message"]),
            platform: names(&["platform", "source"]),
            sentiment: names(&["sentiment"]),
            engagement: names(&["engagement", "likes", "interactions"]),
            author: names(&["author", "user", "username"]),
            url: names(&["url", "link"]),
            hashtags: names(&["hashtags"]),
            created_at: names(&["created_at", "createdAt", "date", "published_at"]),
            location: names(&["location", "country"]),
            language: names(&["language"]),
            media_type: names(&["media_type", "mediaType"]),
            reach: names(&["reach", "impressions"]),
        }
    }
}

/// Inputs for the generated defaults, so resolution itself stays pure
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext {
    /// 0-based position of the row inside its batch
    pub position: usize,
    pub ingested_at: DateTime<Utc>,
}

impl ResolveContext {
    pub fn new(position: usize, ingested_at: DateTime<Utc>) -> Self {
        Self { position, ingested_at }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    aliases: AliasTable,
}

impl FieldResolver {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolve one row. The returned post carries the row's own id when it has one,
    /// otherwise an empty id that the record store replaces.
    pub fn resolve(&self, row: &RawRow, ctx: &ResolveContext) -> Post {
        let a = &self.aliases;
        Post {
            id: first_text(row, &a.id).unwrap_or_default(),
            content: first_text(row, &a.content).unwrap_or_else(|| format!("Post {}", ctx.position + 1)),
            platform: first_text(row, &a.platform).unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            sentiment: first_text(row, &a.sentiment)
                .map(|s| Sentiment::from_label(&s))
                .unwrap_or_default(),
            engagement: first_value(row, &a.engagement).map(coerce_count).unwrap_or(0),
            author: first_text(row, &a.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            url: first_text(row, &a.url),
            hashtags: first_text(row, &a.hashtags).map(|s| split_hashtags(&s)).unwrap_or_default(),
            created_at: first_text(row, &a.created_at)
                .unwrap_or_else(|| ctx.ingested_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            location: first_text(row, &a.location),
            language: first_text(row, &a.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            media_type: first_text(row, &a.media_type).unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string()),
            reach: first_value(row, &a.reach).map(coerce_count).unwrap_or(0),
        }
    }
}

fn first_value<'a>(row: &'a RawRow, aliases: &[String]) -> Option<&'a RawValue> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias))
        .find(|value| value.is_present())
}

fn first_text(row: &RawRow, aliases: &[String]) -> Option<String> {
    first_value(row, aliases).map(|v| v.to_string())
}

/// Integer coercion for counters: leading-integer parse, anything else is 0.
/// Negative values clamp to 0.
pub fn coerce_count(value: &RawValue) -> u64 {
    match value {
        RawValue::Number(n) if n.is_finite() => n.trunc().max(0.0) as u64,
        RawValue::Number(_) | RawValue::Null => 0,
        RawValue::Text(s) => parse_leading_int(s),
    }
}

fn parse_leading_int(s: &str) -> u64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 || negative {
        return 0;
    }
    digits[..end].parse::<u64>().unwrap_or(u64::MAX)
}

fn split_hashtags(s: &str) -> Vec<String> {
    s.split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx(position: usize) -> ResolveContext {
        ResolveContext::new(position, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_row_gets_every_default() {
        let post = FieldResolver::default().resolve(&RawRow::new(), &ctx(2));
        assert_eq!(post.id, "");
        assert_eq!(post.content, "Post 3");
        assert_eq!(post.platform, "Unknown");
        assert_eq!(post.sentiment, Sentiment::Neutral);
        assert_eq!(post.engagement, 0);
        assert_eq!(post.author, "Anonymous");
        assert_eq!(post.url, None);
        assert!(post.hashtags.is_empty());
        assert_eq!(post.created_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(post.language, "en");
        assert_eq!(post.media_type, "text");
        assert_eq!(post.reach, 0);
    }

    #[test]
    fn test_alias_order_and_empty_skip() {
        let row = RawRow::new()
            .with("content", "")
            .with("text", "from text")
            .with("message", "from message")
            .with("user", "bob")
            .with("username", "robert");
        let post = FieldResolver::default().resolve(&row, &ctx(0));
        assert_eq!(post.content, "from text");
        assert_eq!(post.author, "bob");
    }

    #[test]
    fn test_whitespace_cell_is_a_value() {
        let row = RawRow::new().with("content", " ").with("text", "from text");
        let post = FieldResolver::default().resolve(&row, &ctx(0));
        assert_eq!(post.content, " ");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_count(&RawValue::from("10")), 10);
        assert_eq!(coerce_count(&RawValue::from("  42 likes")), 42);
        assert_eq!(coerce_count(&RawValue::from("bad")), 0);
        assert_eq!(coerce_count(&RawValue::from("-7")), 0);
        assert_eq!(coerce_count(&RawValue::from("3.9")), 3);
        assert_eq!(coerce_count(&RawValue::Number(12.8)), 12);
        assert_eq!(coerce_count(&RawValue::Number(-3.0)), 0);
        assert_eq!(coerce_count(&RawValue::Null), 0);
    }

    #[test]
    fn test_sentiment_validation() {
        let resolver = FieldResolver::default();
        let positive = resolver.resolve(&RawRow::new().with("sentiment", "positive"), &ctx(0));
        let shouting = resolver.resolve(&RawRow::new().with("sentiment", "NEGATIVE"), &ctx(0));
        let junk = resolver.resolve(&RawRow::new().with("sentiment", "meh"), &ctx(0));
        assert_eq!(positive.sentiment, Sentiment::Positive);
        assert_eq!(shouting.sentiment, Sentiment::Neutral);
        assert_eq!(junk.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_hashtags_split_and_trim() {
        let row = RawRow::new().with("hashtags", " #rust , #data,, ");
        let post = FieldResolver::default().resolve(&row, &ctx(0));
        assert_eq!(post.hashtags, vec!["#rust", "#data"]);
    }

    #[test]
    fn test_custom_alias_table() {
        let mut aliases = AliasTable::default();
        aliases.platform = vec!["network".to_string()];
        let resolver = FieldResolver::new(aliases);
        let post = resolver.resolve(&RawRow::new().with("network", "Mastodon").with("platform", "X"), &ctx(0));
        assert_eq!(post.platform, "Mastodon");
    }

    #[test]
    fn test_number_cells_become_text_where_needed() {
        let row = RawRow::new().with("author", 1234i64).with("likes", 5.0);
        let post = FieldResolver::default().resolve(&row, &ctx(0));
        assert_eq!(post.author, "1234");
        assert_eq!(post.engagement, 5);
    }
}
