// Typed field accessors - read a Post field by its public name.
// Unknown names have no accessor, so callers can fail closed.

use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::models::Post;

/// Borrowed view of one field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    List(&'a [String]),
    Missing,
}

impl<'a> FieldValue<'a> {
    /// String form used for substring matching and grouping.
    /// Lists join with commas; missing values have no string form.
    pub fn as_text(&self) -> Option<Cow<'a, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(*s)),
            FieldValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            FieldValue::List(items) => Some(Cow::Owned(items.join(","))),
            FieldValue::Missing => None,
        }
    }

    /// Numeric coercion; anything non-numeric is 0
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => coerce_number(s),
            FieldValue::List(_) | FieldValue::Missing => 0.0,
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Whole-string numeric parse. Blank or non-numeric text is 0.
pub fn coerce_number(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

pub type FieldAccessor = for<'a> fn(&'a Post) -> FieldValue<'a>;

static FIELD_ACCESSORS: Lazy<HashMap<&'static str, FieldAccessor>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, FieldAccessor> = HashMap::new();
    table.insert("id", |p| FieldValue::Text(&p.id));
    table.insert("content", |p| FieldValue::Text(&p.content));
    table.insert("platform", |p| FieldValue::Text(&p.platform));
    table.insert("sentiment", |p| FieldValue::Text(p.sentiment.as_str()));
    table.insert("engagement", |p| FieldValue::Number(p.engagement as f64));
    table.insert("author", |p| FieldValue::Text(&p.author));
    table.insert("url", |p| optional_text(&p.url));
    table.insert("hashtags", |p| FieldValue::List(&p.hashtags));
    table.insert("createdAt", |p| FieldValue::Text(&p.created_at));
    table.insert("created_at", |p| FieldValue::Text(&p.created_at));
    table.insert("location", |p| optional_text(&p.location));
    table.insert("language", |p| FieldValue::Text(&p.language));
    table.insert("mediaType", |p| FieldValue::Text(&p.media_type));
    table.insert("media_type", |p| FieldValue::Text(&p.media_type));
    table.insert("reach", |p| FieldValue::Number(p.reach as f64));
    table
});

fn optional_text(value: &Option<String>) -> FieldValue<'_> {
    match value {
        Some(s) => FieldValue::Text(s),
        None => FieldValue::Missing,
    }
}

pub fn field_accessor(name: &str) -> Option<FieldAccessor> {
    FIELD_ACCESSORS.get(name).copied()
}

/// Read a field by name; `None` when the name is not a Post field
pub fn read_field<'a>(post: &'a Post, name: &str) -> Option<FieldValue<'a>> {
    field_accessor(name).map(|get| get(post))
}

pub fn is_known_field(name: &str) -> bool {
    FIELD_ACCESSORS.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;

    fn post() -> Post {
        Post {
            id: "1".into(),
            content: "Hello".into(),
            platform: "X".into(),
            sentiment: Sentiment::Positive,
            engagement: 7,
            author: "amy".into(),
            url: None,
            hashtags: vec!["a".into(), "b".into()],
            created_at: "2024-01-01".into(),
            location: Some("NL".into()),
            language: "en".into(),
            media_type: "text".into(),
            reach: 100,
        }
    }

    #[test]
    fn test_known_fields() {
        let p = post();
        assert_eq!(read_field(&p, "sentiment"), Some(FieldValue::Text("positive")));
        assert_eq!(read_field(&p, "engagement").unwrap().as_number(), 7.0);
        assert_eq!(read_field(&p, "mediaType"), read_field(&p, "media_type"));
        assert_eq!(read_field(&p, "hashtags").unwrap().as_text().unwrap(), "a,b");
        assert_eq!(read_field(&p, "url"), Some(FieldValue::Missing));
    }

    #[test]
    fn test_unknown_field_has_no_accessor() {
        assert!(read_field(&post(), "__proto__").is_none());
        assert!(!is_known_field("likes"));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_number("5"), 5.0);
        assert_eq!(coerce_number(" 2.5 "), 2.5);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(FieldValue::Missing.as_number(), 0.0);
    }
}
