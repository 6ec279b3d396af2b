// Filter Pipeline - one deterministic pass of view filters over the post collection
//
// Order: platform set, sentiment set, date window, then predicates in list order.
// Nothing here mutates a post; unknown fields or operators let every post through.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::core::field_access::{coerce_number, read_field, FieldValue};
use crate::models::{FilterOperator, FilterPredicate, Operand, Post, ViewState};

/// Filter with "now" taken from the wall clock
pub fn filtered(posts: &[Post], view: &ViewState) -> Vec<Post> {
    filtered_at(posts, view, Utc::now())
}

/// Filter with an explicit "now", used for posts whose timestamp does not parse
pub fn filtered_at(posts: &[Post], view: &ViewState, now: DateTime<Utc>) -> Vec<Post> {
    filter_refs(posts, view, now).into_iter().cloned().collect()
}

pub fn filter_refs<'a>(posts: &'a [Post], view: &ViewState, now: DateTime<Utc>) -> Vec<&'a Post> {
    let mut out: Vec<&Post> = posts.iter().collect();

    if !view.selected_platforms.is_empty() {
        out.retain(|p| view.selected_platforms.contains(&p.platform));
    }

    if !view.selected_sentiments.is_empty() {
        out.retain(|p| view.selected_sentiments.contains(p.sentiment.as_str()));
    }

    if let Some((start, end)) = view.date_range.bounds() {
        out.retain(|p| {
            let at = parse_timestamp(&p.created_at).unwrap_or(now);
            at >= start && at <= end
        });
    }

    for predicate in &view.predicates {
        out.retain(|p| predicate_matches(p, predicate));
    }

    out
}

/// Evaluate one predicate against one post
pub fn predicate_matches(post: &Post, predicate: &FilterPredicate) -> bool {
    let value = match read_field(post, &predicate.field) {
        Some(value) => value,
        None => return true,
    };

    match predicate.operator {
        FilterOperator::Equals => strict_equals(&value, &predicate.operand),
        FilterOperator::Contains => match value.as_text() {
            Some(text) => text
                .to_lowercase()
                .contains(&predicate.operand.to_string().to_lowercase()),
            None => false,
        },
        FilterOperator::GreaterThan => value.as_number() > operand_number(&predicate.operand),
        FilterOperator::LessThan => value.as_number() < operand_number(&predicate.operand),
        FilterOperator::Unknown => true,
    }
}

fn strict_equals(value: &FieldValue<'_>, operand: &Operand) -> bool {
    match (value, operand) {
        (FieldValue::Text(s), Operand::Text(o)) => *s == o.as_str(),
        (FieldValue::Number(n), Operand::Number(o)) => n == o,
        _ => false,
    }
}

fn operand_number(operand: &Operand) -> f64 {
    match operand {
        Operand::Number(n) if n.is_finite() => *n,
        Operand::Number(_) => 0.0,
        Operand::Text(s) => coerce_number(s),
    }
}

/// Parse the timestamp formats seen in exports. Naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
