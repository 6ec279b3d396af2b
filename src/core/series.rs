// Series Generator - grouped, reduced chart data from filtered posts

use indexmap::IndexMap;

use crate::core::field_access::{read_field, FieldValue};
use crate::models::chart::palette_color;
use crate::models::{ChartKind, ChartSpec, GroupedPoint, Post, Reducer, Series, SharePoint};

const UNKNOWN_GROUP: &str = "Unknown";

pub fn generate_series<'a, I>(posts: I, spec: &ChartSpec) -> Series
where
    I: IntoIterator<Item = &'a Post>,
{
    match spec.kind {
        ChartKind::CategoricalShare => share_series(posts, &spec.group_field),
        _ => grouped_series(posts, spec),
    }
}

fn group_key(post: &Post, field: &str) -> String {
    read_field(post, field)
        .and_then(|value| value.as_text().map(|s| s.into_owned()))
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}

/// Count per group, colored by first-seen index
fn share_series<'a, I>(posts: I, group_field: &str) -> Series
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for post in posts {
        *counts.entry(group_key(post, group_field)).or_insert(0) += 1;
    }

    let points = counts
        .into_iter()
        .enumerate()
        .map(|(index, (name, value))| SharePoint {
            name,
            value,
            color: palette_color(index).to_string(),
        })
        .collect();
    Series::Share(points)
}

fn grouped_series<'a, I>(posts: I, spec: &ChartSpec) -> Series
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    for post in posts {
        let value = read_field(post, &spec.value_field)
            .unwrap_or(FieldValue::Missing)
            .as_number();
        groups.entry(group_key(post, &spec.group_field)).or_default().push(value);
    }

    let mut points: Vec<GroupedPoint> = groups
        .into_iter()
        .map(|(key, values)| GroupedPoint {
            key,
            value: round_half_up(reduce(spec.reducer, &values)),
        })
        .collect();

    // sort_by is stable, so ties keep first-seen group order
    points.sort_by(|a, b| b.value.cmp(&a.value));

    Series::Grouped {
        group_field: spec.group_field.clone(),
        value_field: spec.value_field.clone(),
        points,
    }
}

/// Apply a reducer to one group's values. Groups are never empty.
pub fn reduce(reducer: Reducer, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match reducer {
        Reducer::Count => values.len() as f64,
        Reducer::Sum => values.iter().sum(),
        Reducer::Average => values.iter().sum::<f64>() / values.len() as f64,
        Reducer::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Nearest integer, halves toward positive infinity
fn round_half_up(x: f64) -> i64 {
    if x.is_finite() {
        (x + 0.5).floor() as i64
    } else {
        0
    }
}
