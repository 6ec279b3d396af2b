// View state - the filter/selection configuration applied over the post collection

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison applied by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    Contains,
    #[serde(alias = "greater")]
    GreaterThan,
    #[serde(alias = "less")]
    LessThan,
    /// Anything we don't understand. Evaluates as a pass-through.
    #[serde(other)]
    Unknown,
}

/// Right-hand side of a predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Number(f64),
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

/// How a predicate joins the ones before it. Only conjunction is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
}

/// A single `field operator operand` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    #[serde(alias = "column")]
    pub field: String,
    pub operator: FilterOperator,
    #[serde(alias = "value")]
    pub operand: Operand,
    #[serde(default, alias = "condition")]
    pub combinator: Combinator,
}

impl FilterPredicate {
    pub fn new(field: &str, operator: FilterOperator, operand: impl Into<Operand>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            operand: operand.into(),
            combinator: Combinator::And,
        }
    }
}

/// Inclusive time window. The window is only applied when both ends are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Both ends present, so the window restricts anything
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Current filter/selection configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub selected_platforms: IndexSet<String>,
    #[serde(default)]
    pub selected_sentiments: IndexSet<String>,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default, alias = "filters")]
    pub predicates: Vec<FilterPredicate>,
}

impl ViewState {
    /// Apply a partial update. Absent fields are left untouched.
    pub fn apply(&mut self, update: ViewUpdate) {
        if let Some(platforms) = update.selected_platforms {
            self.selected_platforms = platforms.into_iter().collect();
        }
        if let Some(sentiments) = update.selected_sentiments {
            self.selected_sentiments = sentiments.into_iter().collect();
        }
        if let Some(range) = update.date_range {
            self.date_range = range;
        }
        if let Some(predicates) = update.predicates {
            self.predicates = predicates;
        }
    }

    /// Drop predicates and set selections, keeping the date range
    pub fn clear_filters(&mut self) {
        self.predicates.clear();
        self.selected_platforms.clear();
        self.selected_sentiments.clear();
    }
}

/// Partial view update as accepted by `RecordStore::set_view`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate {
    pub selected_platforms: Option<Vec<String>>,
    pub selected_sentiments: Option<Vec<String>>,
    pub date_range: Option<DateRange>,
    pub predicates: Option<Vec<FilterPredicate>>,
}
