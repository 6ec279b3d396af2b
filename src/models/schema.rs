use serde::{Deserialize, Serialize};

use crate::models::post::Post;
use crate::models::raw::{RawRow, RawValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Number,
}

impl ValueType {
    pub fn of(value: &RawValue) -> Self {
        if value.is_number() {
            ValueType::Number
        } else {
            ValueType::Text
        }
    }
}

/// One column observed in imported data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub name: String,
    pub value_type: ValueType,
    pub visible: bool,
}

impl ColumnSchema {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            visible: true,
        }
    }
}

/// Extend `columns` with every raw column not seen before.
/// The first row that carries a column decides its type. Returns how many were added.
pub fn merge_columns(columns: &mut Vec<ColumnSchema>, rows: &[RawRow]) -> usize {
    let before = columns.len();
    for row in rows {
        for (name, value) in row.iter() {
            if !columns.iter().any(|c| &c.name == name) {
                columns.push(ColumnSchema::new(name, ValueType::of(value)));
            }
        }
    }
    columns.len() - before
}

/// Columns for a loaded snapshot, taken from the canonical fields of its first post
pub fn columns_from_post(post: &Post) -> Vec<ColumnSchema> {
    let value = match serde_json::to_value(post) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => return Vec::new(),
    };
    value
        .iter()
        .map(|(name, v)| {
            let value_type = if v.is_number() { ValueType::Number } else { ValueType::Text };
            ColumnSchema::new(name, value_type)
        })
        .collect()
}
