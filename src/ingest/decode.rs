use csv::ReaderBuilder;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{RawRow, RawValue};

/// Decode header-first CSV text. Every cell stays text; short records leave
/// their trailing columns null and extra cells are ignored. Blank records are skipped.
pub fn decode_csv(text: &str) -> AppResult<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut row = RawRow::new();
        for (index, header) in headers.iter().enumerate() {
            match record.get(index) {
                Some(cell) => row.insert(header, cell),
                None => row.insert(header, RawValue::Null),
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Decode a JSON array of objects. Numbers stay numbers.
pub fn decode_json_rows(value: Value) -> AppResult<Vec<RawRow>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AppError::DecodeError(format!(
                "expected an array of rows, found {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(RawRow::from(map)),
            other => Err(AppError::DecodeError(format!(
                "row {} is {}, expected an object",
                index,
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
