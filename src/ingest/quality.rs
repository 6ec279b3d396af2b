// Data quality inspection for a decoded batch, shown before it is ingested

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::RawRow;

pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataIssue {
    MissingValues,
    DuplicateRows,
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::MissingValues => write!(f, "Contains missing values"),
            DataIssue::DuplicateRows => write!(f, "Contains duplicate rows"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    pub rows: usize,
    /// Column names of the first row
    pub columns: Vec<String>,
    pub preview: Vec<RawRow>,
    pub issues: Vec<DataIssue>,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn inspect(rows: &[RawRow]) -> DataQualityReport {
    let columns = rows
        .first()
        .map(|row| row.columns().cloned().collect())
        .unwrap_or_default();

    let mut issues = Vec::new();
    if rows.iter().any(|row| row.iter().any(|(_, value)| !value.is_present())) {
        issues.push(DataIssue::MissingValues);
    }
    if has_duplicates(rows) {
        issues.push(DataIssue::DuplicateRows);
    }

    DataQualityReport {
        rows: rows.len(),
        columns,
        preview: rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        issues,
    }
}

/// Two rows are duplicates when they serialize identically, column order included
fn has_duplicates(rows: &[RawRow]) -> bool {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| serde_json::to_string(row).ok())
        .any(|key| !seen.insert(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_batch() {
        let rows = vec![
            RawRow::new().with("text", "a").with("likes", "1"),
            RawRow::new().with("text", "b").with("likes", "2"),
        ];
        let report = inspect(&rows);
        assert!(report.is_clean());
        assert_eq!(report.columns, vec!["text", "likes"]);
        assert_eq!(report.rows, 2);
    }

    #[test]
    fn test_missing_and_duplicates() {
        let row = RawRow::new().with("text", "a").with("likes", "");
        let report = inspect(&[row.clone(), row]);
        assert_eq!(report.issues, vec![DataIssue::MissingValues, DataIssue::DuplicateRows]);
        assert_eq!(report.issues[0].to_string(), "Contains missing values");
    }

    #[test]
    fn test_preview_is_capped() {
        let rows: Vec<RawRow> = (0..8).map(|i| RawRow::new().with("n", i as i64)).collect();
        let report = inspect(&rows);
        assert_eq!(report.preview.len(), PREVIEW_ROWS);
        assert_eq!(report.rows, 8);
    }

    #[test]
    fn test_empty_batch() {
        let report = inspect(&[]);
        assert!(report.columns.is_empty());
        assert!(report.is_clean());
    }
}
