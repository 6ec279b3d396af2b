// Ingestion edge - turns CSV text, JSON rows and remote sheets into raw rows

pub mod decode;
pub mod quality;
pub mod sheets;

pub use decode::{decode_csv, decode_json_rows};
pub use quality::{inspect, DataIssue, DataQualityReport};
pub use sheets::{sheet_export_url, SheetImporter};

use crate::error::{AppError, AppResult};
use crate::models::RawRow;

/// Reject a decoded batch with no data rows
pub fn require_rows(rows: Vec<RawRow>) -> AppResult<Vec<RawRow>> {
    if rows.is_empty() {
        return Err(AppError::BadRequest("The uploaded data contains no rows".to_string()));
    }
    Ok(rows)
}
