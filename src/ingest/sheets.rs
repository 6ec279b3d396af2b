// Remote sheet import - Google Sheets URL to CSV export, fetched with supersession
//
// Every fetch takes a ticket. A result whose ticket is no longer the latest is
// discarded, so only the most recent import request lands in the store.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use super::decode::decode_csv;
use crate::error::{AppError, AppResult};
use crate::models::RawRow;

static SHEET_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").unwrap());

/// Map a sheet URL onto its CSV export URL
pub fn sheet_export_url(url: &str) -> AppResult<String> {
    let sheet_id = SHEET_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::Validation(format!("Invalid Google Sheets URL: {}", url)))?;
    Ok(format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
        sheet_id
    ))
}

pub struct SheetImporter {
    client: Client,
    latest: AtomicU64,
}

impl SheetImporter {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            latest: AtomicU64::new(0),
        })
    }

    /// Start a new request; earlier tickets become stale
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Fetch and decode a sheet. `Ok(None)` means a newer import superseded this one.
    pub async fn fetch(&self, url: &str) -> AppResult<Option<Vec<RawRow>>> {
        let export_url = sheet_export_url(url)?;
        let ticket = self.begin();
        debug!("Fetching sheet: ticket={} url={}", ticket, export_url);

        let response = self.client.get(&export_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::FetchError(format!(
                "Failed to fetch Google Sheet data: status={}",
                response.status()
            )));
        }
        let text = response.text().await?;

        if !self.is_current(ticket) {
            info!("Discarding superseded sheet import: ticket={}", ticket);
            return Ok(None);
        }

        let rows = decode_csv(&text)?;
        info!("Fetched sheet: ticket={} rows={}", ticket, rows.len());
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=0";
        assert_eq!(
            sheet_export_url(url).unwrap(),
            "https://docs.google.com/spreadsheets/d/1AbC-d_9/export?format=csv"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            sheet_export_url("https://example.com/sheet"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_later_ticket_supersedes() {
        let importer = SheetImporter::new(Duration::from_secs(5)).unwrap();
        let first = importer.begin();
        assert!(importer.is_current(first));
        let second = importer.begin();
        assert!(!importer.is_current(first));
        assert!(importer.is_current(second));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_url_before_network() {
        let importer = SheetImporter::new(Duration::from_secs(5)).unwrap();
        assert!(importer.fetch("not a sheet").await.is_err());
        // A rejected URL never takes a ticket
        let ticket = importer.begin();
        assert_eq!(ticket, 1);
    }
}
