//! Remote data source: the sheet's CSV export

use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::config::SheetConfig;
use super::models::{AppError, AppResult, Record};
use super::transport::SheetTransport;
use crate::parsers::csv_parser::parse_csv_with_stats;

pub struct SheetSource {
    csv_url: String,
    transport: Arc<dyn SheetTransport>,
}

impl SheetSource {
    pub fn new(config: &SheetConfig, transport: Arc<dyn SheetTransport>) -> Self {
        Self {
            csv_url: config.csv_url.trim().to_string(),
            transport,
        }
    }

    /// CSV export address of one tab of a Google spreadsheet
    pub fn csv_export_url(spreadsheet_id: &str, gid: &str) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
            spreadsheet_id, gid
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.csv_url.is_empty()
    }

    /// Download the export and parse it into records
    pub async fn fetch_records(&self) -> AppResult<Vec<Record>> {
        if !self.is_configured() {
            return Err(AppError::Config("No sheet CSV URL configured".to_string()));
        }

        let url = Url::parse(&self.csv_url)
            .map_err(|e| AppError::Config(format!("Invalid sheet CSV URL: {}", e)))?;

        debug!("Fetching sheet export from {}", url);
        let text = self.transport.get_text(&url).await?;
        let (records, stats) = parse_csv_with_stats(Some(&text));

        info!(
            "📥 Loaded {} records ({} blank rows skipped)",
            stats.parsed_rows, stats.skipped_rows
        );
        Ok(records)
    }

    /// Like [`fetch_records`](Self::fetch_records), but any failure is logged
    /// and reported as an empty sheet.
    pub async fn fetch_records_or_empty(&self) -> Vec<Record> {
        match self.fetch_records().await {
            Ok(records) => records,
            Err(e) => {
                error!("Error fetching sheet data: {}", e);
                Vec::new()
            }
        }
    }
}
