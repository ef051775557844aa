//! # menuforge-sheets: Spreadsheet Sampler Plugin
//!
//! This crate provides the content sampling logic for spreadsheet documents
//! as a self-contained plugin for the `menuforge` pipeline. It implements the
//! `DocumentSampler` trait from the core library, handles Google Sheets share
//! links by rewriting them to their CSV export form, and flattens rows into
//! the `header: value` listing the extraction prompts expect.

use async_trait::async_trait;
use menuforge::sample::{resolve_content, ContentSample, DocumentSampler, SampleError};
use menuforge::types::{DocumentContent, DocumentRef, MediaType};
use regex::Regex;
use thiserror::Error;
use tracing::info;

// --- Error Definitions ---

#[derive(Error, Debug, Clone)]
pub enum SheetError {
    #[error("Invalid Google Sheet URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to fetch sheet: {0}")]
    Fetch(String),
    #[error("Failed to read CSV content: {0}")]
    Csv(String),
}

impl From<reqwest::Error> for SheetError {
    fn from(err: reqwest::Error) -> Self {
        SheetError::Fetch(err.to_string())
    }
}

/// A helper to convert the specific `SheetError` into the generic
/// `menuforge::sample::SampleError`.
impl From<SheetError> for SampleError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::InvalidUrl(msg) | SheetError::Fetch(msg) => SampleError::Fetch(msg),
            SheetError::Csv(msg) => SampleError::Parse(msg),
        }
    }
}

// --- Public Helper Functions ---

/// Transforms a Google Sheet share URL into a CSV export URL.
pub fn construct_export_url(url_str: &str, gid: Option<&str>) -> Result<String, SheetError> {
    let parsed_url =
        reqwest::Url::parse(url_str).map_err(|e| SheetError::InvalidUrl(format!("{e}")))?;

    let re = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9-_]+)")
        .map_err(|e| SheetError::InvalidUrl(format!("Regex compilation failed: {e}")))?;
    let caps = re.captures(parsed_url.path()).ok_or_else(|| {
        SheetError::InvalidUrl("Could not find sheet ID in URL path.".to_string())
    })?;

    let sheet_id = caps
        .get(1)
        .map(|m| m.as_str())
        .ok_or_else(|| SheetError::InvalidUrl("Sheet ID capture group is missing.".to_string()))?;

    // Local hosts are kept as-is so tests can serve the export endpoint.
    let base_url = match parsed_url.host_str() {
        Some("127.0.0.1") | Some("localhost") => {
            format!("{}://{}", parsed_url.scheme(), parsed_url.authority())
        }
        _ => "https://docs.google.com".to_string(),
    };
    let mut export_url = format!("{base_url}/spreadsheets/d/{sheet_id}/export?format=csv");

    if let Some(gid_val) = gid {
        if !gid_val.is_empty() {
            export_url.push_str(&format!("&gid={gid_val}"));
        }
    }

    Ok(export_url)
}

/// Downloads the content of a sheet's CSV export as a string.
pub async fn download_csv(export_url: &str) -> Result<String, SheetError> {
    info!("Fetching sheet CSV from: {export_url}");
    let response = reqwest::get(export_url).await?;
    if !response.status().is_success() {
        return Err(SheetError::Fetch(format!(
            "Request failed with status: {}",
            response.status()
        )));
    }
    response.text().await.map_err(SheetError::from)
}

/// Excel workbooks are zip (`.xlsx`) or OLE2 (`.xls`) containers; decoding
/// them as CSV text would feed mojibake to the extraction prompts.
fn is_binary_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0])
}

/// Flattens CSV rows into one `header: value, header: value` line per row.
/// Empty cells are omitted; output stops after `max_rows` data rows.
pub fn rows_to_text(csv_content: &str, max_rows: usize) -> Result<String, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| SheetError::Csv(e.to_string()))?
        .clone();

    let mut out = String::new();
    for (index, record) in reader.records().enumerate() {
        if index >= max_rows {
            out.push_str("... (remaining rows omitted)\n");
            break;
        }
        let record = record.map_err(|e| SheetError::Csv(e.to_string()))?;
        let line = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(header, value)| format!("{}: {}", header.trim(), value.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        if !line.is_empty() {
            out.push_str(&line);
            out.push('\n');
        }
    }
    Ok(out)
}

// --- DocumentSampler Implementation ---

/// The `DocumentSampler` implementation for spreadsheets.
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetSampler {
    /// Ceiling on the number of data rows flattened into the sample.
    pub max_rows: usize,
}

impl Default for SpreadsheetSampler {
    fn default() -> Self {
        Self { max_rows: 500 }
    }
}

#[async_trait]
impl DocumentSampler for SpreadsheetSampler {
    fn media(&self) -> MediaType {
        MediaType::Spreadsheet
    }

    async fn sample(&self, doc: &DocumentRef) -> Result<ContentSample, SampleError> {
        let csv_content = match &doc.content {
            DocumentContent::Remote(url) if url.contains("/spreadsheets/d/") => {
                let export_url = construct_export_url(url, None)?;
                download_csv(&export_url).await?
            }
            _ => {
                let bytes = resolve_content(doc).await?;
                if is_binary_workbook(&bytes) {
                    return Err(SampleError::Parse(format!(
                        "Spreadsheet '{}' is a binary Excel workbook; export it as CSV first",
                        doc.name
                    )));
                }
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };

        let text = rows_to_text(&csv_content, self.max_rows)?;
        if text.trim().is_empty() {
            return Err(SampleError::Parse(format!(
                "Spreadsheet '{}' contains no data rows",
                doc.name
            )));
        }

        Ok(ContentSample {
            text: Some(text),
            image: None,
        })
    }
}
