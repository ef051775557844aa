//! # menuforge-pdf: PDF Sampler Plugin
//!
//! This crate provides the content sampling logic for PDF documents, acting
//! as a plugin for the `menuforge` pipeline. It implements the
//! `DocumentSampler` trait from the core library.

use async_trait::async_trait;
use menuforge::sample::{resolve_content, ContentSample, DocumentSampler, SampleError};
use menuforge::types::{DocumentRef, MediaType};
use pdf::file::FileOptions;
use thiserror::Error;
use tracing::{instrument, warn};

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum PdfSampleError {
    #[error("Failed to parse PDF content: {0}")]
    Parse(String),
    #[error("PDF contains no extractable text")]
    Empty,
}

impl From<PdfSampleError> for SampleError {
    fn from(err: PdfSampleError) -> Self {
        SampleError::Parse(err.to_string())
    }
}

// --- Core Extraction Logic ---

/// Extracts text from all pages of a PDF synchronously.
pub fn extract_text_from_pdf(pdf_data: &[u8]) -> Result<String, PdfSampleError> {
    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| PdfSampleError::Parse(e.to_string()))?;
    let resolver = file.resolver();
    let mut full_text = String::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| PdfSampleError::Parse(e.to_string()))?;
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| PdfSampleError::Parse(e.to_string()))?;
            for op in operations.iter() {
                if let pdf::content::Op::TextDraw { text } = op {
                    full_text.push_str(&text.to_string_lossy());
                    full_text.push(' ');
                }
            }
        }
        full_text.push('\n');
    }
    Ok(full_text)
}

// --- DocumentSampler Implementation ---

/// The `DocumentSampler` implementation for PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSampler;

#[async_trait]
impl DocumentSampler for PdfSampler {
    fn media(&self) -> MediaType {
        MediaType::Pdf
    }

    #[instrument(skip_all, fields(doc = %doc.name))]
    async fn sample(&self, doc: &DocumentRef) -> Result<ContentSample, SampleError> {
        let bytes = resolve_content(doc).await?;
        // The pdf crate is synchronous; keep the parse off the async runtime.
        let text = tokio::task::spawn_blocking(move || extract_text_from_pdf(&bytes))
            .await
            .map_err(|e| SampleError::Internal(anyhow::anyhow!("PDF parse task failed: {e}")))??;

        if text.trim().is_empty() {
            warn!("PDF '{}' produced no extractable text", doc.name);
            return Err(PdfSampleError::Empty.into());
        }

        Ok(ContentSample {
            text: Some(text),
            image: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = extract_text_from_pdf(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfSampleError::Parse(_)));
    }
}
