//! # Document Sampling
//!
//! The pluggable layer that turns a `DocumentRef` into oracle-ready content:
//! a text sample, an image payload, or both. Format-specific samplers (PDF,
//! spreadsheet) live in their own plugin crates and implement
//! [`DocumentSampler`]; the raster-image passthrough is built in here since
//! it needs no parsing.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::providers::ai::ImagePayload;
use crate::types::{DocumentContent, DocumentRef, MediaType};

/// A generic error type for all sampler plugins.
///
/// Each plugin maps its specific failures (PDF parse error, CSV error, HTTP
/// error) into these variants so the pipeline can treat any unreadable
/// document uniformly: log it and move on.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("No sampler registered for media type: {0}")]
    Unsupported(String),

    #[error("Failed to fetch document content: {0}")]
    Fetch(String),

    #[error("Failed to parse document content: {0}")]
    Parse(String),

    #[error("An unexpected internal error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Oracle-ready content extracted from one document.
#[derive(Debug, Clone, Default)]
pub struct ContentSample {
    pub text: Option<String>,
    pub image: Option<ImagePayload>,
}

impl ContentSample {
    /// The text portion, truncated to at most `max_chars` characters.
    /// Used by the scoping pass, which only needs a bounded look.
    pub fn bounded_text(&self, max_chars: usize) -> Option<String> {
        self.text
            .as_ref()
            .map(|t| t.chars().take(max_chars).collect())
    }
}

/// The contract for a media-specific sampler plugin.
#[async_trait]
pub trait DocumentSampler: Send + Sync {
    /// The media type this sampler handles.
    fn media(&self) -> MediaType;

    /// Produces oracle-ready content for one document.
    async fn sample(&self, doc: &DocumentRef) -> Result<ContentSample, SampleError>;
}

/// Registry mapping media types to their samplers.
#[derive(Default)]
pub struct SamplerSet {
    samplers: HashMap<MediaType, Arc<dyn DocumentSampler>>,
}

impl SamplerSet {
    /// An empty registry. Most callers want [`SamplerSet::with_defaults`]
    /// plus the format plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in image sampler.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(Arc::new(ImageSampler));
        set
    }

    pub fn register(&mut self, sampler: Arc<dyn DocumentSampler>) {
        self.samplers.insert(sampler.media(), sampler);
    }

    /// Samples one document with the registered sampler for its media type.
    pub async fn sample(&self, doc: &DocumentRef) -> Result<ContentSample, SampleError> {
        let sampler = self
            .samplers
            .get(&doc.media)
            .ok_or_else(|| SampleError::Unsupported(format!("{:?}", doc.media)))?;
        sampler.sample(doc).await
    }
}

// --- Content resolution helpers ---

/// Resolves a fetchable location into raw bytes.
pub async fn fetch_document_bytes(url: &str) -> Result<Vec<u8>, SampleError> {
    info!("Fetching document content from: {url}");
    let response = reqwest::get(url)
        .await
        .map_err(|e| SampleError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(SampleError::Fetch(format!(
            "Request failed with status: {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SampleError::Fetch(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Returns the document's bytes, fetching them when not already inline.
pub async fn resolve_content(doc: &DocumentRef) -> Result<Vec<u8>, SampleError> {
    match &doc.content {
        DocumentContent::Inline(bytes) => Ok(bytes.clone()),
        DocumentContent::Remote(url) => fetch_document_bytes(url).await,
    }
}

// --- Built-in image passthrough ---

/// Sampler for raster images: no parsing, just a base64 payload with a MIME
/// type guessed from the file extension.
pub struct ImageSampler;

fn image_mime_type(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl DocumentSampler for ImageSampler {
    fn media(&self) -> MediaType {
        MediaType::Image
    }

    async fn sample(&self, doc: &DocumentRef) -> Result<ContentSample, SampleError> {
        let bytes = resolve_content(doc).await?;
        if bytes.is_empty() {
            return Err(SampleError::Parse(format!(
                "Image document '{}' is empty",
                doc.name
            )));
        }
        Ok(ContentSample {
            text: None,
            image: Some(ImagePayload {
                mime_type: image_mime_type(&doc.name).to_string(),
                data_base64: general_purpose::STANDARD.encode(&bytes),
            }),
        })
    }
}
