#![allow(dead_code)]
//! # Common Test Utilities
//!
//! The shared mock oracle lives in `menuforge-test-utils`; this module adds
//! the sampler stub the pipeline tests need to run fully offline.

use async_trait::async_trait;
use menuforge::{ContentSample, DocumentRef, DocumentSampler, MediaType, SampleError};
use std::sync::Once;

pub use menuforge_test_utils::MockOracleProvider;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

/// A sampler that serves fixed text for any document of its media type.
pub struct StaticSampler {
    media: MediaType,
    text: String,
}

impl StaticSampler {
    pub fn new(media: MediaType, text: &str) -> Self {
        Self {
            media,
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl DocumentSampler for StaticSampler {
    fn media(&self) -> MediaType {
        self.media
    }

    async fn sample(&self, _doc: &DocumentRef) -> Result<ContentSample, SampleError> {
        Ok(ContentSample {
            text: Some(self.text.clone()),
            image: None,
        })
    }
}
