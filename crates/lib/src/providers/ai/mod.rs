pub mod gemini;
pub mod local;

use crate::errors::OracleError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// An inline image attachment for multimodal oracle calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// e.g. `"image/jpeg"`.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
}

/// A single oracle invocation: prompts, an optional image, and the caller's
/// output budget and temperature.
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'a> {
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    pub image: Option<&'a ImagePayload>,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl<'a> OracleRequest<'a> {
    /// A text-only request.
    pub fn text(system_prompt: &'a str, user_prompt: &'a str, max_output_tokens: u32) -> Self {
        Self {
            system_prompt,
            user_prompt,
            image: None,
            max_output_tokens,
            temperature: 0.1,
        }
    }

    pub fn with_image(mut self, image: Option<&'a ImagePayload>) -> Self {
        self.image = image;
        self
    }
}

/// A trait for invoking a generative oracle service.
///
/// This defines a common interface over different model backends (Gemini,
/// local OpenAI-compatible servers). The pipeline holds two implementations:
/// a fast/cheap tier for scoping and bulk extraction, and a higher-capability
/// tier for modifier and size analysis.
#[async_trait]
pub trait OracleProvider: Send + Sync + Debug + DynClone {
    /// Sends one request and returns the generated text, which is expected to
    /// contain a JSON payload matching the calling site's schema.
    async fn generate(&self, request: OracleRequest<'_>) -> Result<String, OracleError>;
}

dyn_clone::clone_trait_object!(OracleProvider);
