use async_trait::async_trait;
use menuforge::{OracleError, OracleProvider, OracleRequest};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Mock Oracle Provider ---

struct MockRule {
    system_key: String,
    user_key: Option<String>,
    response: Result<String, String>,
}

/// A mock oracle keyed on prompt substrings, with recorded call history and
/// an in-flight gauge for concurrency assertions. Rules are matched in
/// insertion order; the first rule whose keys match wins.
#[derive(Clone)]
pub struct MockOracleProvider {
    rules: Arc<Mutex<Vec<MockRule>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    latency: Duration,
}

impl Debug for MockOracleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockOracleProvider").finish_non_exhaustive()
    }
}

impl MockOracleProvider {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
        }
    }

    /// Adds artificial per-call latency so concurrency overlap is observable.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Pre-programs a response for calls whose system prompt contains `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        self.rules.lock().unwrap().push(MockRule {
            system_key: key.to_string(),
            user_key: None,
            response: Ok(response.to_string()),
        });
    }

    /// Pre-programs a response for calls matching both prompt substrings.
    pub fn add_response_for(&self, system_key: &str, user_key: &str, response: &str) {
        self.rules.lock().unwrap().push(MockRule {
            system_key: system_key.to_string(),
            user_key: Some(user_key.to_string()),
            response: Ok(response.to_string()),
        });
    }

    /// Pre-programs a hard failure for calls matching both prompt substrings.
    pub fn fail_for(&self, system_key: &str, user_key: &str, error: &str) {
        self.rules.lock().unwrap().push(MockRule {
            system_key: system_key.to_string(),
            user_key: Some(user_key.to_string()),
            response: Err(error.to_string()),
        });
    }

    /// Retrieves the recorded `(system_prompt, user_prompt)` calls.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// The highest number of simultaneously in-flight calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockOracleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OracleProvider for MockOracleProvider {
    async fn generate(&self, request: OracleRequest<'_>) -> Result<String, OracleError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.calls.lock().unwrap().push((
            request.system_prompt.to_string(),
            request.user_prompt.to_string(),
        ));

        let outcome = {
            let rules = self.rules.lock().unwrap();
            rules
                .iter()
                .find(|rule| {
                    request.system_prompt.contains(&rule.system_key)
                        && rule
                            .user_key
                            .as_deref()
                            .map(|key| request.user_prompt.contains(key))
                            .unwrap_or(true)
                })
                .map(|rule| rule.response.clone())
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(error)) => Err(OracleError::Api(error)),
            None => Err(OracleError::Api(format!(
                "MockOracleProvider: no response programmed for system prompt: '{}'",
                request.system_prompt.chars().take(60).collect::<String>()
            ))),
        }
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a simple, single-page PDF with the given text content,
    /// compatible with printpdf v0.8.2.
    pub fn generate_test_pdf(text: &str) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Test Menu");
        let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
        let layer_def = Layer::new("Layer 1");
        let layer_id = doc.add_layer(&layer_def);

        // Get the font bytes for a built-in font and parse it.
        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        let ops = vec![
            Op::BeginLayer {
                layer_id: layer_id.clone(),
            },
            Op::SetFontSize {
                size: Pt(12.0),
                font: font_id.clone(),
            },
            Op::StartTextSection,
            Op::SetTextMatrix {
                matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
            },
            Op::SetTextRenderingMode {
                mode: TextRenderingMode::Fill,
            },
            Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: font_id,
            },
            Op::EndTextSection,
            Op::EndLayer { layer_id },
        ];

        page.ops = ops;
        doc.pages.push(page);

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            eprintln!("PDF generation warnings: {warnings:?}");
        }

        Ok(bytes)
    }
}
