//! # Document Scoping Analyzer
//!
//! Phase 1: one quick fast-tier pass per document that estimates menu size
//! and structure from a bounded content sample. Documents whose sample or
//! oracle response cannot be used are logged and excluded from later phases
//! without aborting the run.

use tracing::{debug, warn};

use crate::cost::{CostTracker, OracleTier};
use crate::pipeline::{responses, PipelineConfig};
use crate::prompts::scope::{SCOPE_SYSTEM_PROMPT, SCOPE_USER_PROMPT};
use crate::providers::ai::{OracleProvider, OracleRequest};
use crate::sample::ContentSample;
use crate::types::{DocumentRef, ScopeEstimate};

/// Placeholder sample text for image-only documents, so the user prompt is
/// never empty even when the real content rides in the image payload.
const IMAGE_ONLY_SAMPLE: &str = "(photographed menu page attached as image)";

/// Runs the scoping call for one document. Returns `None` when the response
/// does not validate; the caller records the document as skipped.
pub async fn analyze_document(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    doc: &DocumentRef,
    sample: &ContentSample,
) -> Option<ScopeEstimate> {
    let content_sample = sample
        .bounded_text(config.scope_sample_chars)
        .unwrap_or_else(|| IMAGE_ONLY_SAMPLE.to_string());
    let user_prompt = SCOPE_USER_PROMPT
        .replace("{document_name}", &doc.name)
        .replace("{content_sample}", &content_sample);

    let request = OracleRequest::text(
        SCOPE_SYSTEM_PROMPT,
        &user_prompt,
        config.scope_output_tokens,
    )
    .with_image(sample.image.as_ref());

    cost.record(OracleTier::Fast);
    let raw = match oracle.generate(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Scoping call failed for '{}', skipping document: {e}", doc.name);
            return None;
        }
    };
    debug!("Scoping response for '{}': {}", doc.name, raw);

    match responses::parse_scope_estimate(&raw) {
        Ok(parsed) => Some(ScopeEstimate {
            document_id: doc.id.clone(),
            estimated_items: parsed.estimated_items,
            sections: parsed.sections,
            location: parsed.location,
            confidence: parsed.confidence.clamp(0.0, 1.0),
        }),
        Err(e) => {
            warn!(
                "Scoping response for '{}' failed validation, skipping document: {e}",
                doc.name
            );
            None
        }
    }
}
