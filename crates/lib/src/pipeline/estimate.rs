//! # Workload Estimator
//!
//! Phase 1.5: a second, narrowly-scoped fast-tier call per document that
//! refines the item count and assigns a complexity tier, then decides whether
//! the document must be split into segments. Oracle failure falls back to a
//! conservative default so the run always proceeds.

use tracing::{debug, warn};

use crate::cost::{CostTracker, OracleTier};
use crate::pipeline::{responses, PipelineConfig};
use crate::prompts::scope::{WORKLOAD_SYSTEM_PROMPT, WORKLOAD_USER_PROMPT};
use crate::providers::ai::{OracleProvider, OracleRequest};
use crate::sample::ContentSample;
use crate::types::{Complexity, DocumentRef, ScopeEstimate, WorkloadEstimate};

/// Fallback used when the refinement call fails or does not validate.
const FALLBACK_ITEMS: u32 = 10;

/// The split decision: a document splits when its refined estimate exceeds
/// the per-task ceiling or its complexity is high. The split count always
/// covers the full estimate (`ceil(estimate / ceiling)`).
pub fn split_decision(estimated_items: u32, complexity: Complexity, ceiling: u32) -> (bool, u32) {
    let should_split = estimated_items > ceiling || complexity == Complexity::High;
    let split_count = if should_split {
        estimated_items.div_ceil(ceiling).max(1)
    } else {
        1
    };
    (should_split, split_count)
}

/// Refines one document's workload from its scope estimate.
pub async fn refine_workload(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    doc: &DocumentRef,
    scope: &ScopeEstimate,
    sample: &ContentSample,
) -> WorkloadEstimate {
    let content_sample = sample
        .bounded_text(config.scope_sample_chars)
        .unwrap_or_default();
    let user_prompt = WORKLOAD_USER_PROMPT
        .replace("{document_name}", &doc.name)
        .replace("{prior_estimate}", &scope.estimated_items.to_string())
        .replace("{sections}", &scope.sections.join(", "))
        .replace("{content_sample}", &content_sample);

    let request = OracleRequest::text(
        WORKLOAD_SYSTEM_PROMPT,
        &user_prompt,
        config.estimate_output_tokens,
    )
    .with_image(sample.image.as_ref());

    cost.record(OracleTier::Fast);
    let (estimated_items, complexity) = match oracle.generate(request).await {
        Ok(raw) => {
            debug!("Workload response for '{}': {}", doc.name, raw);
            match responses::parse_workload_estimate(&raw) {
                Ok(refined) => (refined.estimated_items, refined.complexity),
                Err(e) => {
                    warn!(
                        "Workload response for '{}' failed validation, using defaults: {e}",
                        doc.name
                    );
                    (FALLBACK_ITEMS, Complexity::Medium)
                }
            }
        }
        Err(e) => {
            warn!("Workload call failed for '{}', using defaults: {e}", doc.name);
            (FALLBACK_ITEMS, Complexity::Medium)
        }
    };

    let (should_split, split_count) =
        split_decision(estimated_items, complexity, config.max_items_per_task);
    WorkloadEstimate {
        document_id: doc.id.clone(),
        estimated_items,
        complexity,
        should_split,
        split_count,
    }
}
