//! # Adaptive Multi-Phase Extraction Pipeline
//!
//! Orchestrates the full run: scoping, workload estimation, task building,
//! concurrent extraction, aggregation, enrichment, dedup, and cost reporting.
//! Failures stay local: unreadable documents are skipped and exhausted tasks
//! become failure records, so a run always completes with whatever was
//! successfully extracted.

pub mod aggregate;
pub mod dedup;
pub mod enrich;
pub mod estimate;
pub mod pool;
pub mod responses;
pub mod scope;
pub mod sizes;
pub mod tasks;
pub mod truncation;

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

pub use aggregate::strip_segment_suffix;
pub use estimate::split_decision;
pub use responses::clean_json_response;
pub use tasks::{priority_score, token_budget};
pub use truncation::{detect_truncation, TruncationWarning};

use crate::cost::{CostBreakdown, CostMetrics, CostRates, CostTracker};
use crate::providers::ai::OracleProvider;
use crate::sample::SamplerSet;
use crate::types::{
    BatchingStats, DocumentRef, MediaType, PipelineOutput, ScopeEstimate,
};
use pool::SampleCache;
use tasks::ScopedDocument;

/// Tunable knobs for one pipeline instance. Defaults match the documented
/// behavior; callers override via struct update syntax.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Worker pool size.
    pub concurrency: usize,
    /// Per-task item ceiling driving split decisions and batch grouping.
    pub max_items_per_task: u32,
    /// Character bound on the text sample shown to the scoping pass.
    pub scope_sample_chars: usize,
    /// Output budget for the scoping call.
    pub scope_output_tokens: u32,
    /// Output budget for the workload refinement call. Small on purpose.
    pub estimate_output_tokens: u32,
    /// Base output budget that the task builder scales per task.
    pub base_output_tokens: u32,
    /// Hard cap on any task's output budget, regardless of multipliers.
    pub token_budget_cap: u32,
    /// Output budget for the enrichment analyses.
    pub enrichment_output_tokens: u32,
    /// A successful parse yielding fewer than this fraction of the estimate
    /// is retried rather than accepted.
    pub low_yield_ratio: f64,
    /// The low-yield check only applies when the estimate exceeds this.
    pub low_yield_min_estimate: u32,
    /// First retry delay; doubles per attempt.
    pub backoff_base: Duration,
    /// Ceiling on the retry delay.
    pub backoff_cap: Duration,
    /// Price constants for the cost breakdown.
    pub rates: CostRates,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_items_per_task: 75,
            scope_sample_chars: 4000,
            scope_output_tokens: 512,
            estimate_output_tokens: 256,
            base_output_tokens: 2048,
            token_budget_cap: 8192,
            enrichment_output_tokens: 2048,
            low_yield_ratio: 0.3,
            low_yield_min_estimate: 10,
            backoff_base: Duration::from_millis(500),
            backoff_cap: Duration::from_secs(4),
            rates: CostRates::default(),
        }
    }
}

/// The extraction pipeline: two oracle tiers, a sampler registry, and a
/// configuration. One instance can run many document sets; cost counters are
/// created fresh per run.
pub struct Pipeline {
    fast: Box<dyn OracleProvider>,
    expert: Box<dyn OracleProvider>,
    samplers: SamplerSet,
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    pub fn new(
        fast: Box<dyn OracleProvider>,
        expert: Box<dyn OracleProvider>,
        samplers: SamplerSet,
    ) -> Self {
        Self {
            fast,
            expert,
            samplers,
            config: Arc::new(PipelineConfig::default()),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline over an ordered document collection.
    ///
    /// Never fails outright: unreadable documents and exhausted tasks are
    /// reported in the output rather than aborting the run.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn run(&self, documents: Vec<DocumentRef>) -> PipelineOutput {
        let started = Instant::now();
        let cost = Arc::new(CostTracker::new());
        let docs: Vec<Arc<DocumentRef>> = documents.into_iter().map(Arc::new).collect();
        let image_count = docs.iter().filter(|d| d.media == MediaType::Image).count() as u32;

        // --- Phase 1: sampling, scoping, workload estimation ---
        let mut samples: SampleCache = HashMap::new();
        let mut scoped: Vec<ScopedDocument> = Vec::new();
        let mut scope_index: Vec<ScopeEstimate> = Vec::new();
        let mut skipped = 0u32;

        for doc in &docs {
            let sample = match self.samplers.sample(doc).await {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Skipping unreadable document '{}': {e}", doc.name);
                    skipped += 1;
                    continue;
                }
            };
            let Some(scope) =
                scope::analyze_document(self.fast.as_ref(), &cost, &self.config, doc, &sample)
                    .await
            else {
                skipped += 1;
                continue;
            };
            let workload = estimate::refine_workload(
                self.fast.as_ref(),
                &cost,
                &self.config,
                doc,
                &scope,
                &sample,
            )
            .await;
            info!(
                "Scoped '{}': ~{} items, {:?} complexity, split into {}",
                doc.name, workload.estimated_items, workload.complexity, workload.split_count
            );
            scope_index.push(scope.clone());
            samples.insert(doc.id.clone(), sample);
            scoped.push(ScopedDocument {
                doc: doc.clone(),
                scope,
                workload,
            });
        }

        // --- Phase 2: task building and concurrent extraction ---
        let task_list = Arc::new(tasks::build_tasks(&scoped, &self.config));
        let tasks_built = task_list.len() as u32;
        let samples = Arc::new(samples);
        let results = pool::execute_tasks(
            self.fast.clone(),
            cost.clone(),
            self.config.clone(),
            task_list.clone(),
            samples.clone(),
        )
        .await;
        let (core_items, failures) = aggregate::merge_results(&task_list, &results);

        // --- Phase 3: enrichment and normalization ---
        let document_text: String = scoped
            .iter()
            .filter_map(|entry| {
                samples
                    .get(&entry.doc.id)
                    .and_then(|sample| sample.text.as_deref())
                    .map(|text| format!("## File: {}\n{text}\n", entry.doc.name))
            })
            .collect();
        let outcome = enrich::enrich(
            self.expert.as_ref(),
            &cost,
            &self.config,
            &document_text,
            core_items.clone(),
        )
        .await;
        let (enriched_items, dedup_stats) = dedup::normalize(outcome.items);

        let batching = BatchingStats {
            documents_analyzed: scoped.len() as u32,
            documents_skipped: skipped,
            tasks_built,
            tasks_succeeded: results.iter().filter(|r| r.success).count() as u32,
            tasks_failed: failures.len() as u32,
        };
        let metrics = CostMetrics::from_tracker(
            &cost,
            docs.len() as u32,
            image_count,
            enriched_items.len() as u32,
            started.elapsed(),
        );
        let cost_breakdown = CostBreakdown::derive(&metrics, &self.config.rates);
        info!(
            "Pipeline complete: {} items, {} fast + {} expert calls, {} failed tasks",
            enriched_items.len(),
            metrics.fast_calls,
            metrics.expert_calls,
            batching.tasks_failed
        );

        PipelineOutput {
            scope_index,
            core_items,
            batching,
            enriched_items,
            global_modifiers: outcome.global_modifiers,
            standardized_sizes: outcome.standardized_sizes,
            failures,
            dedup: dedup_stats,
            cost: metrics,
            cost_breakdown,
            completed_at: Utc::now(),
        }
    }
}
