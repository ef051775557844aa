//! # Core Data Model
//!
//! The entities that flow through the extraction pipeline, from the caller's
//! `DocumentRef` input down to the final `EnrichedMenuItem` catalog. Types that
//! cross the oracle boundary or end up in the final JSON report use camelCase
//! field names on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cost::{CostBreakdown, CostMetrics};

// --- Input ---

/// The declared media kind of an uploaded source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Spreadsheet,
    Image,
}

impl MediaType {
    /// Infers a media type from a file extension, if it is one we support.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "csv" | "tsv" | "xls" | "xlsx" => Some(Self::Spreadsheet),
            "png" | "jpg" | "jpeg" | "webp" | "gif" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Where a document's bytes live.
#[derive(Debug, Clone)]
pub enum DocumentContent {
    /// Raw bytes supplied by the caller.
    Inline(Vec<u8>),
    /// A fetchable location (URL) resolved lazily by the sampler layer.
    Remote(String),
}

/// One uploaded source file. Immutable for the whole pipeline run.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
    pub media: MediaType,
    pub content: DocumentContent,
}

impl DocumentRef {
    pub fn inline(id: impl Into<String>, name: impl Into<String>, media: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            media,
            content: DocumentContent::Inline(bytes),
        }
    }

    pub fn remote(id: impl Into<String>, name: impl Into<String>, media: MediaType, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            media,
            content: DocumentContent::Remote(url.into()),
        }
    }
}

// --- Phase 1: scoping ---

/// The scoping analyzer's structural estimate for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeEstimate {
    pub document_id: String,
    pub estimated_items: u32,
    pub sections: Vec<String>,
    /// Free-text description of where the menu content sits in the document.
    pub location: String,
    /// Oracle self-reported confidence in `0.0..=1.0`.
    pub confidence: f32,
}

/// Complexity tier assigned by the workload estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Weight applied to the task priority score.
    pub fn weight(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 1.5,
            Self::High => 2.0,
        }
    }

    /// Multiplier applied to the base output-token budget.
    pub fn budget_multiplier(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 1.25,
            Self::High => 1.5,
        }
    }

    /// Retry budget for tasks carrying work of this complexity.
    pub fn max_retries(self) -> u32 {
        match self {
            Self::Low | Self::Medium => 3,
            Self::High => 5,
        }
    }
}

/// Refined per-document sizing, derived from a `ScopeEstimate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadEstimate {
    pub document_id: String,
    pub estimated_items: u32,
    pub complexity: Complexity,
    pub should_split: bool,
    pub split_count: u32,
}

// --- Phase 2: tasks ---

/// Whether a batch covers whole documents or a slice of one large document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchKind {
    DocumentGroup,
    DocumentSegment,
}

/// One document inside a batch, with the context the worker needs to
/// attribute extracted items back to it.
#[derive(Debug, Clone)]
pub struct BatchDocument {
    pub doc: Arc<DocumentRef>,
    /// Clean location string from the scoping pass (no segment numbering).
    pub location: String,
    pub estimated_items: u32,
}

/// A unit of extraction work. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExtractionBatch {
    pub id: String,
    pub kind: BatchKind,
    pub documents: Vec<BatchDocument>,
    pub estimated_items: u32,
    /// `"<location> (Part i/N)"` for segment batches.
    pub segment_label: Option<String>,
}

/// A schedulable wrapper around a batch.
#[derive(Debug, Clone)]
pub struct ExtractionTask {
    pub id: String,
    pub batch: ExtractionBatch,
    pub priority: f64,
    pub max_retries: u32,
    /// Output-size budget in tokens, already clamped to the hard cap.
    pub token_budget: u32,
}

impl ExtractionTask {
    /// Human-readable label for logs and failure reports.
    pub fn label(&self) -> String {
        match &self.batch.segment_label {
            Some(label) => label.clone(),
            None => self
                .batch
                .documents
                .iter()
                .map(|d| d.doc.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Terminal outcome of running one task through the worker pool.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task_id: String,
    pub items: Vec<CoreLineItem>,
    pub oracle_calls: u32,
    pub retries_used: u32,
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<String>,
}

// --- Extracted items ---

/// Attribution of an item back to its physical source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub filename: String,
    pub location: String,
}

/// One menu item before enrichment. Never mutated after extraction, only
/// wrapped by `EnrichedMenuItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreLineItem {
    pub name: String,
    /// Currency-formatted string as printed on the menu, e.g. `"$8.00"`.
    pub base_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub source: SourceInfo,
}

// --- Enrichment ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Size,
    Addon,
    Choice,
}

/// One selectable option within a modifier group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_delta: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// A named set of options, applicable to categories and/or named items.
/// Empty applicability lists mean the group applies menu-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierGroup {
    pub name: String,
    pub kind: ModifierKind,
    #[serde(default)]
    pub options: Vec<ModifierOption>,
    #[serde(default)]
    pub applies_to_categories: Vec<String>,
    #[serde(default)]
    pub applies_to_items: Vec<String>,
}

/// One rung of the standardized size ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// Final catalog entry: a core item plus attached size/modifier metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMenuItem {
    #[serde(flatten)]
    pub item: CoreLineItem,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<SizeOption>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifier_groups: Vec<ModifierGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl EnrichedMenuItem {
    pub fn bare(item: CoreLineItem) -> Self {
        Self {
            item,
            sizes: Vec::new(),
            modifier_groups: Vec::new(),
            variants: Vec::new(),
        }
    }
}

// --- Run summary ---

/// One task that exhausted its retries, surfaced in the final report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailure {
    pub task_id: String,
    pub label: String,
    pub error: String,
    pub retries: u32,
}

/// Counts describing how the workload was partitioned and executed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchingStats {
    pub documents_analyzed: u32,
    pub documents_skipped: u32,
    pub tasks_built: u32,
    pub tasks_succeeded: u32,
    pub tasks_failed: u32,
}

/// Counts reported by the dedup/normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupStats {
    pub duplicates_removed: u32,
    pub sizes_consolidated: u32,
    pub modifiers_normalized: u32,
}

/// The single value returned by a pipeline run: the scope index, the core and
/// enriched catalogs, failure listing, and the cost report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub scope_index: Vec<ScopeEstimate>,
    pub core_items: Vec<CoreLineItem>,
    pub batching: BatchingStats,
    pub enriched_items: Vec<EnrichedMenuItem>,
    pub global_modifiers: Vec<ModifierGroup>,
    pub standardized_sizes: Vec<SizeOption>,
    pub failures: Vec<TaskFailure>,
    pub dedup: DedupStats,
    pub cost: CostMetrics,
    pub cost_breakdown: CostBreakdown,
    pub completed_at: DateTime<Utc>,
}
