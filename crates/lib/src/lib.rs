//! # menuforge
//!
//! An adaptive multi-phase document extraction pipeline for restaurant-menu
//! digitization. A heterogeneous batch of uploaded documents (PDF,
//! spreadsheet, image) is scoped, partitioned into bounded extraction tasks,
//! run through a concurrent worker pool against a generative oracle, and
//! reconciled into a deduplicated catalog of menu items enriched with size
//! and modifier metadata, with per-tier cost accounting throughout.

pub mod cost;
pub mod errors;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod sample;
pub mod types;

pub use cost::{CostBreakdown, CostMetrics, CostRates, CostTracker, OracleTier};
pub use errors::OracleError;
pub use pipeline::{Pipeline, PipelineConfig};
pub use providers::ai::{ImagePayload, OracleProvider, OracleRequest};
pub use sample::{ContentSample, DocumentSampler, SampleError, SamplerSet};
pub use types::{
    CoreLineItem, DocumentContent, DocumentRef, EnrichedMenuItem, MediaType, PipelineOutput,
    SourceInfo,
};
