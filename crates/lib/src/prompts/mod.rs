//! # Prompt Template Modules
//!
//! All prompt templates used by the extraction pipeline, organized by
//! pipeline phase. Each system prompt carries an explicit JSON output schema
//! that the matching parser in `pipeline::responses` validates against.

pub mod enrichment;
pub mod extraction;
pub mod scope;
