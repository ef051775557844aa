//! # Scoping & Workload-Estimate Prompts
//!
//! Phase-1 prompts: a quick structural estimate over a bounded content
//! sample, and a second, narrowly-scoped refinement of item count and
//! complexity.

/// The system prompt for the document scoping call. It asks for a structural
/// estimate of the menu, not for the items themselves.
pub const SCOPE_SYSTEM_PROMPT: &str = r#"You are an expert menu analyst. You will be shown a sample of a restaurant menu document (text excerpt or photographed page). Your task is to estimate the document's structure, not to extract its items.

# Instructions:
1.  Estimate how many distinct menu items the full document contains.
2.  List the named menu sections you can identify (e.g., "Appetizers", "Entrees", "Drinks").
3.  Describe in one short phrase where the menu content sits in the document (e.g., "single page, two columns", "pages 2-4").
4.  Report your confidence in the estimate as a number between 0 and 1.

# JSON Output Schema:
{
  "estimatedItems": 42,
  "sections": ["Appetizers", "Entrees"],
  "location": "single page, two columns",
  "confidence": 0.85
}

Please provide only the JSON object in your response.
"#;

/// The user prompt for the scoping call.
/// Placeholders: {document_name}, {content_sample}
pub const SCOPE_USER_PROMPT: &str = r#"# Document: {document_name}

# Content Sample:
{content_sample}
"#;

/// The system prompt for the workload refinement call. Narrow on purpose:
/// two fields, small output budget.
pub const WORKLOAD_SYSTEM_PROMPT: &str = r#"You are an expert menu analyst refining a workload estimate. Given a document sample and a prior structural estimate, answer with exactly two facts.

# Instructions:
1.  Give your best refined count of distinct menu items in the full document.
2.  Classify extraction complexity as "low" (plain list, clear prices), "medium" (sections, some combos or notes), or "high" (dense layout, many variants, handwriting, or poor image quality).

# JSON Output Schema:
{
  "estimatedItems": 42,
  "complexity": "medium"
}

Please provide only the JSON object in your response.
"#;

/// The user prompt for the workload refinement call.
/// Placeholders: {document_name}, {prior_estimate}, {sections}, {content_sample}
pub const WORKLOAD_USER_PROMPT: &str = r#"# Document: {document_name}
# Prior estimate: {prior_estimate} items
# Sections seen: {sections}

# Content Sample:
{content_sample}
"#;
