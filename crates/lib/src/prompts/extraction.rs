//! # Batch Extraction Prompts
//!
//! Phase-2 prompts used by the worker pool to pull core line items out of a
//! batch of documents or a segment of one large document.

/// The system prompt for the core item extraction call.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an expert menu data extraction agent. Extract every menu item from the provided document content into a JSON array.

# Instructions:
1.  Extract each distinct menu item exactly once.
2.  Keep prices as currency-formatted strings exactly as printed (e.g., "$8.00").
3.  Assign each item to the menu section it appears under; use "Uncategorized" when no section applies.
4.  Set "sourceFile" to the name of the document the item came from, as given in the content headers.
5.  Do not invent items that are not in the content. Do not extract modifiers or size variants as separate items.

# JSON Output Schema:
[
  {
    "name": "Classic Burger",
    "basePrice": "$8.00",
    "description": "Lettuce, tomato, onion.",
    "category": "Burgers",
    "sourceFile": "menu.pdf"
  }
]

Please provide only the JSON array in your response.
"#;

/// The user prompt for whole-document-group extraction.
/// Placeholder: {documents}
pub const EXTRACTION_USER_PROMPT: &str = r#"# Documents to Extract:
{documents}
"#;

/// The user prompt for a single segment of one large document. The segment
/// note steers the model toward one slice of the menu so that sibling
/// segments do not overlap.
/// Placeholders: {segment_label}, {segment_index}, {segment_count}, {estimated_items}, {documents}
pub const SEGMENT_USER_PROMPT: &str = r#"# Segment to Extract: {segment_label}
This document is being processed in {segment_count} segments. You are extracting segment {segment_index} of {segment_count}: roughly the corresponding portion of the menu, about {estimated_items} items. Skip items that belong to other segments.

# Documents to Extract:
{documents}
"#;
