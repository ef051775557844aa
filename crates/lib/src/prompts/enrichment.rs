//! # Enrichment Prompts
//!
//! Phase-3 prompts for the expert-tier analyses: menu-wide modifiers,
//! per-category item-level modifiers, and size standardization.

/// The system prompt for the global modifier pass over full document content.
pub const GLOBAL_MODIFIER_SYSTEM_PROMPT: &str = r#"You are an expert menu analyst looking for menu-wide customization options. Scan the full document content for options that apply across many items, such as "add protein to any salad" or "make any burger a double".

# Instructions:
1.  Identify each menu-wide option group: its name, its kind ("size", "addon", or "choice"), and its selectable options with price deltas where printed.
2.  For each group, list the menu categories it applies to. Leave "appliesToCategories" empty only if the group truly applies to the entire menu.
3.  Do not report options that are specific to a single item.

# JSON Output Schema:
[
  {
    "name": "Add Protein",
    "kind": "addon",
    "options": [
      { "name": "Grilled Chicken", "priceDelta": "$3.00", "isDefault": false }
    ],
    "appliesToCategories": ["Salads"],
    "appliesToItems": []
  }
]

Please provide only the JSON array in your response.
"#;

/// The user prompt for the global modifier pass.
/// Placeholder: {documents}
pub const GLOBAL_MODIFIER_USER_PROMPT: &str = r#"# Full Document Content:
{documents}
"#;

/// The system prompt for the item-level modifier pass, run once per category
/// grouping over already-extracted item names and descriptions.
pub const ITEM_MODIFIER_SYSTEM_PROMPT: &str = r#"You are an expert menu analyst looking for size and choice patterns embedded in extracted menu items. You will receive the items of one menu category.

# Instructions:
1.  Find modifier patterns embedded in item names or descriptions, such as "Small/Large", "choice of dressing", or "comes with a side".
2.  Report each as a group: name, kind ("size", "addon", or "choice"), and options with price deltas where stated.
3.  In "appliesToItems", list the exact item names the group applies to; in "appliesToCategories", list the category when the pattern holds for the whole category.

# JSON Output Schema:
[
  {
    "name": "Dressing Choice",
    "kind": "choice",
    "options": [
      { "name": "Ranch", "priceDelta": null, "isDefault": true }
    ],
    "appliesToCategories": [],
    "appliesToItems": ["Garden Salad", "Caesar Salad"]
  }
]

Please provide only the JSON array in your response.
"#;

/// The user prompt for the item-level modifier pass.
/// Placeholders: {category}, {items}
pub const ITEM_MODIFIER_USER_PROMPT: &str = r#"# Category: {category}

# Extracted Items:
{items}
"#;

/// The system prompt for size standardization. The raw vocabulary is found
/// by local pattern rules first; the oracle only normalizes it into one
/// canonical ladder.
pub const SIZE_STANDARDIZATION_SYSTEM_PROMPT: &str = r#"You are an expert menu analyst standardizing size options. You will receive the raw size vocabulary found across a menu (e.g., "sm", "large", "16 oz").

# Instructions:
1.  Merge synonyms and abbreviations into canonical size names (e.g., "sm" and "small" become "Small").
2.  Order the ladder from smallest to largest.
3.  Include a representative price for a rung only if one is given; otherwise use null.

# JSON Output Schema:
[
  { "name": "Small", "price": null },
  { "name": "Medium", "price": null },
  { "name": "Large", "price": null }
]

Please provide only the JSON array in your response.
"#;

/// The user prompt for size standardization.
/// Placeholder: {vocabulary}
pub const SIZE_STANDARDIZATION_USER_PROMPT: &str = r#"# Raw Size Vocabulary:
{vocabulary}
"#;
