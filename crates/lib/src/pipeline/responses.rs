//! # Oracle Response Validation
//!
//! One strict parser per oracle call site. Every parser first strips markdown
//! code fences, then deserializes into a typed shape; a response that fails
//! validation is a defined parse failure, never a partially-typed value.

use serde::Deserialize;

use crate::types::{Complexity, ModifierGroup, SizeOption};

/// Strips surrounding whitespace and ```json fences from a raw oracle
/// response, returning the payload the parsers operate on.
pub fn clean_json_response(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_prefix
        .strip_suffix("```")
        .unwrap_or(without_prefix)
        .trim()
}

// --- Call-site shapes ---

/// The scoping call's required shape. `estimatedItems`, `sections` and
/// `location` are mandatory; a response missing any of them is rejected.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScopeResponse {
    pub estimated_items: u32,
    pub sections: Vec<String>,
    pub location: String,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    0.5
}

/// The workload refinement call's shape.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadResponse {
    pub estimated_items: u32,
    pub complexity: Complexity,
}

/// One extracted line item as the oracle reports it, before source
/// attribution is attached.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_price: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub source_file: Option<String>,
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

// --- Parsers ---

pub fn parse_scope_estimate(raw: &str) -> Result<ScopeResponse, serde_json::Error> {
    serde_json::from_str(clean_json_response(raw))
}

pub fn parse_workload_estimate(raw: &str) -> Result<WorkloadResponse, serde_json::Error> {
    serde_json::from_str(clean_json_response(raw))
}

pub fn parse_core_items(raw: &str) -> Result<Vec<RawLineItem>, serde_json::Error> {
    serde_json::from_str(clean_json_response(raw))
}

pub fn parse_modifier_groups(raw: &str) -> Result<Vec<ModifierGroup>, serde_json::Error> {
    serde_json::from_str(clean_json_response(raw))
}

pub fn parse_size_ladder(raw: &str) -> Result<Vec<SizeOption>, serde_json::Error> {
    serde_json::from_str(clean_json_response(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModifierKind;

    #[test]
    fn clean_strips_fences_and_whitespace() {
        assert_eq!(clean_json_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json_response("```\n[]\n```"), "[]");
        assert_eq!(clean_json_response("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn scope_requires_core_fields() {
        let ok = parse_scope_estimate(
            r#"{"estimatedItems": 40, "sections": ["Mains"], "location": "page 1"}"#,
        )
        .unwrap();
        assert_eq!(ok.estimated_items, 40);
        assert!((ok.confidence - 0.5).abs() < f32::EPSILON);

        // Missing `location` is a parse failure, not a partial value.
        assert!(parse_scope_estimate(r#"{"estimatedItems": 40, "sections": []}"#).is_err());
    }

    #[test]
    fn workload_parses_complexity_tier() {
        let refined =
            parse_workload_estimate(r#"{"estimatedItems": 80, "complexity": "high"}"#).unwrap();
        assert_eq!(refined.complexity, Complexity::High);
        assert!(parse_workload_estimate(r#"{"estimatedItems": 80}"#).is_err());
    }

    #[test]
    fn items_default_missing_optional_fields() {
        let items = parse_core_items(
            r#"```json
            [{"name": "Burger", "basePrice": "$8.00"}]
            ```"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "Uncategorized");
        assert!(items[0].source_file.is_none());
    }

    #[test]
    fn modifier_groups_require_a_kind() {
        let groups = parse_modifier_groups(
            r#"[{"name": "Add Protein", "kind": "addon", "options": [{"name": "Chicken", "priceDelta": "$3.00"}], "appliesToCategories": ["Salads"]}]"#,
        )
        .unwrap();
        assert_eq!(groups[0].kind, ModifierKind::Addon);
        assert_eq!(groups[0].options[0].price_delta.as_deref(), Some("$3.00"));
        assert!(parse_modifier_groups(r#"[{"name": "Mystery"}]"#).is_err());
    }

    #[test]
    fn size_ladder_allows_null_prices() {
        let ladder =
            parse_size_ladder(r#"[{"name": "Small", "price": null}, {"name": "Large", "price": "$5.00"}]"#)
                .unwrap();
        assert_eq!(ladder.len(), 2);
        assert!(ladder[0].price.is_none());
        assert_eq!(ladder[1].price.as_deref(), Some("$5.00"));
    }
}
