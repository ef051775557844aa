//! # Size Vocabulary Rules
//!
//! An explicit set of regular-expression rules for spotting size vocabulary
//! in item names and descriptions. Kept separate from the enrichment logic so
//! the rules are independently testable; the oracle only ever sees the raw
//! vocabulary these rules collect.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::types::CoreLineItem;

fn size_rules() -> &'static Vec<Regex> {
    static RULES: OnceLock<Vec<Regex>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            // Named sizes: small/medium/large and common abbreviations.
            r"(?i)\b(x-?large|extra[- ]large|small|medium|large|regular|mini|jumbo|sm|med|lg|xl)\b",
            // Volume and weight units: "16 oz", "0.5 l", "500ml".
            r"(?i)\b\d+(\.\d+)?\s?(oz|ml|cl|l|liter|litre|gal|lb|lbs|g|kg)\b",
            // Piece counts: "6 pc", "12 pieces", "10 ct".
            r"(?i)\b\d+\s?(pc|pcs|piece|pieces|ct|count)\b",
            // Linear sizes: `10"`, "12 inch".
            r#"(?i)\b\d+\s?(inch|in|")"#,
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("size rule patterns are static and valid"))
        .collect()
    })
}

/// All size mentions found in a text, lowercased, in match order.
pub fn size_mentions(text: &str) -> Vec<String> {
    let mut mentions = Vec::new();
    for rule in size_rules() {
        for found in rule.find_iter(text) {
            mentions.push(found.as_str().to_lowercase());
        }
    }
    mentions
}

/// Whether an item's name or description suggests size variation.
/// Only such items receive the standardized size ladder.
pub fn suggests_size_variation(item: &CoreLineItem) -> bool {
    if !size_mentions(&item.name).is_empty() {
        return true;
    }
    item.description
        .as_deref()
        .map(|d| !size_mentions(d).is_empty())
        .unwrap_or(false)
}

/// The deduplicated size vocabulary across a whole item set, sorted for a
/// deterministic oracle prompt.
pub fn collect_vocabulary(items: &[CoreLineItem]) -> Vec<String> {
    let mut vocabulary = BTreeSet::new();
    for item in items {
        for mention in size_mentions(&item.name) {
            vocabulary.insert(mention);
        }
        if let Some(description) = &item.description {
            for mention in size_mentions(description) {
                vocabulary.insert(mention);
            }
        }
    }
    vocabulary.into_iter().collect()
}
