//! # Deduplication & Normalization
//!
//! A single pass over enriched items: duplicate items (case-insensitive
//! `(category, name)` key after trimming) are dropped; modifier groups and
//! size options are canonicalized so the first occurrence of a lowercased
//! name wins and later occurrences reference it. Running the pass twice over
//! already-normalized data reports zero further changes.

use std::collections::HashMap;
use tracing::info;

use crate::types::{DedupStats, EnrichedMenuItem, ModifierGroup, SizeOption};

fn item_key(item: &EnrichedMenuItem) -> (String, String) {
    (
        item.item.category.trim().to_lowercase(),
        item.item.name.trim().to_lowercase(),
    )
}

/// Collapses duplicates and canonicalizes shared metadata.
pub fn normalize(items: Vec<EnrichedMenuItem>) -> (Vec<EnrichedMenuItem>, DedupStats) {
    let mut stats = DedupStats::default();
    let mut seen_items: HashMap<(String, String), ()> = HashMap::new();
    let mut canonical_groups: HashMap<String, ModifierGroup> = HashMap::new();
    let mut canonical_sizes: HashMap<String, SizeOption> = HashMap::new();
    let mut output = Vec::with_capacity(items.len());

    for mut item in items {
        let key = item_key(&item);
        if seen_items.contains_key(&key) {
            stats.duplicates_removed += 1;
            continue;
        }
        seen_items.insert(key, ());

        for group in &mut item.modifier_groups {
            let name = group.name.trim().to_lowercase();
            match canonical_groups.get(&name) {
                Some(canonical) => {
                    if canonical != group {
                        *group = canonical.clone();
                        stats.modifiers_normalized += 1;
                    }
                }
                None => {
                    canonical_groups.insert(name, group.clone());
                }
            }
        }

        for size in &mut item.sizes {
            let name = size.name.trim().to_lowercase();
            match canonical_sizes.get(&name) {
                Some(canonical) => {
                    if canonical != size {
                        *size = canonical.clone();
                        stats.sizes_consolidated += 1;
                    }
                }
                None => {
                    canonical_sizes.insert(name, size.clone());
                }
            }
        }

        output.push(item);
    }

    info!(
        "Dedup removed {} duplicate items, consolidated {} sizes, normalized {} modifier groups",
        stats.duplicates_removed, stats.sizes_consolidated, stats.modifiers_normalized
    );
    (output, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CoreLineItem, ModifierKind, ModifierOption, SourceInfo};

    fn enriched(name: &str, category: &str) -> EnrichedMenuItem {
        EnrichedMenuItem::bare(CoreLineItem {
            name: name.to_string(),
            base_price: "$5.00".to_string(),
            description: None,
            category: category.to_string(),
            source: SourceInfo {
                filename: "menu.pdf".to_string(),
                location: "page 1".to_string(),
            },
        })
    }

    fn group(name: &str, option: &str) -> ModifierGroup {
        ModifierGroup {
            name: name.to_string(),
            kind: ModifierKind::Choice,
            options: vec![ModifierOption {
                name: option.to_string(),
                price_delta: None,
                is_default: false,
            }],
            applies_to_categories: vec![],
            applies_to_items: vec![],
        }
    }

    #[test]
    fn duplicate_items_are_dropped_case_insensitively() {
        let items = vec![
            enriched("Classic Burger", "Burgers"),
            enriched("  classic burger ", "BURGERS"),
            enriched("Classic Burger", "Sandwiches"),
        ];
        let (kept, stats) = normalize(items);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn divergent_groups_collapse_to_the_first_occurrence() {
        let mut a = enriched("Salad A", "Salads");
        a.modifier_groups.push(group("Dressing", "Ranch"));
        let mut b = enriched("Salad B", "Salads");
        b.modifier_groups.push(group("dressing", "Caesar"));

        let (kept, stats) = normalize(vec![a, b]);
        assert_eq!(stats.modifiers_normalized, 1);
        assert_eq!(kept[0].modifier_groups[0], kept[1].modifier_groups[0]);
        assert_eq!(kept[1].modifier_groups[0].options[0].name, "Ranch");
    }

    #[test]
    fn divergent_sizes_collapse_to_the_first_occurrence() {
        let mut a = enriched("Coffee", "Drinks");
        a.sizes.push(SizeOption {
            name: "Large".to_string(),
            price: Some("$4.00".to_string()),
        });
        let mut b = enriched("Tea", "Drinks");
        b.sizes.push(SizeOption {
            name: "large".to_string(),
            price: None,
        });

        let (kept, stats) = normalize(vec![a, b]);
        assert_eq!(stats.sizes_consolidated, 1);
        assert_eq!(kept[1].sizes[0].price.as_deref(), Some("$4.00"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut a = enriched("Salad A", "Salads");
        a.modifier_groups.push(group("Dressing", "Ranch"));
        let mut b = enriched("Salad B", "Salads");
        b.modifier_groups.push(group("dressing", "Caesar"));
        b.sizes.push(SizeOption {
            name: "Large".to_string(),
            price: None,
        });

        let (first, first_stats) = normalize(vec![a, b]);
        assert!(first_stats.modifiers_normalized > 0);

        let (second, second_stats) = normalize(first.clone());
        assert_eq!(second, first);
        assert_eq!(second_stats, DedupStats::default());
    }
}
