//! # Modifier/Size Enrichment Engine
//!
//! Phase 3: three expert-tier analyses over the aggregated item set and the
//! original document content, followed by a local attachment pass.
//!
//! 1. Global modifiers: one pass over full document content for menu-wide
//!    options.
//! 2. Item-level modifiers: one pass per category grouping over extracted
//!    item names and descriptions.
//! 3. Size standardization: the local vocabulary rules feed one oracle call
//!    that returns a canonical, price-ordered ladder.
//!
//! Each analysis degrades to empty output on oracle failure; enrichment never
//! aborts the run.

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::cost::{CostTracker, OracleTier};
use crate::pipeline::{responses, sizes, PipelineConfig};
use crate::prompts::enrichment::{
    GLOBAL_MODIFIER_SYSTEM_PROMPT, GLOBAL_MODIFIER_USER_PROMPT, ITEM_MODIFIER_SYSTEM_PROMPT,
    ITEM_MODIFIER_USER_PROMPT, SIZE_STANDARDIZATION_SYSTEM_PROMPT,
    SIZE_STANDARDIZATION_USER_PROMPT,
};
use crate::providers::ai::{OracleProvider, OracleRequest};
use crate::types::{CoreLineItem, EnrichedMenuItem, ModifierGroup, SizeOption};

/// The enrichment engine's combined output.
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    pub items: Vec<EnrichedMenuItem>,
    pub global_modifiers: Vec<ModifierGroup>,
    pub standardized_sizes: Vec<SizeOption>,
}

/// Whether a modifier group applies to an item by category or explicit name.
/// A group with no applicability lists is menu-wide.
fn applies_to(group: &ModifierGroup, item: &CoreLineItem) -> bool {
    if group
        .applies_to_items
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&item.name))
    {
        return true;
    }
    if group
        .applies_to_categories
        .iter()
        .any(|cat| cat.eq_ignore_ascii_case(&item.category))
    {
        return true;
    }
    group.applies_to_items.is_empty() && group.applies_to_categories.is_empty()
}

/// Attaches standardized sizes and applicable modifier groups to every item.
/// Item-level groups carry the category they were derived from, so a group
/// without explicit applicability still only reaches its own category.
pub fn attach_metadata(
    items: Vec<CoreLineItem>,
    global_modifiers: &[ModifierGroup],
    item_modifiers: &[(String, ModifierGroup)],
    ladder: &[SizeOption],
) -> Vec<EnrichedMenuItem> {
    items
        .into_iter()
        .map(|item| {
            let mut enriched = EnrichedMenuItem::bare(item);
            let mut attached_names: Vec<String> = Vec::new();

            if !ladder.is_empty() && sizes::suggests_size_variation(&enriched.item) {
                enriched.sizes = ladder.to_vec();
            }

            for group in global_modifiers {
                if applies_to(group, &enriched.item) {
                    let key = group.name.to_lowercase();
                    if !attached_names.contains(&key) {
                        attached_names.push(key);
                        enriched.modifier_groups.push(group.clone());
                    }
                }
            }

            for (category, group) in item_modifiers {
                let in_scope = applies_to(group, &enriched.item)
                    && (!group.applies_to_items.is_empty()
                        || !group.applies_to_categories.is_empty()
                        || category.eq_ignore_ascii_case(&enriched.item.category));
                if in_scope {
                    let key = group.name.to_lowercase();
                    if !attached_names.contains(&key) {
                        attached_names.push(key);
                        enriched.modifier_groups.push(group.clone());
                    }
                }
            }

            enriched
        })
        .collect()
}

async fn analyze_global_modifiers(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    document_text: &str,
) -> Vec<ModifierGroup> {
    if document_text.trim().is_empty() {
        return Vec::new();
    }
    let user_prompt = GLOBAL_MODIFIER_USER_PROMPT.replace("{documents}", document_text);
    let request = OracleRequest::text(
        GLOBAL_MODIFIER_SYSTEM_PROMPT,
        &user_prompt,
        config.enrichment_output_tokens,
    );
    cost.record(OracleTier::Expert);
    match oracle.generate(request).await {
        Ok(raw) => match responses::parse_modifier_groups(&raw) {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Global modifier response failed validation, skipping: {e}");
                Vec::new()
            }
        },
        Err(e) => {
            warn!("Global modifier call failed, skipping: {e}");
            Vec::new()
        }
    }
}

async fn analyze_item_modifiers(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    items: &[CoreLineItem],
) -> Vec<(String, ModifierGroup)> {
    let mut by_category: BTreeMap<&str, Vec<&CoreLineItem>> = BTreeMap::new();
    for item in items {
        by_category.entry(item.category.as_str()).or_default().push(item);
    }

    let mut collected = Vec::new();
    for (category, members) in by_category {
        let listing = members
            .iter()
            .map(|item| match &item.description {
                Some(description) => {
                    format!("- {} ({}): {}\n", item.name, item.base_price, description)
                }
                None => format!("- {} ({})\n", item.name, item.base_price),
            })
            .collect::<String>();
        let user_prompt = ITEM_MODIFIER_USER_PROMPT
            .replace("{category}", category)
            .replace("{items}", &listing);
        let request = OracleRequest::text(
            ITEM_MODIFIER_SYSTEM_PROMPT,
            &user_prompt,
            config.enrichment_output_tokens,
        );
        cost.record(OracleTier::Expert);
        match oracle.generate(request).await {
            Ok(raw) => match responses::parse_modifier_groups(&raw) {
                Ok(groups) => {
                    collected.extend(groups.into_iter().map(|g| (category.to_string(), g)))
                }
                Err(e) => warn!(
                    "Item modifier response for category '{category}' failed validation, skipping: {e}"
                ),
            },
            Err(e) => warn!("Item modifier call for category '{category}' failed, skipping: {e}"),
        }
    }
    collected
}

async fn standardize_sizes(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    items: &[CoreLineItem],
) -> Vec<SizeOption> {
    let vocabulary = sizes::collect_vocabulary(items);
    if vocabulary.is_empty() {
        info!("No size vocabulary found, skipping size standardization");
        return Vec::new();
    }
    let user_prompt =
        SIZE_STANDARDIZATION_USER_PROMPT.replace("{vocabulary}", &vocabulary.join(", "));
    let request = OracleRequest::text(
        SIZE_STANDARDIZATION_SYSTEM_PROMPT,
        &user_prompt,
        config.enrichment_output_tokens,
    );
    cost.record(OracleTier::Expert);
    match oracle.generate(request).await {
        Ok(raw) => match responses::parse_size_ladder(&raw) {
            Ok(ladder) => ladder,
            Err(e) => {
                warn!("Size ladder response failed validation, skipping: {e}");
                Vec::new()
            }
        },
        Err(e) => {
            warn!("Size standardization call failed, skipping: {e}");
            Vec::new()
        }
    }
}

/// Runs all three analyses and attaches their output to the item set.
pub async fn enrich(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    document_text: &str,
    items: Vec<CoreLineItem>,
) -> EnrichmentOutcome {
    if items.is_empty() {
        return EnrichmentOutcome::default();
    }

    let global_modifiers = analyze_global_modifiers(oracle, cost, config, document_text).await;
    let item_modifiers = analyze_item_modifiers(oracle, cost, config, &items).await;
    let standardized_sizes = standardize_sizes(oracle, cost, config, &items).await;

    info!(
        "Enrichment found {} global groups, {} item-level groups, {} size rungs",
        global_modifiers.len(),
        item_modifiers.len(),
        standardized_sizes.len()
    );

    let enriched = attach_metadata(items, &global_modifiers, &item_modifiers, &standardized_sizes);
    EnrichmentOutcome {
        items: enriched,
        global_modifiers,
        standardized_sizes,
    }
}
