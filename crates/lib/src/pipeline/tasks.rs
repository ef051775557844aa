//! # Task Builder
//!
//! Converts per-document workload estimates into a prioritized list of
//! bounded extraction tasks: segment tasks for documents that must split, and
//! greedily grouped whole-document batches for everything else. Tasks come
//! out sorted by descending priority so the heaviest work is dispatched first
//! under the pool's limited concurrency.

use std::sync::Arc;
use uuid::Uuid;

use crate::pipeline::PipelineConfig;
use crate::types::{
    BatchDocument, BatchKind, Complexity, DocumentRef, ExtractionBatch, ExtractionTask,
    MediaType, ScopeEstimate, WorkloadEstimate,
};

/// One document that survived scoping and estimation.
#[derive(Debug, Clone)]
pub struct ScopedDocument {
    pub doc: Arc<DocumentRef>,
    pub scope: ScopeEstimate,
    pub workload: WorkloadEstimate,
}

/// Priority: complexity weight times a capped item factor. A scheduling
/// heuristic only; correctness never depends on dispatch order.
pub fn priority_score(complexity: Complexity, estimated_items: u32) -> f64 {
    complexity.weight() * (estimated_items as f64 / 10.0).min(5.0)
}

/// Output-token budget for one task, clamped to the hard cap regardless of
/// the computed multipliers.
pub fn token_budget(
    config: &PipelineConfig,
    complexity: Complexity,
    estimated_items: u32,
    is_segment: bool,
) -> u32 {
    let item_multiplier = 1.0 + (estimated_items as f64 / 50.0).min(2.0);
    let segment_bonus = if is_segment { 1.2 } else { 1.0 };
    let raw = config.base_output_tokens as f64
        * complexity.budget_multiplier()
        * item_multiplier
        * segment_bonus;
    (raw as u32).min(config.token_budget_cap)
}

/// Splits `total` into `parts` shares that sum exactly to `total`, with the
/// remainder spread over the leading shares.
fn item_shares(total: u32, parts: u32) -> Vec<u32> {
    let base = total / parts;
    let remainder = total % parts;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

fn segment_tasks(scoped: &ScopedDocument, config: &PipelineConfig) -> Vec<ExtractionTask> {
    let n = scoped.workload.split_count;
    let shares = item_shares(scoped.workload.estimated_items, n);
    shares
        .into_iter()
        .enumerate()
        .map(|(idx, share)| {
            let label = format!("{} (Part {}/{})", scoped.scope.location, idx + 1, n);
            let batch = ExtractionBatch {
                id: Uuid::new_v4().to_string(),
                kind: BatchKind::DocumentSegment,
                documents: vec![BatchDocument {
                    doc: scoped.doc.clone(),
                    location: scoped.scope.location.clone(),
                    estimated_items: share,
                }],
                estimated_items: share,
                segment_label: Some(label),
            };
            ExtractionTask {
                id: Uuid::new_v4().to_string(),
                priority: priority_score(scoped.workload.complexity, share),
                max_retries: scoped.workload.complexity.max_retries(),
                token_budget: token_budget(config, scoped.workload.complexity, share, true),
                batch,
            }
        })
        .collect()
}

fn group_task(group: &[&ScopedDocument], config: &PipelineConfig) -> ExtractionTask {
    let estimated_items: u32 = group.iter().map(|s| s.workload.estimated_items).sum();
    let complexity = group
        .iter()
        .map(|s| s.workload.complexity)
        .max()
        .unwrap_or(Complexity::Medium);
    let batch = ExtractionBatch {
        id: Uuid::new_v4().to_string(),
        kind: BatchKind::DocumentGroup,
        documents: group
            .iter()
            .map(|s| BatchDocument {
                doc: s.doc.clone(),
                location: s.scope.location.clone(),
                estimated_items: s.workload.estimated_items,
            })
            .collect(),
        estimated_items,
        segment_label: None,
    };
    ExtractionTask {
        id: Uuid::new_v4().to_string(),
        priority: priority_score(complexity, estimated_items),
        max_retries: complexity.max_retries(),
        token_budget: token_budget(config, complexity, estimated_items, false),
        batch,
    }
}

/// Builds the full prioritized task list.
pub fn build_tasks(
    scoped: &[ScopedDocument],
    config: &PipelineConfig,
) -> Vec<ExtractionTask> {
    let mut tasks = Vec::new();
    let mut pending_group: Vec<&ScopedDocument> = Vec::new();
    let mut pending_items: u32 = 0;
    let mut pending_has_image = false;

    for entry in scoped {
        if entry.workload.should_split {
            // Splitting documents always get dedicated tasks; a split count
            // of one still means the document is too complex to share a
            // batch with its neighbors.
            if entry.workload.split_count > 1 {
                tasks.extend(segment_tasks(entry, config));
            } else {
                tasks.push(group_task(&[entry], config));
            }
            continue;
        }

        // Greedy first-fit grouping in input order, bounded by the per-task
        // item ceiling. An extraction request carries a single image payload,
        // so two image documents never share a batch.
        let is_image = entry.doc.media == MediaType::Image;
        if !pending_group.is_empty()
            && (pending_items + entry.workload.estimated_items > config.max_items_per_task
                || (is_image && pending_has_image))
        {
            tasks.push(group_task(&pending_group, config));
            pending_group.clear();
            pending_items = 0;
            pending_has_image = false;
        }
        pending_items += entry.workload.estimated_items;
        pending_has_image |= is_image;
        pending_group.push(entry);
    }
    if !pending_group.is_empty() {
        tasks.push(group_task(&pending_group, config));
    }

    tasks.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;

    fn scoped(id: &str, items: u32, complexity: Complexity, ceiling: u32) -> ScopedDocument {
        scoped_media(id, items, complexity, ceiling, MediaType::Pdf)
    }

    fn scoped_media(
        id: &str,
        items: u32,
        complexity: Complexity,
        ceiling: u32,
        media: MediaType,
    ) -> ScopedDocument {
        let ext = match media {
            MediaType::Pdf => "pdf",
            MediaType::Spreadsheet => "csv",
            MediaType::Image => "jpg",
        };
        let (should_split, split_count) =
            crate::pipeline::estimate::split_decision(items, complexity, ceiling);
        ScopedDocument {
            doc: Arc::new(DocumentRef::inline(
                id,
                format!("{id}.{ext}"),
                media,
                vec![1],
            )),
            scope: ScopeEstimate {
                document_id: id.to_string(),
                estimated_items: items,
                sections: vec!["Mains".to_string()],
                location: format!("{id} menu"),
                confidence: 0.9,
            },
            workload: WorkloadEstimate {
                document_id: id.to_string(),
                estimated_items: items,
                complexity,
                should_split,
                split_count,
            },
        }
    }

    #[test]
    fn splitting_document_yields_numbered_segments_covering_the_estimate() {
        let config = PipelineConfig::default();
        let entry = scoped("big", 160, Complexity::High, config.max_items_per_task);
        assert_eq!(entry.workload.split_count, 3);

        let tasks = build_tasks(&[entry], &config);
        assert_eq!(tasks.len(), 3);

        let total: u32 = tasks.iter().map(|t| t.batch.estimated_items).sum();
        assert_eq!(total, 160);

        let mut labels: Vec<String> = tasks
            .iter()
            .map(|t| t.batch.segment_label.clone().unwrap())
            .collect();
        labels.sort();
        assert_eq!(
            labels,
            vec![
                "big menu (Part 1/3)",
                "big menu (Part 2/3)",
                "big menu (Part 3/3)"
            ]
        );
        assert!(tasks.iter().all(|t| t.batch.kind == BatchKind::DocumentSegment));
        assert!(tasks.iter().all(|t| t.max_retries == 5));
    }

    #[test]
    fn small_documents_are_grouped_under_the_ceiling() {
        let config = PipelineConfig::default();
        let entries: Vec<_> = (0..4)
            .map(|i| scoped(&format!("d{i}"), 30, Complexity::Low, config.max_items_per_task))
            .collect();

        let tasks = build_tasks(&entries, &config);
        // 30+30 fits under 75, a third 30 does not: two docs, two docs.
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.batch.kind == BatchKind::DocumentGroup));
        assert!(tasks
            .iter()
            .all(|t| t.batch.estimated_items <= config.max_items_per_task));
        let docs: usize = tasks.iter().map(|t| t.batch.documents.len()).sum();
        assert_eq!(docs, 4);
    }

    #[test]
    fn image_documents_never_share_a_batch() {
        let config = PipelineConfig::default();
        let ceiling = config.max_items_per_task;
        let entries = vec![
            scoped_media("photo1", 10, Complexity::Low, ceiling, MediaType::Image),
            scoped_media("photo2", 10, Complexity::Low, ceiling, MediaType::Image),
        ];

        // Well under the item ceiling, yet each photo must carry its own
        // task so both image payloads reach the oracle.
        let tasks = build_tasks(&entries, &config);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.batch.documents.len() == 1));
        let mut ids: Vec<&str> = tasks
            .iter()
            .map(|t| t.batch.documents[0].doc.id.as_str())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["photo1", "photo2"]);
    }

    #[test]
    fn an_image_may_share_a_batch_with_text_documents() {
        let config = PipelineConfig::default();
        let ceiling = config.max_items_per_task;
        let entries = vec![
            scoped_media("photo", 10, Complexity::Low, ceiling, MediaType::Image),
            scoped("menu", 10, Complexity::Low, ceiling),
        ];
        let tasks = build_tasks(&entries, &config);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].batch.documents.len(), 2);
    }

    #[test]
    fn high_complexity_document_is_never_grouped() {
        let config = PipelineConfig::default();
        let entries = vec![
            scoped("a", 10, Complexity::Low, config.max_items_per_task),
            scoped("b", 20, Complexity::High, config.max_items_per_task),
            scoped("c", 10, Complexity::Low, config.max_items_per_task),
        ];
        let tasks = build_tasks(&entries, &config);
        let solo = tasks
            .iter()
            .find(|t| t.batch.documents.len() == 1 && t.batch.documents[0].doc.id == "b")
            .expect("high-complexity doc should sit in its own task");
        assert_eq!(solo.max_retries, 5);
    }

    #[test]
    fn tasks_are_sorted_by_descending_priority() {
        let config = PipelineConfig::default();
        let entries = vec![
            scoped("small", 5, Complexity::Low, config.max_items_per_task),
            scoped("big", 160, Complexity::High, config.max_items_per_task),
        ];
        let tasks = build_tasks(&entries, &config);
        for pair in tasks.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        assert!(tasks[0].batch.kind == BatchKind::DocumentSegment);
    }

    #[test]
    fn priority_caps_the_item_factor() {
        assert_eq!(priority_score(Complexity::Low, 20), 2.0);
        assert_eq!(priority_score(Complexity::High, 500), 10.0);
        assert_eq!(priority_score(Complexity::Medium, 10), 1.5);
    }

    #[test]
    fn token_budget_is_clamped_to_the_hard_cap() {
        let config = PipelineConfig::default();
        let capped = token_budget(&config, Complexity::High, 10_000, true);
        assert_eq!(capped, config.token_budget_cap);

        let modest = token_budget(&config, Complexity::Low, 10, false);
        assert!(modest < config.token_budget_cap);
        assert!(modest >= config.base_output_tokens);
    }

    #[test]
    fn item_shares_cover_the_total_exactly() {
        assert_eq!(item_shares(160, 3), vec![54, 53, 53]);
        assert_eq!(item_shares(75, 5), vec![15, 15, 15, 15, 15]);
        let shares = item_shares(7, 3);
        assert_eq!(shares.iter().sum::<u32>(), 7);
    }
}
