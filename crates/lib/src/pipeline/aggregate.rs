//! # Result Aggregator
//!
//! Merges successful task outputs into one core-item list, stripping
//! segment-numbering artifacts from source locations so the same physical
//! document always reports a single clean location. Failed tasks are logged
//! and surfaced, never fatal.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::types::{CoreLineItem, ExtractionTask, TaskFailure, TaskResult};

fn segment_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s*\(Part \d+/\d+\)\s*$").expect("segment suffix pattern is static and valid")
    })
}

/// Removes any trailing `" (Part i/N)"` segment numbering from a location
/// string. Idempotent: stripping loops until no suffix remains, so re-running
/// aggregation never accumulates or leaves artifacts.
pub fn strip_segment_suffix(location: &str) -> String {
    let mut current = location.to_string();
    loop {
        let stripped = segment_suffix().replace(&current, "").into_owned();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

/// Concatenates items from successful results and collects failure records
/// for the rest. `tasks` supplies human-readable labels for failures.
pub fn merge_results(
    tasks: &[ExtractionTask],
    results: &[TaskResult],
) -> (Vec<CoreLineItem>, Vec<TaskFailure>) {
    let mut items = Vec::new();
    let mut failures = Vec::new();

    for result in results {
        if result.success {
            items.extend(result.items.iter().map(|item| {
                let mut item = item.clone();
                item.source.location = strip_segment_suffix(&item.source.location);
                item
            }));
        } else {
            let label = tasks
                .iter()
                .find(|t| t.id == result.task_id)
                .map(|t| t.label())
                .unwrap_or_default();
            warn!(
                "Task {} ('{label}') contributed no items: {}",
                result.task_id,
                result.error.as_deref().unwrap_or("unknown error")
            );
            failures.push(TaskFailure {
                task_id: result.task_id.clone(),
                label,
                error: result.error.clone().unwrap_or_default(),
                retries: result.retries_used,
            });
        }
    }

    info!(
        "Aggregated {} items from {} successful tasks ({} failed)",
        items.len(),
        results.iter().filter(|r| r.success).count(),
        failures.len()
    );
    (items, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceInfo;
    use std::time::Duration;

    fn result(task_id: &str, success: bool, locations: &[&str]) -> TaskResult {
        TaskResult {
            task_id: task_id.to_string(),
            items: locations
                .iter()
                .enumerate()
                .map(|(i, loc)| CoreLineItem {
                    name: format!("Item {i}"),
                    base_price: "$1.00".to_string(),
                    description: None,
                    category: "Mains".to_string(),
                    source: SourceInfo {
                        filename: "menu.pdf".to_string(),
                        location: loc.to_string(),
                    },
                })
                .collect(),
            oracle_calls: 1,
            retries_used: 0,
            elapsed: Duration::from_millis(10),
            success,
            error: if success {
                None
            } else {
                Some("low yield".to_string())
            },
        }
    }

    #[test]
    fn segment_suffixes_are_stripped() {
        assert_eq!(strip_segment_suffix("page 2 (Part 1/3)"), "page 2");
        assert_eq!(strip_segment_suffix("page 2"), "page 2");
        // Doubly-suffixed input still collapses to the clean location.
        assert_eq!(
            strip_segment_suffix("page 2 (Part 1/3) (Part 2/3)"),
            "page 2"
        );
    }

    #[test]
    fn aggregation_is_idempotent() {
        let results = vec![
            result("t1", true, &["page 1 (Part 1/2)", "page 1 (Part 2/2)"]),
            result("t2", true, &["single page"]),
        ];
        let (first, _) = merge_results(&[], &results);
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|i| !i.source.location.contains("(Part")));

        // Feed the cleaned items back through: identical output.
        let rerun = vec![TaskResult {
            items: first.clone(),
            ..result("t1", true, &[])
        }];
        let (second, _) = merge_results(&[], &rerun);
        assert_eq!(first, second);
    }

    #[test]
    fn failed_tasks_become_failure_records_not_errors() {
        let results = vec![result("t1", true, &["page 1"]), result("t2", false, &[])];
        let (items, failures) = merge_results(&[], &results);
        assert_eq!(items.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].task_id, "t2");
        assert_eq!(failures[0].error, "low yield");
    }
}
