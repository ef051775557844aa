//! # Worker Pool Executor
//!
//! A fixed number of workers cooperatively pull tasks from a shared cursor
//! over the priority-sorted task list. Each task retries on transient
//! failures (truncation, malformed JSON, low yield) with capped exponential
//! backoff; a task that exhausts its budget reports failure locally and never
//! cancels sibling work.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cost::{CostTracker, OracleTier};
use crate::pipeline::truncation::detect_truncation;
use crate::pipeline::{responses, PipelineConfig};
use crate::prompts::extraction::{
    EXTRACTION_SYSTEM_PROMPT, EXTRACTION_USER_PROMPT, SEGMENT_USER_PROMPT,
};
use crate::providers::ai::{ImagePayload, OracleProvider, OracleRequest};
use crate::sample::ContentSample;
use crate::types::{CoreLineItem, ExtractionTask, SourceInfo, TaskResult};

/// Content samples keyed by document id, produced once in Phase 1 and shared
/// read-only across workers.
pub type SampleCache = HashMap<String, ContentSample>;

/// Runs every task to completion (success or exhausted failure) under the
/// configured concurrency ceiling.
pub async fn execute_tasks(
    oracle: Box<dyn OracleProvider>,
    cost: Arc<CostTracker>,
    config: Arc<PipelineConfig>,
    tasks: Arc<Vec<ExtractionTask>>,
    samples: Arc<SampleCache>,
) -> Vec<TaskResult> {
    let cursor = Arc::new(AtomicUsize::new(0));
    let worker_count = config.concurrency.max(1).min(tasks.len().max(1));
    info!(
        "Dispatching {} extraction tasks across {} workers",
        tasks.len(),
        worker_count
    );

    let workers: Vec<_> = (0..worker_count)
        .map(|worker_id| {
            let oracle = oracle.clone();
            let cost = cost.clone();
            let config = config.clone();
            let tasks = tasks.clone();
            let samples = samples.clone();
            let cursor = cursor.clone();
            tokio::spawn(async move {
                let mut results = Vec::new();
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= tasks.len() {
                        break;
                    }
                    let task = &tasks[index];
                    debug!(
                        "Worker {worker_id} picked task {} ('{}')",
                        task.id,
                        task.label()
                    );
                    results.push(run_task(oracle.as_ref(), &cost, &config, &samples, task).await);
                }
                results
            })
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for worker in join_all(workers).await {
        match worker {
            Ok(task_results) => results.extend(task_results),
            Err(e) => warn!("Extraction worker panicked: {e}"),
        }
    }
    results
}

/// Capped exponential backoff between retry attempts.
fn backoff_delay(config: &PipelineConfig, attempt: u32) -> Duration {
    let exp = config
        .backoff_base
        .saturating_mul(2u32.saturating_pow(attempt));
    exp.min(config.backoff_cap)
}

fn build_user_prompt(task: &ExtractionTask, samples: &SampleCache) -> String {
    let documents = task
        .batch
        .documents
        .iter()
        .map(|entry| {
            let text = samples
                .get(&entry.doc.id)
                .and_then(|s| s.text.as_deref())
                .unwrap_or("(content attached as image)");
            format!("## File: {}\n{}\n", entry.doc.name, text)
        })
        .collect::<String>();

    match &task.batch.segment_label {
        Some(label) => {
            // Segment index/count ride in the label ("... (Part i/N)"), so
            // recover them for the prompt rather than carrying extra fields.
            let (index, count) = parse_segment_numbering(label).unwrap_or((1, 1));
            SEGMENT_USER_PROMPT
                .replace("{segment_label}", label)
                .replace("{segment_index}", &index.to_string())
                .replace("{segment_count}", &count.to_string())
                .replace("{estimated_items}", &task.batch.estimated_items.to_string())
                .replace("{documents}", &documents)
        }
        None => EXTRACTION_USER_PROMPT.replace("{documents}", &documents),
    }
}

fn parse_segment_numbering(label: &str) -> Option<(u32, u32)> {
    let open = label.rfind("(Part ")?;
    let inner = &label[open + 6..label.len().checked_sub(1)?];
    let (index, count) = inner.split_once('/')?;
    Some((index.trim().parse().ok()?, count.trim().parse().ok()?))
}

fn first_image<'a>(task: &ExtractionTask, samples: &'a SampleCache) -> Option<&'a ImagePayload> {
    task.batch
        .documents
        .iter()
        .find_map(|entry| samples.get(&entry.doc.id).and_then(|s| s.image.as_ref()))
}

/// Attaches source attribution to a raw extracted item, resolving the
/// oracle's `sourceFile` hint against the batch members.
fn attribute_item(task: &ExtractionTask, raw: responses::RawLineItem) -> CoreLineItem {
    let matched = raw
        .source_file
        .as_deref()
        .and_then(|hint| {
            task.batch
                .documents
                .iter()
                .find(|entry| entry.doc.name.eq_ignore_ascii_case(hint))
        })
        .or_else(|| task.batch.documents.first());

    let (filename, location) = match matched {
        Some(entry) => (
            entry.doc.name.clone(),
            task.batch
                .segment_label
                .clone()
                .unwrap_or_else(|| entry.location.clone()),
        ),
        None => (String::new(), String::new()),
    };

    CoreLineItem {
        name: raw.name.trim().to_string(),
        base_price: raw.base_price,
        description: raw.description,
        category: raw.category,
        source: SourceInfo { filename, location },
    }
}

/// Runs one task through its retry budget, producing a terminal result.
async fn run_task(
    oracle: &dyn OracleProvider,
    cost: &CostTracker,
    config: &PipelineConfig,
    samples: &SampleCache,
    task: &ExtractionTask,
) -> TaskResult {
    let started = Instant::now();
    let user_prompt = build_user_prompt(task, samples);
    let image = first_image(task, samples);
    let mut oracle_calls = 0u32;
    let mut last_error = String::new();

    for attempt in 0..=task.max_retries {
        if attempt > 0 {
            sleep(backoff_delay(config, attempt - 1)).await;
        }

        let request = OracleRequest::text(
            EXTRACTION_SYSTEM_PROMPT,
            &user_prompt,
            task.token_budget,
        )
        .with_image(image);
        oracle_calls += 1;
        cost.record(OracleTier::Fast);

        let raw = match oracle.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                last_error = format!("oracle call failed: {e}");
                warn!("Task {} attempt {attempt}: {last_error}", task.id);
                continue;
            }
        };

        let truncation = detect_truncation(&raw);
        if !truncation.is_empty() {
            last_error = format!("truncated response: {truncation:?}");
            warn!("Task {} attempt {attempt}: {last_error}", task.id);
            continue;
        }

        let raw_items = match responses::parse_core_items(&raw) {
            Ok(items) => items,
            Err(e) => {
                last_error = format!("malformed response: {e}");
                warn!("Task {} attempt {attempt}: {last_error}", task.id);
                continue;
            }
        };

        let items: Vec<CoreLineItem> = raw_items
            .into_iter()
            .map(|raw| attribute_item(task, raw))
            .filter(|item| {
                let valid = !item.name.is_empty() && !item.source.filename.is_empty();
                if !valid {
                    warn!("Task {}: dropping item without name or source", task.id);
                }
                valid
            })
            .collect();

        // An implausibly low yield against a meaningful estimate is treated
        // as a transient failure, not silently accepted.
        let estimate = task.batch.estimated_items;
        if estimate > config.low_yield_min_estimate
            && (items.len() as f64) < config.low_yield_ratio * estimate as f64
        {
            last_error = format!(
                "low yield: {} items against an estimate of {estimate}",
                items.len()
            );
            warn!("Task {} attempt {attempt}: {last_error}", task.id);
            continue;
        }

        info!(
            "Task {} ('{}') extracted {} items on attempt {attempt}",
            task.id,
            task.label(),
            items.len()
        );
        return TaskResult {
            task_id: task.id.clone(),
            items,
            oracle_calls,
            retries_used: attempt,
            elapsed: started.elapsed(),
            success: true,
            error: None,
        };
    }

    warn!(
        "Task {} ('{}') failed after {} retries: {last_error}",
        task.id,
        task.label(),
        task.max_retries
    );
    TaskResult {
        task_id: task.id.clone(),
        items: Vec::new(),
        oracle_calls,
        retries_used: task.max_retries,
        elapsed: started.elapsed(),
        success: false,
        error: Some(last_error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let config = PipelineConfig::default();
        assert_eq!(backoff_delay(&config, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(&config, 3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(&config, 6), config.backoff_cap);
    }

    #[test]
    fn segment_numbering_round_trips_through_the_label() {
        assert_eq!(
            parse_segment_numbering("page 2 (Part 2/3)"),
            Some((2, 3))
        );
        assert_eq!(parse_segment_numbering("no numbering here"), None);
    }
}
