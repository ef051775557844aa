//! # Cost Accounting
//!
//! Two atomic counters, one per oracle tier, threaded through every call site
//! in the pipeline. At run completion the counters combine with document and
//! item counts into a [`CostMetrics`] record, from which [`CostBreakdown`]
//! derives an itemized monetary estimate.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// The two cost/capability levels of oracle invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleTier {
    /// Cheap bulk work: scoping, workload estimates, batch extraction.
    Fast,
    /// Deeper analysis: modifier and size enrichment.
    Expert,
}

/// Shared run-wide counters. Workers increment concurrently, so both
/// counters are atomics; `Relaxed` is enough since nothing orders on them.
#[derive(Debug, Default)]
pub struct CostTracker {
    fast: AtomicU64,
    expert: AtomicU64,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one oracle call on the given tier.
    pub fn record(&self, tier: OracleTier) {
        match tier {
            OracleTier::Fast => self.fast.fetch_add(1, Ordering::Relaxed),
            OracleTier::Expert => self.expert.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn fast_calls(&self) -> u64 {
        self.fast.load(Ordering::Relaxed)
    }

    pub fn expert_calls(&self) -> u64 {
        self.expert.load(Ordering::Relaxed)
    }
}

/// Per-call price constants used to derive the monetary estimate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRates {
    pub fast_call_usd: f64,
    pub expert_call_usd: f64,
    pub image_surcharge_usd: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            fast_call_usd: 0.002,
            expert_call_usd: 0.01,
            image_surcharge_usd: 0.001,
        }
    }
}

/// Resource accounting for one complete run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostMetrics {
    pub documents: u32,
    pub images: u32,
    pub fast_calls: u64,
    pub expert_calls: u64,
    pub total_items: u32,
    pub elapsed_ms: u64,
}

impl CostMetrics {
    pub fn from_tracker(
        tracker: &CostTracker,
        documents: u32,
        images: u32,
        total_items: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            documents,
            images,
            fast_calls: tracker.fast_calls(),
            expert_calls: tracker.expert_calls(),
            total_items,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Itemized monetary estimate derived from [`CostMetrics`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub fast_cost_usd: f64,
    pub expert_cost_usd: f64,
    pub image_cost_usd: f64,
    pub total_usd: f64,
}

impl CostBreakdown {
    pub fn derive(metrics: &CostMetrics, rates: &CostRates) -> Self {
        let fast_cost_usd = metrics.fast_calls as f64 * rates.fast_call_usd;
        let expert_cost_usd = metrics.expert_calls as f64 * rates.expert_call_usd;
        let image_cost_usd = metrics.images as f64 * rates.image_surcharge_usd;
        Self {
            fast_cost_usd,
            expert_cost_usd,
            image_cost_usd,
            total_usd: fast_cost_usd + expert_cost_usd + image_cost_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_tiers_independently() {
        let tracker = CostTracker::new();
        for _ in 0..3 {
            tracker.record(OracleTier::Fast);
        }
        for _ in 0..2 {
            tracker.record(OracleTier::Expert);
        }
        assert_eq!(tracker.fast_calls(), 3);
        assert_eq!(tracker.expert_calls(), 2);

        let metrics =
            CostMetrics::from_tracker(&tracker, 2, 1, 10, Duration::from_millis(1500));
        assert_eq!(metrics.fast_calls, 3);
        assert_eq!(metrics.expert_calls, 2);
        assert_eq!(metrics.elapsed_ms, 1500);
    }

    #[test]
    fn breakdown_is_itemized_and_non_negative() {
        let metrics = CostMetrics {
            documents: 2,
            images: 1,
            fast_calls: 10,
            expert_calls: 4,
            total_items: 50,
            elapsed_ms: 2000,
        };
        let breakdown = CostBreakdown::derive(&metrics, &CostRates::default());
        assert!((breakdown.fast_cost_usd - 0.02).abs() < 1e-9);
        assert!((breakdown.expert_cost_usd - 0.04).abs() < 1e-9);
        assert!((breakdown.image_cost_usd - 0.001).abs() < 1e-9);
        assert!(breakdown.total_usd > 0.0);
        assert!(
            (breakdown.total_usd
                - (breakdown.fast_cost_usd
                    + breakdown.expert_cost_usd
                    + breakdown.image_cost_usd))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        use std::sync::Arc;
        let tracker = Arc::new(CostTracker::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = tracker.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    tracker.record(OracleTier::Fast);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.fast_calls(), 800);
    }
}
