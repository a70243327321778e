//! Rating aggregation over a business's visible reviews.
//!
//! The overall rating is a plain mean. Micro-metrics are sparse: each metric
//! is averaged only over the reviews that reported it, so a review without
//! "service" contributes nothing (not a zero) to the "service" average.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one aggregation pass, as persisted on the business
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessAggregates {
    pub aggregate_rating: f64,
    pub micro_metrics_aggregates: BTreeMap<String, f64>,
    pub review_count: usize,
}

#[derive(Debug, Default)]
struct MetricSum {
    sum: f64,
    count: u32,
}

/// Single-pass accumulator of overall and per-metric ratings
#[derive(Debug, Default)]
pub struct RatingAccumulator {
    overall_sum: f64,
    review_count: usize,
    metrics: BTreeMap<String, MetricSum>,
}

impl RatingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one review. Non-numeric micro-rating values are skipped.
    pub fn add(&mut self, overall_rating: f64, micro_ratings: &BTreeMap<String, serde_json::Value>) {
        self.overall_sum += overall_rating;
        self.review_count += 1;

        for (metric, value) in micro_ratings {
            let Some(score) = value.as_f64() else {
                continue;
            };
            let entry = self.metrics.entry(metric.clone()).or_default();
            entry.sum += score;
            entry.count += 1;
        }
    }

    pub fn finish(self) -> BusinessAggregates {
        if self.review_count == 0 {
            return BusinessAggregates::default();
        }

        let micro_metrics_aggregates = self
            .metrics
            .into_iter()
            .filter(|(_, m)| m.count > 0)
            .map(|(metric, m)| (metric, m.sum / f64::from(m.count)))
            .collect();

        BusinessAggregates {
            aggregate_rating: self.overall_sum / self.review_count as f64,
            micro_metrics_aggregates,
            review_count: self.review_count,
        }
    }
}
