//! Turn a raw partition into performance-ranked, labeled clusters.

use crate::cluster::kmeans::Partition;
use crate::error::InsightError;
use crate::features::EmployeeFeatureVector;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const HIGH_PERFORMER: &str = "High Performer";
pub const AVERAGE_PERFORMER: &str = "Average Performer";
pub const NEEDS_IMPROVEMENT: &str = "Needs Improvement";

/// Ordered cluster labels, best performers first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelScheme {
    labels: Vec<String>,
}

impl LabelScheme {
    /// The built-in scheme for `k` clusters.
    ///
    /// Ranks beyond the third become "Needs Improvement (tier N)", N counting
    /// from 2.
    pub fn default_for(k: usize) -> Self {
        let labels = (0..k)
            .map(|rank| match rank {
                0 => HIGH_PERFORMER.to_string(),
                1 => AVERAGE_PERFORMER.to_string(),
                2 => NEEDS_IMPROVEMENT.to_string(),
                r => format!("{NEEDS_IMPROVEMENT} (tier {})", r - 1),
            })
            .collect();
        Self { labels }
    }

    /// A caller-declared scheme; must name exactly `k` distinct labels.
    pub fn explicit(labels: Vec<String>, k: usize) -> Result<Self, InsightError> {
        if labels.len() != k {
            return Err(InsightError::config(format!(
                "label_scheme has {} labels but cluster_count is {k}",
                labels.len()
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for label in &labels {
            if label.trim().is_empty() {
                return Err(InsightError::config("label_scheme contains a blank label"));
            }
            if !seen.insert(label.as_str()) {
                return Err(InsightError::config(format!(
                    "label_scheme repeats label {label:?}"
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, rank: usize) -> &str {
        &self.labels[rank]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Aggregate statistics of one raw cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClusterStats {
    pub raw_index: usize,
    pub member_count: usize,
    pub mean_avg_score: f64,
    pub mean_completion_rate: f64,
    pub mean_total_trainings: f64,
}

/// Compute per-raw-cluster statistics from the unscaled feature vectors.
pub fn raw_cluster_stats(
    partition: &Partition,
    vectors: &[EmployeeFeatureVector],
) -> Vec<RawClusterStats> {
    let k = partition.k();
    let mut sums = vec![(0usize, 0.0f64, 0.0f64, 0.0f64); k];
    for (vector, &c) in vectors.iter().zip(&partition.assignments) {
        let entry = &mut sums[c];
        entry.0 += 1;
        entry.1 += vector.avg_score;
        entry.2 += vector.completion_rate;
        entry.3 += vector.total_trainings as f64;
    }
    sums.into_iter()
        .enumerate()
        .map(|(raw_index, (count, score, rate, total))| {
            let denom = count.max(1) as f64;
            RawClusterStats {
                raw_index,
                member_count: count,
                mean_avg_score: score / denom,
                mean_completion_rate: rate / denom,
                mean_total_trainings: total / denom,
            }
        })
        .collect()
}

/// Order raw clusters best-first: mean score descending, then mean completion
/// rate descending, then raw index ascending.
pub fn rank_clusters(stats: &[RawClusterStats]) -> Vec<usize> {
    let mut order: Vec<&RawClusterStats> = stats.iter().collect();
    order.sort_by(|a, b| compare_clusters(a, b));
    order.into_iter().map(|s| s.raw_index).collect()
}

fn compare_clusters(a: &RawClusterStats, b: &RawClusterStats) -> Ordering {
    b.mean_avg_score
        .total_cmp(&a.mean_avg_score)
        .then_with(|| b.mean_completion_rate.total_cmp(&a.mean_completion_rate))
        .then_with(|| a.raw_index.cmp(&b.raw_index))
}

/// Map each raw cluster index to its rank (0 = best).
pub fn rank_of_raw(ranked: &[usize]) -> Vec<usize> {
    let mut rank_of = vec![0; ranked.len()];
    for (rank, &raw) in ranked.iter().enumerate() {
        rank_of[raw] = rank;
    }
    rank_of
}
