//! The segmentation pipeline: records -> features -> partition -> ranked labels.

use crate::cluster::kmeans::{self, KMeansConfig};
use crate::cluster::rank::{self, LabelScheme};
use crate::config::SegmentationConfig;
use crate::error::{Diagnostic, InsightError};
use crate::features::{StandardScaler, aggregate, feature_matrix};
use crate::record::TrainingRecord;
use serde::{Deserialize, Serialize};

/// One employee's final cluster membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    /// Ranked index: 0 is the best-performing cluster.
    pub cluster_index: usize,
    pub cluster_label: String,
    pub avg_score: f64,
    pub total_trainings: usize,
    pub completed_trainings: usize,
    pub completion_rate: f64,
}

/// Statistics of one ranked cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_index: usize,
    pub label: String,
    pub member_count: usize,
    pub mean_avg_score: f64,
    pub mean_completion_rate: f64,
    pub mean_total_trainings: f64,
}

/// Everything a segmentation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationReport {
    pub assignments: Vec<ClusterAssignment>,
    /// Ordered by rank, best first.
    pub summaries: Vec<ClusterSummary>,
    pub converged: bool,
    pub iterations: usize,
    pub inertia: f64,
    /// Non-fatal issues: excluded records, dropped employees, non-convergence.
    pub diagnostics: Vec<Diagnostic>,
}

impl SegmentationReport {
    /// Members of the cluster carrying `label`.
    pub fn members<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ClusterAssignment> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.cluster_label == label)
    }

    pub fn summary(&self, label: &str) -> Option<&ClusterSummary> {
        self.summaries.iter().find(|s| s.label == label)
    }
}

/// A validated, reusable segmentation setup.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmentationConfig,
    labels: LabelScheme,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Result<Self, InsightError> {
        config.validate()?;
        let labels = config.labels()?;
        Ok(Self { config, labels })
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    pub fn labels(&self) -> &LabelScheme {
        &self.labels
    }

    /// Segment employees found in `records`.
    ///
    /// Only a shortage of employees aborts the run; every other problem ends up
    /// in [`SegmentationReport::diagnostics`].
    pub fn segment(&self, records: &[TrainingRecord]) -> Result<SegmentationReport, InsightError> {
        let k = self.config.cluster_count;
        let aggregation = aggregate(records, self.config.score_completion_threshold);
        let mut diagnostics = aggregation.diagnostics;
        let vectors = aggregation.vectors;
        tracing::debug!(
            records = records.len(),
            employees = vectors.len(),
            excluded = diagnostics.len(),
            "Aggregated training records"
        );

        if vectors.len() < k {
            tracing::warn!(employees = vectors.len(), clusters = k, "Not enough employees to partition");
            return Err(InsightError::InsufficientData {
                employees: vectors.len(),
                clusters: k,
            });
        }

        let matrix = feature_matrix(&vectors, &self.config.features);
        let (_, scaled) = StandardScaler::fit_transform(&matrix);

        let kmeans_config = KMeansConfig::new(k)
            .with_max_iterations(self.config.max_partition_iterations)
            .with_n_init(self.config.n_init)
            .with_seed(self.config.seed);
        let partition = kmeans::fit(&scaled, &kmeans_config)?;
        if !partition.converged {
            tracing::warn!(iterations = partition.iterations, "Partitioning hit the iteration cap");
            diagnostics.push(Diagnostic::ConvergenceNotReached {
                iterations: partition.iterations,
            });
        }

        let stats = rank::raw_cluster_stats(&partition, &vectors);
        let ranked = rank::rank_clusters(&stats);
        let rank_of = rank::rank_of_raw(&ranked);

        let summaries = ranked
            .iter()
            .enumerate()
            .map(|(rank, &raw)| {
                let s = &stats[raw];
                ClusterSummary {
                    cluster_index: rank,
                    label: self.labels.label(rank).to_string(),
                    member_count: s.member_count,
                    mean_avg_score: s.mean_avg_score,
                    mean_completion_rate: s.mean_completion_rate,
                    mean_total_trainings: s.mean_total_trainings,
                }
            })
            .collect::<Vec<_>>();

        let assignments = vectors
            .into_iter()
            .zip(&partition.assignments)
            .map(|(v, &raw)| {
                let rank = rank_of[raw];
                ClusterAssignment {
                    employee_id: v.employee_id,
                    employee_name: v.employee_name,
                    department: v.department,
                    cluster_index: rank,
                    cluster_label: self.labels.label(rank).to_string(),
                    avg_score: v.avg_score,
                    total_trainings: v.total_trainings,
                    completed_trainings: v.completed_trainings,
                    completion_rate: v.completion_rate,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            employees = assignments.len(),
            clusters = k,
            converged = partition.converged,
            iterations = partition.iterations,
            "Segmentation complete"
        );

        Ok(SegmentationReport {
            assignments,
            summaries,
            converged: partition.converged,
            iterations: partition.iterations,
            inertia: partition.inertia,
            diagnostics,
        })
    }
}

/// Validate `config` and segment `records` in one call.
pub fn segment(
    records: &[TrainingRecord],
    config: &SegmentationConfig,
) -> Result<SegmentationReport, InsightError> {
    Segmenter::new(config.clone())?.segment(records)
}
