//! Per-employee feature engineering.

pub mod aggregate;
pub mod scale;

pub use aggregate::{Aggregation, EmployeeFeatureVector, aggregate};
pub use scale::StandardScaler;

use serde::{Deserialize, Serialize};

/// A numeric employee feature usable as a clustering dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterFeature {
    AvgScore,
    TotalTrainings,
    CompletedTrainings,
    CompletionRate,
}

impl ClusterFeature {
    /// Features used when none are configured.
    pub const DEFAULT: [ClusterFeature; 3] = [
        ClusterFeature::AvgScore,
        ClusterFeature::TotalTrainings,
        ClusterFeature::CompletionRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AvgScore => "avg_score",
            Self::TotalTrainings => "total_trainings",
            Self::CompletedTrainings => "completed_trainings",
            Self::CompletionRate => "completion_rate",
        }
    }

    pub fn extract(&self, vector: &EmployeeFeatureVector) -> f64 {
        match self {
            Self::AvgScore => vector.avg_score,
            Self::TotalTrainings => vector.total_trainings as f64,
            Self::CompletedTrainings => vector.completed_trainings as f64,
            Self::CompletionRate => vector.completion_rate,
        }
    }
}

/// Build a row-major feature matrix from employee vectors.
pub fn feature_matrix(vectors: &[EmployeeFeatureVector], features: &[ClusterFeature]) -> Vec<Vec<f64>> {
    vectors
        .iter()
        .map(|v| features.iter().map(|f| f.extract(v)).collect())
        .collect()
}
