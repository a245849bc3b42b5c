//! Error types for the traininsight-core crate.
//!
//! Fatal errors use [`InsightError`]. Per-record and per-employee problems
//! never abort a batch; they are collected as [`Diagnostic`]s and returned
//! alongside the successful result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for analytics and segmentation.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Insufficient data: {employees} employees for {clusters} clusters (reduce the cluster count or supply more employees)")]
    InsufficientData { employees: usize, clusters: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Unknown employee: {0}")]
    UnknownEmployee(String),
}

impl InsightError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub fn generator(msg: impl Into<String>) -> Self {
        Self::Generator(msg.into())
    }
}

/// Why a raw score could not be used.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InvalidScore {
    #[error("score is missing")]
    Missing,

    #[error("score {0:?} is not numeric")]
    NotNumeric(String),

    #[error("score is not a finite number")]
    NonFinite,

    #[error("score {0} is outside 0-100")]
    OutOfRange(f64),
}

/// Severity of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// A non-fatal issue reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A single record was excluded from score aggregation.
    #[error("record {row} ({employee_id}) excluded: {reason}")]
    InvalidRecord {
        row: usize,
        employee_id: String,
        reason: InvalidScore,
    },

    /// An employee had no usable records and was dropped from the feature set.
    #[error("employee {employee_id} has no valid records and was dropped")]
    NoValidData { employee_id: String },

    /// Partitioning hit the iteration cap before assignments settled.
    #[error("partitioning did not converge within {iterations} iterations")]
    ConvergenceNotReached { iterations: usize },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidRecord { .. } => Severity::Info,
            Self::NoValidData { .. } | Self::ConvergenceNotReached { .. } => Severity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message_names_both_counts() {
        let err = InsightError::InsufficientData {
            employees: 2,
            clusters: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 employees"));
        assert!(msg.contains("3 clusters"));
    }

    #[test]
    fn test_diagnostic_severity() {
        let dropped = Diagnostic::NoValidData {
            employee_id: "EMP0001".into(),
        };
        assert_eq!(dropped.severity(), Severity::Warning);

        let invalid = Diagnostic::InvalidRecord {
            row: 4,
            employee_id: "EMP0001".into(),
            reason: InvalidScore::Missing,
        };
        assert_eq!(invalid.severity(), Severity::Info);
        assert!(invalid.to_string().contains("record 4"));
    }

    #[test]
    fn test_diagnostic_serde_tag() {
        let diag = Diagnostic::ConvergenceNotReached { iterations: 300 };
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("convergence_not_reached"));
    }
}
