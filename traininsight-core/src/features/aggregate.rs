//! Collapse per-event training records into one feature vector per employee.

use crate::error::Diagnostic;
use crate::record::{TrainingRecord, TrainingStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric summary of one employee's training history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFeatureVector {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    /// Mean of valid scores.
    pub avg_score: f64,
    /// All records for the employee, including ones with unusable scores.
    pub total_trainings: usize,
    /// Valid-score records whose status is completed.
    pub completed_trainings: usize,
    /// `completed_trainings / total_trainings`.
    pub completion_rate: f64,
}

/// Result of aggregation: vectors plus everything that was excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub vectors: Vec<EmployeeFeatureVector>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Default)]
struct Accumulator<'a> {
    employee_id: &'a str,
    employee_name: &'a str,
    department: &'a str,
    score_sum: f64,
    valid: usize,
    total: usize,
    completed: usize,
}

/// Aggregate records into per-employee feature vectors.
///
/// Vectors come out in order of each employee's first record. Records with an
/// unusable score still count towards `total_trainings`; employees without a
/// single valid score are dropped and reported.
pub fn aggregate(records: &[TrainingRecord], threshold: f64) -> Aggregation {
    let mut order: Vec<Accumulator<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut diagnostics = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let slot = *index.entry(record.employee_id.as_str()).or_insert_with(|| {
            order.push(Accumulator {
                employee_id: &record.employee_id,
                employee_name: &record.employee_name,
                department: &record.department,
                ..Default::default()
            });
            order.len() - 1
        });
        let acc = &mut order[slot];
        acc.total += 1;

        match record.score.value() {
            Ok(score) => {
                acc.valid += 1;
                acc.score_sum += score;
                let status = record
                    .status
                    .unwrap_or_else(|| TrainingStatus::from_score(score, threshold));
                if status == TrainingStatus::Completed {
                    acc.completed += 1;
                }
            }
            Err(reason) => {
                tracing::debug!(row, employee_id = %record.employee_id, %reason, "Excluding record from aggregation");
                diagnostics.push(Diagnostic::InvalidRecord {
                    row,
                    employee_id: record.employee_id.clone(),
                    reason,
                });
            }
        }
    }

    let mut vectors = Vec::with_capacity(order.len());
    for acc in order {
        if acc.valid == 0 {
            tracing::warn!(employee_id = acc.employee_id, "Employee has no valid records");
            diagnostics.push(Diagnostic::NoValidData {
                employee_id: acc.employee_id.to_string(),
            });
            continue;
        }
        vectors.push(EmployeeFeatureVector {
            employee_id: acc.employee_id.to_string(),
            employee_name: acc.employee_name.to_string(),
            department: acc.department.to_string(),
            avg_score: acc.score_sum / acc.valid as f64,
            total_trainings: acc.total,
            completed_trainings: acc.completed,
            completion_rate: acc.completed as f64 / acc.total as f64,
        });
    }

    Aggregation {
        vectors,
        diagnostics,
    }
}
