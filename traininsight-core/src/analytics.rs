//! Dashboard figures derived from training records.
//!
//! Score statistics only use valid scores; counts include every record.

use crate::features::EmployeeFeatureVector;
use crate::record::{TrainingRecord, TrainingStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Headline numbers for a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_employees: usize,
    pub total_records: usize,
    pub completed_trainings: usize,
    /// `None` when no record carries a valid score.
    pub average_score: Option<f64>,
    /// Completed records as a percentage of all records.
    pub completion_rate_pct: f64,
}

pub fn kpis(records: &[TrainingRecord], threshold: f64) -> Kpis {
    let total_employees = records
        .iter()
        .map(|r| r.employee_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let completed_trainings = count_completed(records.iter(), threshold);
    let scores: Vec<f64> = records.iter().filter_map(TrainingRecord::valid_score).collect();

    Kpis {
        total_employees,
        total_records: records.len(),
        completed_trainings,
        average_score: mean(&scores),
        completion_rate_pct: percentage(completed_trainings, records.len()),
    }
}

/// Per-department statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub department: String,
    pub total_employees: usize,
    pub total_records: usize,
    pub avg_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub completed_count: usize,
    /// Completed records as a percentage of the department's records.
    pub completion_rate_pct: f64,
}

/// Statistics for every department present, sorted by name.
pub fn department_stats(records: &[TrainingRecord], threshold: f64) -> Vec<DepartmentStats> {
    let mut groups: BTreeMap<&str, Vec<&TrainingRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.department.as_str()).or_default().push(r);
    }

    groups
        .into_iter()
        .map(|(department, group)| {
            let employees: HashSet<&str> = group.iter().map(|r| r.employee_id.as_str()).collect();
            let scores: Vec<f64> = group.iter().filter_map(|r| r.valid_score()).collect();
            let completed_count = count_completed(group.iter().copied(), threshold);
            DepartmentStats {
                department: department.to_string(),
                total_employees: employees.len(),
                total_records: group.len(),
                avg_score: mean(&scores),
                min_score: scores.iter().copied().reduce(f64::min),
                max_score: scores.iter().copied().reduce(f64::max),
                completed_count,
                completion_rate_pct: percentage(completed_count, group.len()),
            }
        })
        .collect()
}

/// Count of records per calendar month and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    pub month: String,
    pub status: TrainingStatus,
    pub count: usize,
}

/// Records per month and status, sorted by month then status. Records whose
/// status cannot be resolved are left out.
pub fn monthly_trend(records: &[TrainingRecord], threshold: f64) -> Vec<MonthlyCount> {
    let mut counts: BTreeMap<(String, TrainingStatus), usize> = BTreeMap::new();
    for r in records {
        if let Some(status) = r.resolved_status(threshold) {
            let month = r.completion_date.format("%Y-%m").to_string();
            *counts.entry((month, status)).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|((month, status), count)| MonthlyCount {
            month,
            status,
            count,
        })
        .collect()
}

/// Enrollment count of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub course: String,
    pub enrollments: usize,
}

/// The `n` most-taken courses; ties broken by course name.
pub fn top_courses(records: &[TrainingRecord], n: usize) -> Vec<CourseEnrollment> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.training_course.as_str()).or_default() += 1;
    }
    let mut courses: Vec<CourseEnrollment> = counts
        .into_iter()
        .map(|(course, enrollments)| CourseEnrollment {
            course: course.to_string(),
            enrollments,
        })
        .collect();
    courses.sort_by(|a, b| {
        b.enrollments
            .cmp(&a.enrollments)
            .then_with(|| a.course.cmp(&b.course))
    });
    courses.truncate(n);
    courses
}

/// Best and worst employees by average score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRanking {
    pub top: Vec<EmployeeFeatureVector>,
    /// Worst first.
    pub bottom: Vec<EmployeeFeatureVector>,
}

pub fn performance_ranking(vectors: &[EmployeeFeatureVector], n: usize) -> PerformanceRanking {
    let mut sorted: Vec<&EmployeeFeatureVector> = vectors.iter().collect();
    sorted.sort_by(|a, b| {
        b.avg_score
            .total_cmp(&a.avg_score)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });
    let top = sorted.iter().take(n).map(|v| (*v).clone()).collect();
    let bottom = sorted.iter().rev().take(n).map(|v| (*v).clone()).collect();
    PerformanceRanking { top, bottom }
}

fn count_completed<'a>(records: impl Iterator<Item = &'a TrainingRecord>, threshold: f64) -> usize {
    records
        .filter(|r| r.resolved_status(threshold) == Some(TrainingStatus::Completed))
        .count()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::aggregate;
    use crate::record::RawScore;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(id: &str, dept: &str, course: &str, date: (i32, u32, u32), score: RawScore) -> TrainingRecord {
        TrainingRecord {
            employee_id: id.into(),
            employee_name: format!("Person {id}"),
            department: dept.into(),
            training_course: course.into(),
            completion_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            score,
            status: None,
        }
    }

    fn sample() -> Vec<TrainingRecord> {
        vec![
            record("E1", "Sales", "Excel", (2025, 1, 5), RawScore::Number(90.0)),
            record("E1", "Sales", "AML", (2025, 1, 20), RawScore::Number(50.0)),
            record("E2", "Sales", "Excel", (2025, 2, 3), RawScore::Number(70.0)),
            record("E3", "Finance", "Excel", (2025, 2, 9), RawScore::from("x")),
            record("E3", "Finance", "Modeling", (2025, 2, 11), RawScore::Number(80.0)),
        ]
    }

    #[test]
    fn test_kpis() {
        let k = kpis(&sample(), 60.0);
        assert_eq!(k.total_employees, 3);
        assert_eq!(k.total_records, 5);
        assert_eq!(k.completed_trainings, 3);
        assert_eq!(k.average_score, Some(72.5));
        assert_eq!(k.completion_rate_pct, 60.0);
    }

    #[test]
    fn test_kpis_empty() {
        let k = kpis(&[], 60.0);
        assert_eq!(k.average_score, None);
        assert_eq!(k.completion_rate_pct, 0.0);
    }

    #[test]
    fn test_department_stats() {
        let stats = department_stats(&sample(), 60.0);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].department, "Finance");
        assert_eq!(stats[0].total_records, 2);
        assert_eq!(stats[0].avg_score, Some(80.0));
        assert_eq!(stats[0].completion_rate_pct, 50.0);

        let sales = &stats[1];
        assert_eq!(sales.total_employees, 2);
        assert_eq!(sales.avg_score, Some(70.0));
        assert_eq!(sales.min_score, Some(50.0));
        assert_eq!(sales.max_score, Some(90.0));
        assert_eq!(sales.completed_count, 2);
    }

    #[test]
    fn test_monthly_trend() {
        let trend = monthly_trend(&sample(), 60.0);
        assert_eq!(
            trend,
            vec![
                MonthlyCount {
                    month: "2025-01".into(),
                    status: TrainingStatus::Completed,
                    count: 1
                },
                MonthlyCount {
                    month: "2025-01".into(),
                    status: TrainingStatus::InProgress,
                    count: 1
                },
                MonthlyCount {
                    month: "2025-02".into(),
                    status: TrainingStatus::Completed,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_top_courses() {
        let top = top_courses(&sample(), 2);
        assert_eq!(top[0].course, "Excel");
        assert_eq!(top[0].enrollments, 3);
        assert_eq!(top[1].course, "AML");
    }

    #[test]
    fn test_performance_ranking() {
        let agg = aggregate(&sample(), 60.0);
        let ranking = performance_ranking(&agg.vectors, 1);
        assert_eq!(ranking.top[0].employee_id, "E3");
        assert_eq!(ranking.bottom[0].employee_id, "E2");
    }
}
