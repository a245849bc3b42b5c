//! Record filters: department, date range, status and free-text search.

use crate::record::{TrainingRecord, TrainingStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Criteria a record must satisfy. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Inclusive lower bound on the completion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the completion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    /// Accepted statuses; empty accepts any, including unresolved ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<TrainingStatus>,
    /// Case-insensitive substring of employee name, id or course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn status(mut self, status: TrainingStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &TrainingRecord, threshold: f64) -> bool {
        if let Some(dept) = &self.department {
            if &record.department != dept {
                return false;
            }
        }
        if self.from.is_some_and(|from| record.completion_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.completion_date > to) {
            return false;
        }
        if !self.statuses.is_empty() {
            match record.resolved_status(threshold) {
                Some(status) if self.statuses.contains(&status) => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.trim().to_lowercase();
            if !needle.is_empty()
                && ![
                    &record.employee_name,
                    &record.employee_id,
                    &record.training_course,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    /// Records matching the filter, in input order.
    pub fn apply(&self, records: &[TrainingRecord], threshold: f64) -> Vec<TrainingRecord> {
        records
            .iter()
            .filter(|r| self.matches(r, threshold))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawScore;

    fn record(id: &str, dept: &str, course: &str, day: u32, score: RawScore) -> TrainingRecord {
        TrainingRecord {
            employee_id: id.into(),
            employee_name: format!("Person {id}"),
            department: dept.into(),
            training_course: course.into(),
            completion_date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            score,
            status: None,
        }
    }

    fn sample() -> Vec<TrainingRecord> {
        vec![
            record("EMP0001", "Sales", "Advanced Excel for Analysts", 1, RawScore::Number(90.0)),
            record("EMP0002", "Finance", "Financial Modeling", 10, RawScore::Number(55.0)),
            record("EMP0003", "Sales", "Cybersecurity Awareness", 20, RawScore::Missing),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = RecordFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sample(), 60.0).len(), 3);
    }

    #[test]
    fn test_department_and_dates() {
        let filter = RecordFilter::new().department("Sales").between(
            NaiveDate::from_ymd_opt(2025, 4, 2),
            NaiveDate::from_ymd_opt(2025, 4, 20),
        );
        let kept = filter.apply(&sample(), 60.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].employee_id, "EMP0003");
    }

    #[test]
    fn test_status_filter_uses_threshold_and_skips_unresolved() {
        let filter = RecordFilter::new().status(TrainingStatus::InProgress);
        let kept = filter.apply(&sample(), 60.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].employee_id, "EMP0002");
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let kept = RecordFilter::new().search("excel").apply(&sample(), 60.0);
        assert_eq!(kept.len(), 1);

        let kept = RecordFilter::new().search("emp000").apply(&sample(), 60.0);
        assert_eq!(kept.len(), 3);

        let kept = RecordFilter::new().search("person emp0002").apply(&sample(), 60.0);
        assert_eq!(kept[0].department, "Finance");
    }
}
