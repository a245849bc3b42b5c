//! Course recommendations from organisation-wide training history.
//!
//! Each catalog course gets three signals computed over all records (completion
//! rate, popularity, cost efficiency). Courses the employee already took are
//! skipped, and courses aimed at the employee's department or section get a
//! fixed boost on top of the weighted signals.

use crate::catalog::{Catalog, CourseOffering};
use crate::config::RecommendConfig;
use crate::error::InsightError;
use crate::record::{TrainingRecord, TrainingStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// What the recommender knows about the employee being served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Courses the employee already has a record for.
    pub taken: BTreeSet<String>,
}

impl EmployeeProfile {
    /// Build a profile from the employee's records; the latest record decides the department.
    pub fn from_history(employee_id: &str, records: &[TrainingRecord]) -> Result<Self, InsightError> {
        let own: Vec<&TrainingRecord> = records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .collect();
        let latest = own
            .iter()
            .max_by_key(|r| r.completion_date)
            .ok_or_else(|| InsightError::UnknownEmployee(employee_id.to_string()))?;
        Ok(Self {
            employee_id: employee_id.to_string(),
            employee_name: latest.employee_name.clone(),
            department: latest.department.clone(),
            section: None,
            taken: own.iter().map(|r| r.training_course.clone()).collect(),
        })
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// Per-course signals derived from history and catalog details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseSignals {
    pub enrollments: usize,
    pub completed: usize,
    /// Completed share of this course's records.
    pub completion_rate: f64,
    /// This course's share of all records.
    pub popularity: f64,
    /// `1 - cost / max_cost`; 0 when no course has a positive cost.
    pub cost_efficiency: f64,
}

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub course: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub signals: CourseSignals,
    pub match_boost: f64,
    pub score: f64,
}

/// Compute signals for every catalog course, keyed by course name.
pub fn build_signals(
    offerings: &[CourseOffering],
    records: &[TrainingRecord],
    threshold: f64,
) -> HashMap<String, CourseSignals> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for record in records {
        let entry = counts.entry(record.training_course.as_str()).or_default();
        entry.0 += 1;
        if record.resolved_status(threshold) == Some(TrainingStatus::Completed) {
            entry.1 += 1;
        }
    }
    let total = records.len().max(1) as f64;
    let max_cost = offerings
        .iter()
        .filter_map(|o| o.cost)
        .fold(0.0_f64, f64::max);

    offerings
        .iter()
        .map(|o| {
            let (enrollments, completed) = counts.get(o.course.as_str()).copied().unwrap_or_default();
            let completion_rate = if enrollments == 0 {
                0.0
            } else {
                completed as f64 / enrollments as f64
            };
            let cost_efficiency = match o.cost {
                Some(cost) if max_cost > 0.0 => 1.0 - cost / max_cost,
                _ => 0.0,
            };
            let signals = CourseSignals {
                enrollments,
                completed,
                completion_rate,
                popularity: enrollments as f64 / total,
                cost_efficiency,
            };
            (o.course.clone(), signals)
        })
        .collect()
}

/// Rank catalog courses the employee has not taken yet and return the best `top_n`.
///
/// Ordered by score (highest first), then course name.
pub fn recommend(
    profile: &EmployeeProfile,
    records: &[TrainingRecord],
    catalog: &Catalog,
    config: &RecommendConfig,
    threshold: f64,
    top_n: usize,
) -> Vec<Recommendation> {
    let offerings = catalog.course_offerings();
    let signals = build_signals(&offerings, records, threshold);

    let mut ranked: Vec<Recommendation> = offerings
        .into_iter()
        .filter(|o| !profile.taken.contains(&o.course))
        .map(|o| {
            let s = signals.get(&o.course).copied().unwrap_or_default();
            let mut match_boost = 0.0;
            if o.department.as_deref() == Some(profile.department.as_str()) {
                match_boost += config.department_boost;
            }
            if o.section.is_some() && o.section == profile.section {
                match_boost += config.section_boost;
            }
            let score = config.completion_weight * s.completion_rate
                + config.cost_weight * s.cost_efficiency
                + config.popularity_weight * s.popularity
                + match_boost;
            Recommendation {
                course: o.course,
                department: o.department,
                provider: o.provider,
                cost: o.cost,
                signals: s,
                match_boost,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.course.cmp(&b.course)));
    ranked.truncate(top_n);
    tracing::debug!(
        employee = %profile.employee_id,
        skipped = profile.taken.len(),
        returned = ranked.len(),
        "Ranked course recommendations"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawScore;
    use chrono::NaiveDate;

    fn record(id: &str, department: &str, course: &str, score: f64, day: u32) -> TrainingRecord {
        TrainingRecord {
            employee_id: id.into(),
            employee_name: format!("Name {id}"),
            department: department.into(),
            training_course: course.into(),
            completion_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            score: RawScore::Number(score),
            status: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec!["Sales".into(), "Finance".into()],
            vec!["Excel".into(), "Negotiation".into(), "Modeling".into(), "Ethics".into()],
        )
        .with_offering(CourseOffering::new("Negotiation").with_department("Sales").with_cost(100.0))
        .with_offering(CourseOffering::new("Modeling").with_department("Finance").with_cost(400.0))
    }

    fn history() -> Vec<TrainingRecord> {
        vec![
            record("E1", "Sales", "Excel", 90.0, 1),
            record("E2", "Finance", "Excel", 40.0, 2),
            record("E2", "Finance", "Modeling", 85.0, 3),
            record("E3", "Finance", "Modeling", 75.0, 4),
        ]
    }

    #[test]
    fn test_signals() {
        let catalog = catalog();
        let signals = build_signals(&catalog.course_offerings(), &history(), 60.0);
        let excel = signals["Excel"];
        assert_eq!(excel.enrollments, 2);
        assert_eq!(excel.completion_rate, 0.5);
        assert_eq!(excel.popularity, 0.5);
        assert_eq!(excel.cost_efficiency, 0.0);
        assert_eq!(signals["Modeling"].completion_rate, 1.0);
        assert_eq!(signals["Negotiation"].cost_efficiency, 0.75);
        assert_eq!(signals["Ethics"], CourseSignals::default());
    }

    #[test]
    fn test_taken_courses_are_skipped() {
        let records = history();
        let profile = EmployeeProfile::from_history("E2", &records).unwrap();
        assert_eq!(profile.department, "Finance");
        let recs = recommend(&profile, &records, &catalog(), &RecommendConfig::default(), 60.0, 10);
        let courses: Vec<&str> = recs.iter().map(|r| r.course.as_str()).collect();
        assert_eq!(courses, vec!["Negotiation", "Ethics"]);
    }

    #[test]
    fn test_department_boost_outranks_signals() {
        let records = history();
        let profile = EmployeeProfile::from_history("E1", &records).unwrap();
        let recs = recommend(&profile, &records, &catalog(), &RecommendConfig::default(), 60.0, 2);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].course, "Negotiation");
        assert_eq!(recs[0].match_boost, 2.0);
        assert_eq!(recs[1].course, "Modeling");
    }

    #[test]
    fn test_section_boost_needs_both_sides() {
        let records = history();
        let catalog = catalog().with_offering(CourseOffering::new("Ethics").with_section("Audit"));
        let config = RecommendConfig::default();

        let plain = EmployeeProfile::from_history("E3", &records).unwrap();
        let recs = recommend(&plain, &records, &catalog, &config, 60.0, 10);
        let ethics = recs.iter().find(|r| r.course == "Ethics").unwrap();
        assert_eq!(ethics.match_boost, 0.0);

        let audit = plain.with_section("Audit");
        let recs = recommend(&audit, &records, &catalog, &config, 60.0, 10);
        let ethics = recs.iter().find(|r| r.course == "Ethics").unwrap();
        assert_eq!(ethics.match_boost, 1.5);
    }

    #[test]
    fn test_ties_break_by_course_name() {
        let catalog = Catalog::new(
            vec!["Ops".into()],
            vec!["Zeta".into(), "Alpha".into(), "Mid".into()],
        );
        let records = vec![record("E9", "Ops", "Other", 70.0, 5)];
        let profile = EmployeeProfile::from_history("E9", &records).unwrap();
        let recs = recommend(&profile, &records, &catalog, &RecommendConfig::default(), 60.0, 3);
        let courses: Vec<&str> = recs.iter().map(|r| r.course.as_str()).collect();
        assert_eq!(courses, vec!["Alpha", "Mid", "Zeta"]);
        assert!(recs.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_unknown_employee() {
        let err = EmployeeProfile::from_history("NOPE", &history()).unwrap_err();
        assert!(matches!(err, InsightError::UnknownEmployee(id) if id == "NOPE"));
    }
}
