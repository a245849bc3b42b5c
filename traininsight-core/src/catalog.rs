//! Department and course catalog.
//!
//! The catalog is an injected value: callers build one (or take the default)
//! and pass it to whatever needs it.

use crate::error::InsightError;
use serde::{Deserialize, Serialize};

const DEFAULT_DEPARTMENTS: &[&str] = &[
    "Engineering",
    "Sales",
    "Marketing",
    "Human Resources",
    "Finance",
    "Legal Department",
    "Information Technology",
    "Corporate Communications",
    "Investor Relations",
    "Marketing & Public Relations",
    "Talent, Training & Development",
    "CFO Office",
    "Director of Finance",
    "Accounting",
    "Distribution",
    "Individual Department",
    "Commercial Underwriting",
    "Life & Medical",
    "Corporate Claims",
    "Reinsurance",
    "Strategy & Digital Department",
    "Risk Management",
];

const DEFAULT_COURSES: &[&str] = &[
    "AML & Compliance Basics",
    "Insurance Fraud Detection",
    "Advanced Excel for Analysts",
    "Customer Experience Excellence",
    "Underwriting Fundamentals",
    "Claims Management Essentials",
    "Cybersecurity Awareness",
    "Data Analytics for Business",
    "Leadership & Communication",
    "Reinsurance Principles",
    "Risk Assessment Techniques",
    "Digital Transformation",
    "Project Management Professional",
    "Regulatory Compliance",
    "Financial Modeling",
];

/// The departments and courses known to a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_departments")]
    pub departments: Vec<String>,
    #[serde(default = "default_courses")]
    pub courses: Vec<String>,
    /// Optional per-course details used when recommending courses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offerings: Vec<CourseOffering>,
}

/// Extra facts about one catalog course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub course: String,
    /// Department the course is aimed at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl CourseOffering {
    pub fn new(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            ..Default::default()
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            departments: default_departments(),
            courses: default_courses(),
            offerings: Vec::new(),
        }
    }
}

fn default_departments() -> Vec<String> {
    DEFAULT_DEPARTMENTS.iter().map(|s| s.to_string()).collect()
}

fn default_courses() -> Vec<String> {
    DEFAULT_COURSES.iter().map(|s| s.to_string()).collect()
}

impl Catalog {
    pub fn new(departments: Vec<String>, courses: Vec<String>) -> Self {
        Self {
            departments,
            courses,
            offerings: Vec::new(),
        }
    }

    pub fn with_offering(mut self, offering: CourseOffering) -> Self {
        self.offerings.push(offering);
        self
    }

    /// Every catalog course with its details; courses without an entry get bare details.
    pub fn course_offerings(&self) -> Vec<CourseOffering> {
        self.courses
            .iter()
            .map(|course| {
                self.offerings
                    .iter()
                    .find(|o| &o.course == course)
                    .cloned()
                    .unwrap_or_else(|| CourseOffering::new(course.clone()))
            })
            .collect()
    }

    pub fn has_department(&self, name: &str) -> bool {
        self.departments.iter().any(|d| d == name)
    }

    pub fn has_course(&self, name: &str) -> bool {
        self.courses.iter().any(|c| c == name)
    }

    /// Both lists must be non-empty and free of blank or duplicate entries.
    pub fn validate(&self) -> Result<(), InsightError> {
        check_list("department", &self.departments)?;
        check_list("course", &self.courses)?;
        let mut seen = std::collections::HashSet::new();
        for offering in &self.offerings {
            if !self.has_course(&offering.course) {
                return Err(InsightError::config(format!(
                    "offering for unknown course: {}",
                    offering.course
                )));
            }
            if !seen.insert(offering.course.as_str()) {
                return Err(InsightError::config(format!(
                    "course listed twice in offerings: {}",
                    offering.course
                )));
            }
            if offering.cost.is_some_and(|c| !c.is_finite() || c < 0.0) {
                return Err(InsightError::config(format!(
                    "cost of {} must be a non-negative number",
                    offering.course
                )));
            }
        }
        Ok(())
    }
}

fn check_list(kind: &str, items: &[String]) -> Result<(), InsightError> {
    if items.is_empty() {
        return Err(InsightError::config(format!("catalog has no {kind}s")));
    }
    let mut seen = std::collections::HashSet::new();
    for item in items {
        if item.trim().is_empty() {
            return Err(InsightError::config(format!("blank {kind} name in catalog")));
        }
        if !seen.insert(item.as_str()) {
            return Err(InsightError::config(format!(
                "duplicate {kind} in catalog: {item}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        assert_eq!(catalog.departments.len(), 22);
        assert_eq!(catalog.courses.len(), 15);
        assert!(catalog.has_department("Talent, Training & Development"));
        assert!(catalog.has_course("Financial Modeling"));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicates() {
        let empty = Catalog::new(vec![], vec!["A".into()]);
        assert!(empty.validate().is_err());

        let dup = Catalog::new(vec!["Sales".into(), "Sales".into()], vec!["A".into()]);
        let err = dup.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate department"));
    }

    #[test]
    fn test_partial_toml_falls_back_to_default_courses() {
        let catalog: Catalog = toml::from_str(r#"departments = ["Ops"]"#).unwrap();
        assert_eq!(catalog.departments, vec!["Ops".to_string()]);
        assert_eq!(catalog.courses.len(), 15);
    }

    #[test]
    fn test_offerings_fill_in_bare_courses() {
        let catalog = Catalog::new(vec!["Sales".into()], vec!["A".into(), "B".into()])
            .with_offering(CourseOffering::new("B").with_department("Sales").with_cost(120.0));
        let offerings = catalog.course_offerings();
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0], CourseOffering::new("A"));
        assert_eq!(offerings[1].department.as_deref(), Some("Sales"));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_offerings_validated() {
        let unknown = Catalog::new(vec!["Sales".into()], vec!["A".into()])
            .with_offering(CourseOffering::new("Z"));
        assert!(unknown.validate().is_err());

        let negative = Catalog::new(vec!["Sales".into()], vec!["A".into()])
            .with_offering(CourseOffering::new("A").with_cost(-5.0));
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_offerings_from_toml() {
        let catalog: Catalog = toml::from_str(
            r#"
            courses = ["Financial Modeling"]

            [[offerings]]
            course = "Financial Modeling"
            department = "Finance"
            cost = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(catalog.offerings[0].cost, Some(250.0));
        assert_eq!(catalog.departments.len(), 22);
    }
}
