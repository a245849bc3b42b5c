//! Training records: the input table of the analytics core.

use crate::error::{InsightError, InvalidScore};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest score a record may carry.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score a record may carry.
pub const MAX_SCORE: f64 = 100.0;

/// Completion status of a single training event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainingStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl TrainingStatus {
    /// Derive a status from a valid score.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Self::Completed
        } else {
            Self::InProgress
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
        }
    }

    /// Parse the display form, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Some(Self::Completed),
            "in progress" | "in_progress" => Some(Self::InProgress),
            _ => None,
        }
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A score exactly as it was supplied by the data source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawScore {
    /// Coerce to a finite score within `[0, 100]`.
    pub fn value(&self) -> Result<f64, InvalidScore> {
        let v = match self {
            Self::Missing => return Err(InvalidScore::Missing),
            Self::Number(v) => *v,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(InvalidScore::Missing);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| InvalidScore::NotNumeric(trimmed.to_string()))?
            }
        };
        if !v.is_finite() {
            return Err(InvalidScore::NonFinite);
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&v) {
            return Err(InvalidScore::OutOfRange(v));
        }
        Ok(v)
    }
}

impl From<f64> for RawScore {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawScore {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

/// One training event: an employee taking one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub training_course: String,
    pub completion_date: NaiveDate,
    #[serde(default)]
    pub score: RawScore,
    /// Trusted as-is when present; otherwise derived from the score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TrainingStatus>,
}

impl TrainingRecord {
    /// Validate a manually entered record and derive its status.
    pub fn entry(new: NewRecord, threshold: f64) -> Result<Self, InsightError> {
        let employee_id = new.employee_id.trim().to_string();
        let employee_name = new.employee_name.trim().to_string();
        if employee_id.is_empty() {
            return Err(InsightError::invalid_record("employee id is required"));
        }
        if employee_name.is_empty() {
            return Err(InsightError::invalid_record("employee name is required"));
        }
        if new.training_course.trim().is_empty() {
            return Err(InsightError::invalid_record("training course is required"));
        }
        let score = RawScore::Number(new.score)
            .value()
            .map_err(|e| InsightError::invalid_record(e.to_string()))?;

        Ok(Self {
            employee_id,
            employee_name,
            department: new.department,
            training_course: new.training_course,
            completion_date: new.completion_date,
            score: RawScore::Number(score),
            status: Some(TrainingStatus::from_score(score, threshold)),
        })
    }

    /// The validated score, if any.
    pub fn valid_score(&self) -> Option<f64> {
        self.score.value().ok()
    }

    /// The recorded status, or the one implied by a valid score.
    pub fn resolved_status(&self, threshold: f64) -> Option<TrainingStatus> {
        self.status.or_else(|| {
            self.valid_score()
                .map(|s| TrainingStatus::from_score(s, threshold))
        })
    }
}

/// Fields of a record entered by hand.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub training_course: String,
    pub completion_date: NaiveDate,
    pub score: f64,
}
