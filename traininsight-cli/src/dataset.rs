//! Reading and writing record tables (CSV or JSON, chosen by extension).

use anyhow::{Context, bail};
use chrono::NaiveDate;
use std::path::Path;
use traininsight_core::{RawScore, SegmentationReport, TrainingRecord, TrainingStatus};

pub const RECORD_COLUMNS: [&str; 7] = [
    "employee_id",
    "employee_name",
    "department",
    "training_course",
    "completion_date",
    "score",
    "status",
];

const ASSIGNMENT_COLUMNS: [&str; 9] = [
    "employee_id",
    "employee_name",
    "department",
    "cluster_index",
    "cluster_label",
    "avg_score",
    "total_trainings",
    "completed_trainings",
    "completion_rate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Unsupported file type for {} (expected .csv or .json)",
                path.display()
            ),
        }
    }
}

/// Load training records from a CSV or JSON file.
pub async fn load_records(path: &Path) -> anyhow::Result<Vec<TrainingRecord>> {
    let format = Format::from_path(path)?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records = match format {
        Format::Csv => parse_records_csv(&content),
        Format::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "Loaded training records");
    Ok(records)
}

/// Write training records to a CSV or JSON file.
pub async fn save_records(path: &Path, records: &[TrainingRecord]) -> anyhow::Result<()> {
    let content = match Format::from_path(path)? {
        Format::Csv => records_to_csv(records),
        Format::Json => serde_json::to_string_pretty(records)?,
    };
    write_atomic(path, &content).await
}

/// Write a segmentation result: the assignment table as CSV, or the full report as JSON.
pub async fn save_report(path: &Path, report: &SegmentationReport) -> anyhow::Result<()> {
    let content = match Format::from_path(path)? {
        Format::Csv => assignments_to_csv(report),
        Format::Json => serde_json::to_string_pretty(report)?,
    };
    write_atomic(path, &content).await
}

async fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}

pub fn parse_records_csv(content: &str) -> anyhow::Result<Vec<TrainingRecord>> {
    let mut rows = split_csv_records(content).into_iter();
    let header: Vec<String> = rows
        .next()
        .map(|(_, fields)| fields)
        .ok_or_else(|| anyhow::anyhow!("Empty CSV file"))?
        .into_iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let column = |name: &str| header.iter().position(|h| h == name);
    let required = |name: &str| {
        column(name).ok_or_else(|| anyhow::anyhow!("CSV is missing the {name:?} column"))
    };
    let id_col = required("employee_id")?;
    let name_col = required("employee_name")?;
    let dept_col = required("department")?;
    let course_col = required("training_course")?;
    let date_col = required("completion_date")?;
    let score_col = column("score");
    let status_col = column("status");

    let mut records = Vec::new();
    for (line_no, fields) in rows {
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let field = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");

        let date_text = field(date_col);
        let completion_date = parse_date(date_text)
            .with_context(|| format!("line {line_no}: bad completion_date {date_text:?}"))?;

        let score = match score_col.map(field).unwrap_or("") {
            "" => RawScore::Missing,
            s => s
                .parse::<f64>()
                .map(RawScore::Number)
                .unwrap_or_else(|_| RawScore::Text(s.to_string())),
        };

        let status = match status_col.map(field).unwrap_or("") {
            "" => None,
            s => {
                let parsed = TrainingStatus::parse(s);
                if parsed.is_none() {
                    tracing::warn!(line = line_no, status = s, "Unknown status, deriving from score");
                }
                parsed
            }
        };

        records.push(TrainingRecord {
            employee_id: field(id_col).to_string(),
            employee_name: field(name_col).to_string(),
            department: field(dept_col).to_string(),
            training_course: field(course_col).to_string(),
            completion_date,
            score,
            status,
        });
    }
    Ok(records)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(text: &str) -> anyhow::Result<NaiveDate> {
    let date_part = text.split(['T', ' ']).next().unwrap_or(text);
    Ok(NaiveDate::parse_from_str(date_part, "%Y-%m-%d")?)
}

/// Split CSV content into rows, each tagged with the 1-based line it starts on.
///
/// Honors double-quoted fields, `""` escapes and line breaks inside quotes.
pub fn split_csv_records(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                rows.push((row_start, std::mem::take(&mut fields)));
                line += 1;
                row_start = line;
            }
            '\n' => {
                current.push(c);
                line += 1;
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        rows.push((row_start, fields));
    }
    rows
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_csv(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn records_to_csv(records: &[TrainingRecord]) -> String {
    let mut out = csv_row(RECORD_COLUMNS);
    out.push('\n');
    for r in records {
        let row = [
            r.employee_id.clone(),
            r.employee_name.clone(),
            r.department.clone(),
            r.training_course.clone(),
            r.completion_date.format("%Y-%m-%d").to_string(),
            r.score.to_string(),
            r.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        ];
        out.push_str(&csv_row(row));
        out.push('\n');
    }
    out
}

pub fn assignments_to_csv(report: &SegmentationReport) -> String {
    let mut out = csv_row(ASSIGNMENT_COLUMNS);
    out.push('\n');
    for a in &report.assignments {
        let row = [
            a.employee_id.clone(),
            a.employee_name.clone(),
            a.department.clone(),
            a.cluster_index.to_string(),
            a.cluster_label.clone(),
            format!("{:.2}", a.avg_score),
            a.total_trainings.to_string(),
            a.completed_trainings.to_string(),
            format!("{:.3}", a.completion_rate),
        ];
        out.push_str(&csv_row(row));
        out.push('\n');
    }
    out
}
