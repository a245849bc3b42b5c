//! CLI subcommand handlers.

use crate::dataset;
use crate::render;
use crate::{Commands, ConfigAction, FilterArgs};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use traininsight_core::analytics;
use traininsight_core::config::{load_config, workspace_config_path};
use traininsight_core::{
    ConfigOverrides, EmployeeProfile, GeneratorOverrides, InsightConfig, NewRecord,
    Recommendation, RecordFilter, SegmentationOverrides, Segmenter, TrainingRecord, aggregate,
    generator, recommend,
};

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    fn note(&self, message: impl AsRef<str>) {
        if !self.quiet && !self.json {
            eprintln!("{}", message.as_ref());
        }
    }
}

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    output: Output,
) -> anyhow::Result<()> {
    if let Commands::Config { action } = command {
        return handle_config(action, workspace, output).await;
    }

    let overrides = command_overrides(&command);
    let config = load_config(Some(workspace), Some(&overrides))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    config.validate()?;

    match command {
        Commands::Generate {
            output: path,
            today: reference,
            ..
        } => handle_generate(&config, &path, reference, output).await,
        Commands::Segment {
            input,
            show,
            output: path,
            filter,
            ..
        } => {
            let segmenter = Segmenter::new(config.segmentation)?;
            handle_segment(&segmenter, &input, filter, show, path.as_deref(), output).await
        }
        Commands::Summary { input, top, filter } => {
            handle_summary(&config, &input, filter, top, output).await
        }
        Commands::Recommend {
            input,
            employee,
            section,
            top,
        } => handle_recommend(&config, &input, &employee, section, top, output).await,
        Commands::Add {
            file,
            employee_id,
            name,
            department,
            course,
            date,
            score,
        } => {
            let new = NewRecord {
                employee_id,
                employee_name: name,
                department,
                training_course: course,
                completion_date: date.unwrap_or_else(today),
                score,
            };
            handle_add(&config, &file, new, output).await
        }
        Commands::Config { .. } => Ok(()),
    }
}

/// Flags that override configuration values for this invocation.
fn command_overrides(command: &Commands) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::default();
    match command {
        Commands::Generate {
            employees, seed, ..
        } => {
            overrides.generator = GeneratorOverrides {
                employees: *employees,
                seed: *seed,
            };
        }
        Commands::Segment {
            clusters,
            labels,
            seed,
            max_iterations,
            ..
        } => {
            overrides.segmentation = SegmentationOverrides {
                cluster_count: *clusters,
                label_scheme: labels.clone(),
                seed: *seed,
                max_partition_iterations: *max_iterations,
            };
        }
        _ => {}
    }
    overrides
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn build_filter(args: FilterArgs) -> RecordFilter {
    RecordFilter {
        department: args.department,
        from: args.from,
        to: args.to,
        statuses: args.status.into_iter().map(Into::into).collect(),
        search: args.search,
    }
}

async fn load_filtered(
    input: &Path,
    filter: FilterArgs,
    threshold: f64,
) -> anyhow::Result<Vec<TrainingRecord>> {
    let records = dataset::load_records(input).await?;
    let filter = build_filter(filter);
    if filter.is_empty() {
        return Ok(records);
    }
    let kept = filter.apply(&records, threshold);
    tracing::info!(total = records.len(), kept = kept.len(), "Applied record filter");
    Ok(kept)
}

async fn handle_generate(
    config: &InsightConfig,
    path: &Path,
    reference: Option<NaiveDate>,
    output: Output,
) -> anyhow::Result<()> {
    let records = generator::generate(
        &config.catalog,
        &config.generator,
        reference.unwrap_or_else(today),
    )?;
    dataset::save_records(path, &records).await?;

    let kpis = analytics::kpis(&records, config.generator.score_completion_threshold);
    output.note(format!(
        "Generated {} records for {} employees -> {}",
        records.len(),
        kpis.total_employees,
        path.display()
    ));
    Ok(())
}

async fn handle_segment(
    segmenter: &Segmenter,
    input: &Path,
    filter: FilterArgs,
    show: usize,
    save_to: Option<&Path>,
    output: Output,
) -> anyhow::Result<()> {
    let threshold = segmenter.config().score_completion_threshold;
    let records = load_filtered(input, filter, threshold).await?;
    let report = segmenter.segment(&records).context("Segmentation failed")?;

    if let Some(path) = save_to {
        dataset::save_report(path, &report).await?;
        output.note(format!("Wrote segmentation to {}", path.display()));
    }

    output.emit(&report, || {
        let mut text = render::segmentation(&report, show);
        let diags = render::diagnostics(&report.diagnostics);
        if !diags.is_empty() {
            text.push('\n');
            text.push_str(&diags);
        }
        text
    })
}

#[derive(Serialize)]
struct Summary {
    kpis: analytics::Kpis,
    departments: Vec<analytics::DepartmentStats>,
    monthly_trend: Vec<analytics::MonthlyCount>,
    top_courses: Vec<analytics::CourseEnrollment>,
    performance: analytics::PerformanceRanking,
}

async fn handle_summary(
    config: &InsightConfig,
    input: &Path,
    filter: FilterArgs,
    top: usize,
    output: Output,
) -> anyhow::Result<()> {
    let threshold = config.segmentation.score_completion_threshold;
    let records = load_filtered(input, filter, threshold).await?;
    let vectors = aggregate(&records, threshold).vectors;

    let summary = Summary {
        kpis: analytics::kpis(&records, threshold),
        departments: analytics::department_stats(&records, threshold),
        monthly_trend: analytics::monthly_trend(&records, threshold),
        top_courses: analytics::top_courses(&records, top),
        performance: analytics::performance_ranking(&vectors, top),
    };

    output.emit(&summary, || {
        [
            render::kpis(&summary.kpis),
            render::departments(&summary.departments),
            render::trend(&summary.monthly_trend),
            render::courses(&summary.top_courses),
            render::ranking(&summary.performance),
        ]
        .join("\n")
    })
}

async fn handle_recommend(
    config: &InsightConfig,
    input: &Path,
    employee_id: &str,
    section: Option<String>,
    top: Option<usize>,
    output: Output,
) -> anyhow::Result<()> {
    let records = dataset::load_records(input).await?;
    let mut profile = EmployeeProfile::from_history(employee_id, &records)?;
    profile.section = section;
    let suggestions = recommend(
        &profile,
        &records,
        &config.catalog,
        &config.recommend,
        config.segmentation.score_completion_threshold,
        top.unwrap_or(config.recommend.top_n),
    );

    #[derive(Serialize)]
    struct Suggestions<'a> {
        employee: &'a EmployeeProfile,
        recommendations: &'a [Recommendation],
    }
    output.emit(
        &Suggestions {
            employee: &profile,
            recommendations: &suggestions,
        },
        || render::recommendations(&profile, &suggestions),
    )
}

async fn handle_add(
    config: &InsightConfig,
    file: &Path,
    new: NewRecord,
    output: Output,
) -> anyhow::Result<()> {
    if !config.catalog.has_department(&new.department) {
        tracing::warn!(department = %new.department, "Department is not in the catalog");
    }
    if !config.catalog.has_course(&new.training_course) {
        tracing::warn!(course = %new.training_course, "Course is not in the catalog");
    }
    let record = TrainingRecord::entry(new, config.segmentation.score_completion_threshold)?;

    let mut records = if file.exists() {
        dataset::load_records(file).await?
    } else {
        Vec::new()
    };
    records.push(record.clone());
    dataset::save_records(file, &records).await?;

    output.emit(&record, || {
        format!(
            "Added {} / {} ({}) to {}\n",
            record.employee_id,
            record.training_course,
            record
                .status
                .map(|s| s.as_str())
                .unwrap_or("unknown status"),
            file.display()
        )
    })
}

async fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    output: Output,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                output.note(format!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                ));
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                tokio::fs::create_dir_all(dir).await?;
            }
            let toml_str = toml::to_string_pretty(&InsightConfig::default())?;
            tokio::fs::write(&config_path, &toml_str).await?;
            output.note(format!(
                "Created default configuration at: {}",
                config_path.display()
            ));
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            output.emit(&config, || toml::to_string_pretty(&config).unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusArg;
    use traininsight_core::TrainingStatus;

    #[test]
    fn test_build_filter_maps_statuses() {
        let args = FilterArgs {
            department: Some("Sales".into()),
            status: vec![StatusArg::InProgress],
            ..Default::default()
        };
        let filter = build_filter(args);
        assert_eq!(filter.department.as_deref(), Some("Sales"));
        assert_eq!(filter.statuses, vec![TrainingStatus::InProgress]);
    }

    #[tokio::test]
    async fn test_generate_then_segment_files() {
        let dir = tempfile::tempdir().unwrap();
        let records_path = dir.path().join("records.csv");
        let report_path = dir.path().join("clusters.json");
        let quiet = Output {
            json: false,
            quiet: true,
        };

        let mut config = InsightConfig::default();
        config.generator.employees = 30;
        config.generator.seed = 11;
        handle_generate(
            &config,
            &records_path,
            NaiveDate::from_ymd_opt(2025, 6, 1),
            quiet,
        )
        .await
        .unwrap();

        let segmenter = Segmenter::new(Default::default()).unwrap();
        let json_out = Output {
            json: true,
            quiet: true,
        };
        handle_segment(
            &segmenter,
            &records_path,
            FilterArgs::default(),
            3,
            Some(&report_path),
            json_out,
        )
        .await
        .unwrap();

        let saved: traininsight_core::SegmentationReport =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(saved.assignments.len(), 30);
        assert_eq!(saved.summaries.len(), 3);
    }

    #[tokio::test]
    async fn test_add_appends_record() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("records.json");
        let config = InsightConfig::default();
        let quiet = Output {
            json: false,
            quiet: true,
        };
        for score in [72.0, 41.0] {
            let new = NewRecord {
                employee_id: "EMP0500".into(),
                employee_name: "Rosa Silva".into(),
                department: "Finance".into(),
                training_course: "Financial Modeling".into(),
                completion_date: NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
                score,
            };
            handle_add(&config, &file, new, quiet).await.unwrap();
        }
        let records = dataset::load_records(&file).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status, Some(TrainingStatus::InProgress));

        let bad = NewRecord {
            employee_id: String::new(),
            employee_name: "Nobody".into(),
            department: "Finance".into(),
            training_course: "Financial Modeling".into(),
            completion_date: NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
            score: 50.0,
        };
        assert!(handle_add(&config, &file, bad, quiet).await.is_err());
    }

    #[test]
    fn test_segment_flags_become_overrides() {
        let command = Commands::Segment {
            input: "records.csv".into(),
            clusters: Some(4),
            labels: None,
            seed: Some(5),
            max_iterations: None,
            show: 10,
            output: None,
            filter: FilterArgs::default(),
        };
        let overrides = command_overrides(&command);
        assert_eq!(overrides.segmentation.cluster_count, Some(4));
        assert_eq!(overrides.segmentation.seed, Some(5));
        assert_eq!(overrides.segmentation.max_partition_iterations, None);
        assert_eq!(overrides.generator, GeneratorOverrides::default());
    }

    #[tokio::test]
    async fn test_recommend_skips_taken_courses() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("records.json");
        let records = vec![
            TrainingRecord {
                employee_id: "EMP0001".into(),
                employee_name: "Ana Diaz".into(),
                department: "Finance".into(),
                training_course: "Financial Modeling".into(),
                completion_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                score: traininsight_core::RawScore::Number(88.0),
                status: None,
            },
            TrainingRecord {
                employee_id: "EMP0002".into(),
                employee_name: "Ben Okafor".into(),
                department: "Sales".into(),
                training_course: "Regulatory Compliance".into(),
                completion_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                score: traininsight_core::RawScore::Number(91.0),
                status: None,
            },
        ];
        dataset::save_records(&file, &records).await.unwrap();

        let config = InsightConfig::default();
        let quiet = Output {
            json: true,
            quiet: true,
        };
        handle_recommend(&config, &file, "EMP0001", None, Some(3), quiet)
            .await
            .unwrap();
        assert!(
            handle_recommend(&config, &file, "EMP9999", None, None, quiet)
                .await
                .is_err()
        );

        let profile = EmployeeProfile::from_history("EMP0001", &records).unwrap();
        let recs = recommend(&profile, &records, &config.catalog, &config.recommend, 60.0, 3);
        assert_eq!(recs[0].course, "Regulatory Compliance");
        assert!(recs.iter().all(|r| r.course != "Financial Modeling"));
    }
}
