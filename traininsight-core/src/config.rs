//! Configuration system for TrainInsight.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/traininsight/config.toml` and/or
//! `.traininsight/config.toml` in the workspace directory.

use crate::catalog::Catalog;
use crate::cluster::rank::LabelScheme;
use crate::error::InsightError;
use crate::features::ClusterFeature;
use crate::record::{MAX_SCORE, MIN_SCORE};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Feature aggregation and clustering.
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    /// Synthetic record generation.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Departments and courses.
    #[serde(default)]
    pub catalog: Catalog,
    /// Course recommendation weights.
    #[serde(default)]
    pub recommend: RecommendConfig,
}

impl InsightConfig {
    pub fn validate(&self) -> Result<(), InsightError> {
        self.segmentation.validate()?;
        self.generator.validate()?;
        self.catalog.validate()?;
        self.recommend.validate()
    }
}

/// Settings consumed by the segmentation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Number of clusters (k).
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,
    /// Score at or above which a record without a status counts as completed.
    #[serde(default = "default_threshold")]
    pub score_completion_threshold: f64,
    /// Refinement iteration cap for each partitioning run.
    #[serde(default = "default_max_iterations")]
    pub max_partition_iterations: usize,
    /// Ordered labels, best cluster first. Must hold exactly `cluster_count` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_scheme: Option<Vec<String>>,
    /// Seed for centroid initialization.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of seeded restarts; the tightest partition wins.
    #[serde(default = "default_n_init")]
    pub n_init: usize,
    /// Features fed to the partitioner.
    #[serde(default = "default_features")]
    pub features: Vec<ClusterFeature>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            cluster_count: default_cluster_count(),
            score_completion_threshold: default_threshold(),
            max_partition_iterations: default_max_iterations(),
            label_scheme: None,
            seed: default_seed(),
            n_init: default_n_init(),
            features: default_features(),
        }
    }
}

fn default_cluster_count() -> usize {
    3
}

fn default_threshold() -> f64 {
    60.0
}

fn default_max_iterations() -> usize {
    300
}

fn default_seed() -> u64 {
    42
}

fn default_n_init() -> usize {
    10
}

fn default_features() -> Vec<ClusterFeature> {
    ClusterFeature::DEFAULT.to_vec()
}

impl SegmentationConfig {
    pub fn with_cluster_count(mut self, k: usize) -> Self {
        self.cluster_count = k;
        self
    }

    pub fn with_label_scheme(mut self, labels: Vec<String>) -> Self {
        self.label_scheme = Some(labels);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), InsightError> {
        if self.cluster_count == 0 {
            return Err(InsightError::config("cluster_count must be at least 1"));
        }
        check_threshold(self.score_completion_threshold)?;
        if self.max_partition_iterations == 0 {
            return Err(InsightError::config(
                "max_partition_iterations must be at least 1",
            ));
        }
        if self.n_init == 0 {
            return Err(InsightError::config("n_init must be at least 1"));
        }
        if self.features.is_empty() {
            return Err(InsightError::config("at least one clustering feature is required"));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.features.iter().find(|f| !seen.insert(**f)) {
            return Err(InsightError::config(format!(
                "clustering feature listed twice: {}",
                dup.name()
            )));
        }
        self.labels().map(|_| ())
    }

    /// Resolve the label scheme for the configured cluster count.
    pub fn labels(&self) -> Result<LabelScheme, InsightError> {
        match &self.label_scheme {
            Some(labels) => LabelScheme::explicit(labels.clone(), self.cluster_count),
            None => Ok(LabelScheme::default_for(self.cluster_count)),
        }
    }
}

/// Settings for the synthetic record generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_employees")]
    pub employees: usize,
    #[serde(default = "default_min_trainings")]
    pub min_trainings: usize,
    #[serde(default = "default_max_trainings")]
    pub max_trainings: usize,
    #[serde(default = "default_min_score")]
    pub min_score: u32,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    /// Completion dates fall within this many days before the reference date.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_threshold")]
    pub score_completion_threshold: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            employees: default_employees(),
            min_trainings: default_min_trainings(),
            max_trainings: default_max_trainings(),
            min_score: default_min_score(),
            max_score: default_max_score(),
            window_days: default_window_days(),
            score_completion_threshold: default_threshold(),
            seed: default_seed(),
        }
    }
}

fn default_employees() -> usize {
    100
}

fn default_min_trainings() -> usize {
    1
}

fn default_max_trainings() -> usize {
    3
}

fn default_min_score() -> u32 {
    50
}

fn default_max_score() -> u32 {
    100
}

fn default_window_days() -> u32 {
    365
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), InsightError> {
        if self.min_trainings > self.max_trainings {
            return Err(InsightError::config(
                "min_trainings must not exceed max_trainings",
            ));
        }
        if self.min_score > self.max_score {
            return Err(InsightError::config("min_score must not exceed max_score"));
        }
        if f64::from(self.max_score) > MAX_SCORE {
            return Err(InsightError::config("max_score must not exceed 100"));
        }
        check_threshold(self.score_completion_threshold)
    }
}

/// Weights and boosts for course recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_completion_weight")]
    pub completion_weight: f64,
    #[serde(default = "default_cost_weight")]
    pub cost_weight: f64,
    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f64,
    /// Added when a course targets the employee's department.
    #[serde(default = "default_department_boost")]
    pub department_boost: f64,
    /// Added when a course targets the employee's section.
    #[serde(default = "default_section_boost")]
    pub section_boost: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            completion_weight: default_completion_weight(),
            cost_weight: default_cost_weight(),
            popularity_weight: default_popularity_weight(),
            department_boost: default_department_boost(),
            section_boost: default_section_boost(),
            top_n: default_top_n(),
        }
    }
}

fn default_completion_weight() -> f64 {
    0.50
}

fn default_cost_weight() -> f64 {
    0.35
}

fn default_popularity_weight() -> f64 {
    0.15
}

fn default_department_boost() -> f64 {
    2.0
}

fn default_section_boost() -> f64 {
    1.5
}

fn default_top_n() -> usize {
    6
}

impl RecommendConfig {
    pub fn validate(&self) -> Result<(), InsightError> {
        let weights = [
            ("completion_weight", self.completion_weight),
            ("cost_weight", self.cost_weight),
            ("popularity_weight", self.popularity_weight),
            ("department_boost", self.department_boost),
            ("section_boost", self.section_boost),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(InsightError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-invocation settings layered on top of every other configuration source.
///
/// Only fields that are `Some` take effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigOverrides {
    pub segmentation: SegmentationOverrides,
    pub generator: GeneratorOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_scheme: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_partition_iterations: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn check_threshold(threshold: f64) -> Result<(), InsightError> {
    if !threshold.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&threshold) {
        return Err(InsightError::config(format!(
            "score_completion_threshold must be within 0-100, got {threshold}"
        )));
    }
    Ok(())
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `TRAININSIGHT_`)
/// 3. Workspace-local config (`.traininsight/config.toml`)
/// 4. User config (`~/.config/traininsight/config.toml`)
/// 5. Built-in defaults
///
/// Overriding the cluster count without labels drops a configured label
/// scheme of the wrong length, so the default labels apply.
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<InsightConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(InsightConfig::default()));

    if let Some(dirs) = project_dirs() {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // TRAININSIGHT_SEGMENTATION__CLUSTER_COUNT, TRAININSIGHT_GENERATOR__SEED, ...
    figment = figment.merge(Env::prefixed("TRAININSIGHT_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let mut config: InsightConfig = figment.extract().map_err(Box::new)?;
    if let Some(seg) = overrides.map(|o| &o.segmentation)
        && let Some(k) = seg.cluster_count
        && seg.label_scheme.is_none()
        && config
            .segmentation
            .label_scheme
            .as_ref()
            .is_some_and(|l| l.len() != k)
    {
        tracing::debug!(clusters = k, "Dropping configured labels sized for another cluster count");
        config.segmentation.label_scheme = None;
    }
    Ok(config)
}

/// Check whether a user-level or workspace-level config file exists.
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if let Some(dirs) = project_dirs() {
        if dirs.config_dir().join("config.toml").exists() {
            return true;
        }
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> std::path::PathBuf {
    workspace.join(".traininsight").join("config.toml")
}

/// Platform directories for user config and logs.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "traininsight", "traininsight")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InsightConfig::default();
        assert_eq!(config.segmentation.cluster_count, 3);
        assert_eq!(config.segmentation.score_completion_threshold, 60.0);
        assert_eq!(config.segmentation.max_partition_iterations, 300);
        assert_eq!(config.segmentation.seed, 42);
        assert_eq!(config.generator.employees, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_clusters_rejected() {
        let config = SegmentationConfig::default().with_cluster_count(0);
        assert!(matches!(config.validate(), Err(InsightError::Config(_))));
    }

    #[test]
    fn test_label_scheme_length_must_match() {
        let config = SegmentationConfig::default()
            .with_cluster_count(2)
            .with_label_scheme(vec!["Top".into(), "Middle".into(), "Bottom".into()]);
        assert!(config.validate().is_err());

        let config = SegmentationConfig::default()
            .with_cluster_count(2)
            .with_label_scheme(vec!["Top".into(), "Rest".into()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let config = SegmentationConfig {
            features: vec![ClusterFeature::AvgScore, ClusterFeature::AvgScore],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generator_bounds() {
        let config = GeneratorConfig {
            min_score: 90,
            max_score: 80,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GeneratorConfig {
            max_score: 150,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_reads_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[segmentation]\ncluster_count = 4\nseed = 7\n\n[generator]\nemployees = 25\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.segmentation.cluster_count, 4);
        assert_eq!(config.segmentation.seed, 7);
        assert_eq!(config.generator.employees, 25);
        assert_eq!(config.segmentation.max_partition_iterations, 300);
        assert!(config_exists(Some(dir.path())));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = InsightConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: InsightConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_overrides_beat_workspace_file_and_keep_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[segmentation]\ncluster_count = 2\nlabel_scheme = [\"Top\", \"Rest\"]\nseed = 7\n\n[generator]\nemployees = 25\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            segmentation: SegmentationOverrides {
                cluster_count: Some(4),
                ..Default::default()
            },
            generator: GeneratorOverrides {
                seed: Some(99),
                ..Default::default()
            },
        };
        let config = load_config(Some(dir.path()), Some(&overrides)).unwrap();
        assert_eq!(config.segmentation.cluster_count, 4);
        assert_eq!(config.segmentation.seed, 7);
        assert_eq!(config.segmentation.label_scheme, None);
        assert_eq!(config.generator.employees, 25);
        assert_eq!(config.generator.seed, 99);
        assert!(config.validate().is_ok());

        let overrides = ConfigOverrides {
            segmentation: SegmentationOverrides {
                cluster_count: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = load_config(Some(dir.path()), Some(&overrides)).unwrap();
        assert_eq!(
            config.segmentation.label_scheme,
            Some(vec!["Top".to_string(), "Rest".to_string()])
        );
    }

    #[test]
    fn test_recommend_weights_must_be_non_negative() {
        let config = RecommendConfig {
            cost_weight: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(RecommendConfig::default().validate().is_ok());
    }
}
