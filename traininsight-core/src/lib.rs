//! # traininsight-core: HR training analytics and employee segmentation
//!
//! Turns a table of training events into dashboard figures and a stable,
//! performance-ranked grouping of employees:
//!
//! 1. **Aggregate** per-event records into one feature vector per employee
//! 2. **Standardize** the selected features
//! 3. **Partition** with seeded k-means
//! 4. **Rank** clusters by mean score and attach human-readable labels
//!
//! It also suggests untaken catalog courses per employee ([`recommend()`]).
//!
//! Everything here is synchronous and free of I/O. Reading and writing record
//! files is left to the caller.

pub mod analytics;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod error;
pub mod features;
pub mod filter;
pub mod generator;
pub mod pipeline;
pub mod recommend;
pub mod record;

pub use catalog::{Catalog, CourseOffering};
pub use cluster::{KMeansConfig, LabelScheme, Partition};
pub use config::{
    ConfigOverrides, GeneratorConfig, GeneratorOverrides, InsightConfig, RecommendConfig,
    SegmentationConfig, SegmentationOverrides, config_exists, load_config,
};
pub use error::{Diagnostic, InsightError, InvalidScore, Severity};
pub use features::{ClusterFeature, EmployeeFeatureVector, StandardScaler, aggregate};
pub use filter::RecordFilter;
pub use pipeline::{ClusterAssignment, ClusterSummary, SegmentationReport, Segmenter, segment};
pub use recommend::{EmployeeProfile, Recommendation, recommend};
pub use record::{NewRecord, RawScore, TrainingRecord, TrainingStatus};
