//! Employee clustering: raw partitioning and performance ranking.

pub mod kmeans;
pub mod rank;

pub use kmeans::{KMeansConfig, Partition};
pub use rank::{LabelScheme, RawClusterStats};
