//! Seeded k-means (Lloyd iterations with k-means++ initialization).
//!
//! Every source of randomness flows from [`KMeansConfig::seed`], so identical
//! input and configuration always produce the identical partition.

use crate::error::InsightError;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Partitioning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iterations: usize,
    /// Number of seeded restarts; the lowest-inertia run wins.
    pub n_init: usize,
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: 300,
            n_init: 10,
            seed: 42,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A raw partition. Cluster indices carry no ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub assignments: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Lloyd iterations used by the winning run.
    pub iterations: usize,
    /// Whether the winning run settled before the iteration cap.
    pub converged: bool,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

impl Partition {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &c in &self.assignments {
            sizes[c] += 1;
        }
        sizes
    }
}

/// Partition `points` into `config.k` clusters.
///
/// Fails with [`InsightError::InsufficientData`] when there are fewer points
/// than clusters; no partitioning is attempted in that case.
pub fn fit(points: &[Vec<f64>], config: &KMeansConfig) -> Result<Partition, InsightError> {
    let n = points.len();
    let k = config.k;
    if k == 0 {
        return Err(InsightError::config("cluster count must be at least 1"));
    }
    if n < k {
        return Err(InsightError::InsufficientData {
            employees: n,
            clusters: k,
        });
    }
    if config.max_iterations == 0 || config.n_init == 0 {
        return Err(InsightError::config(
            "max_iterations and n_init must be at least 1",
        ));
    }

    let mut best: Option<Partition> = None;
    for restart in 0..config.n_init {
        let seed = config.seed.wrapping_add(restart as u64);
        let run = fit_single(points, k, config.max_iterations, seed);
        tracing::trace!(restart, seed, inertia = run.inertia, iterations = run.iterations, "k-means run");
        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    best.ok_or_else(|| InsightError::config("no k-means run was performed"))
}

fn fit_single(points: &[Vec<f64>], k: usize, max_iterations: usize, seed: u64) -> Partition {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = kmeans_plus_plus_init(points, k, &mut rng);
    let mut assignments = vec![usize::MAX; points.len()];
    let mut converged = false;
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let previous = assignments.clone();
        for (slot, point) in assignments.iter_mut().zip(points) {
            *slot = nearest_centroid(point, &centroids);
        }
        repair_empty_clusters(points, &mut assignments, &mut centroids);

        // Compared after repair: coincident points keep being re-split the same way.
        if assignments == previous {
            converged = true;
            break;
        }
        centroids = recompute_centroids(points, &assignments, &centroids);
    }

    let inertia: f64 = points
        .iter()
        .zip(&assignments)
        .map(|(p, &c)| squared_distance(p, &centroids[c]))
        .sum();

    Partition {
        assignments,
        centroids,
        iterations,
        converged,
        inertia,
    }
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn kmeans_plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut chosen = vec![false; n];
    let mut centroids = Vec::with_capacity(k);

    let first = rng.gen_range(0..n);
    chosen[first] = true;
    centroids.push(points[first].clone());

    let mut min_dist: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[first]))
        .collect();

    while centroids.len() < k {
        let total: f64 = min_dist.iter().sum();
        let next = if total > 0.0 {
            let target = rng.gen_range(0.0..total);
            let mut cumulative = 0.0;
            let mut pick = None;
            for (i, d) in min_dist.iter().enumerate() {
                cumulative += d;
                if *d > 0.0 && cumulative > target {
                    pick = Some(i);
                    break;
                }
            }
            // Rounding can leave the cumulative sum just short of the target.
            pick.or_else(|| min_dist.iter().rposition(|d| *d > 0.0))
        } else {
            None
        };
        // All remaining points coincide with a chosen centroid.
        let next = next
            .or_else(|| chosen.iter().position(|c| !c))
            .unwrap_or(0);

        chosen[next] = true;
        centroids.push(points[next].clone());
        for (d, p) in min_dist.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &points[next]));
        }
    }

    centroids
}

/// Index of the nearest centroid; ties go to the lower index.
pub fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// Give every empty cluster the point farthest from its own centroid, taken
/// from a cluster that keeps at least one member.
fn repair_empty_clusters(
    points: &[Vec<f64>],
    assignments: &mut [usize],
    centroids: &mut [Vec<f64>],
) {
    let k = centroids.len();
    let mut sizes = vec![0usize; k];
    for &c in assignments.iter() {
        sizes[c] += 1;
    }

    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }
        let mut donor: Option<(usize, f64)> = None;
        for (i, p) in points.iter().enumerate() {
            let c = assignments[i];
            if sizes[c] <= 1 {
                continue;
            }
            let d = squared_distance(p, &centroids[c]);
            if donor.is_none_or(|(_, best)| d > best) {
                donor = Some((i, d));
            }
        }
        let Some((i, _)) = donor else {
            break;
        };
        sizes[assignments[i]] -= 1;
        sizes[empty] += 1;
        assignments[i] = empty;
        centroids[empty] = points[i].clone();
    }
}

fn recompute_centroids(
    points: &[Vec<f64>],
    assignments: &[usize],
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dims = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dims]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (p, &c) in points.iter().zip(assignments) {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(p) {
            *s += v;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
