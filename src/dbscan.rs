//! Density-based merging of weighted points.
//!
//! K-means has no way to fuse two centroids that ended up next to each other.
//! Running DBSCAN over the centroids, with the cluster weights as point mass,
//! collapses such near-duplicates into a single weighted average.

use std::collections::VecDeque;

use palette::Srgb;
use tracing::debug;

use crate::error::{PaletteError, Result};
use crate::kmeans::distance_squared;

/// Default merge radius in normalized RGB units.
///
/// Tuned by eye: larger values start fusing distinct accents, smaller values
/// leave obvious duplicates in place.
pub const DEFAULT_MERGE_DISTANCE: f32 = 0.1;

/// Merged clusters, parallel arrays in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedClusters {
    pub centroids: Vec<Srgb<f32>>,
    pub weights: Vec<f32>,
}

impl MergedClusters {
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }
}

struct Scan<'a> {
    points: &'a [Srgb<f32>],
    weights: &'a [f32],
    epsilon_squared: f32,
    min_points: usize,
    cluster_ids: Vec<Option<usize>>,
    next_cluster: usize,
}

impl Scan<'_> {
    fn region(&self, origin: usize) -> Vec<usize> {
        let center = self.points[origin];
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| distance_squared(center, **p) <= self.epsilon_squared)
            .map(|(i, _)| i)
            .collect()
    }

    fn is_core(&self, seeds: &[usize]) -> bool {
        seeds.len() > self.min_points
    }

    /// Grow a cluster from `origin`, returning its weighted centroid and mass,
    /// or `None` if `origin` is not a core point.
    fn expand(&mut self, origin: usize) -> Option<(Srgb<f32>, f32)> {
        let seeds = self.region(origin);
        if !self.is_core(&seeds) {
            return None;
        }

        let id = self.next_cluster;
        self.next_cluster += 1;

        let mut weighted = [0.0f32; 3];
        let mut plain = [0.0f32; 3];
        let mut mass = 0.0f32;
        let mut members = 0usize;

        let mut queue: VecDeque<usize> = seeds.into();
        while let Some(index) = queue.pop_front() {
            if self.cluster_ids[index].is_some() {
                continue;
            }
            self.cluster_ids[index] = Some(id);

            let point = self.points[index];
            let weight = self.weights[index];
            weighted[0] += point.red * weight;
            weighted[1] += point.green * weight;
            weighted[2] += point.blue * weight;
            plain[0] += point.red;
            plain[1] += point.green;
            plain[2] += point.blue;
            mass += weight;
            members += 1;

            let neighbours = self.region(index);
            if self.is_core(&neighbours) {
                let unclassified = neighbours
                    .into_iter()
                    .filter(|&i| self.cluster_ids[i].is_none());
                queue.extend(unclassified);
            }
        }

        let centroid = if mass > 0.0 {
            Srgb::new(weighted[0] / mass, weighted[1] / mass, weighted[2] / mass)
        } else {
            let n = members as f32;
            Srgb::new(plain[0] / n, plain[1] / n, plain[2] / n)
        };
        Some((centroid, mass))
    }
}

/// Merge `points` that lie within `epsilon` of each other.
///
/// A point is a core point when more than `min_points` points (itself
/// included) lie within `epsilon`. With `min_points == 0` every point is core,
/// so isolated points survive as singleton clusters and the total weight is
/// preserved. Points that never join a cluster are dropped.
pub fn merge(
    points: &[Srgb<f32>],
    weights: &[f32],
    epsilon: f32,
    min_points: usize,
) -> Result<MergedClusters> {
    if points.len() != weights.len() {
        return Err(PaletteError::InvalidArgument(format!(
            "got {} points but {} weights",
            points.len(),
            weights.len()
        )));
    }
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(PaletteError::InvalidArgument(format!(
            "merge distance must be a finite non-negative number, got {epsilon}"
        )));
    }

    let mut scan = Scan {
        points,
        weights,
        epsilon_squared: epsilon * epsilon,
        min_points,
        cluster_ids: vec![None; points.len()],
        next_cluster: 0,
    };

    let mut merged = MergedClusters::default();
    for origin in 0..points.len() {
        if scan.cluster_ids[origin].is_some() {
            continue;
        }
        if let Some((centroid, mass)) = scan.expand(origin) {
            merged.centroids.push(centroid);
            merged.weights.push(mass);
        }
    }

    debug!(before = points.len(), after = merged.len(), epsilon, "merged clusters");
    Ok(merged)
}
