use palette::Srgb;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{PaletteError, Result};

/// Upper bound on refinement passes. Convergence normally happens long before
/// this; the cap only guards against floating-point oscillation.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Populated clusters left after k-means converged.
///
/// `centroids` and `counts` are parallel and never contain an empty cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KMeansResult {
    pub centroids: Vec<Srgb<f32>>,
    pub counts: Vec<usize>,
}

impl KMeansResult {
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Fraction of all samples owned by each cluster.
    pub fn weights(&self) -> Vec<f32> {
        let total: usize = self.counts.iter().sum();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&count| count as f32 / total as f32)
            .collect()
    }
}

#[inline(always)]
pub(crate) fn distance_squared(a: Srgb<f32>, b: Srgb<f32>) -> f32 {
    let dr = a.red - b.red;
    let dg = a.green - b.green;
    let db = a.blue - b.blue;
    dr * dr + dg * dg + db * db
}

/// Partition `points` into at most `k` clusters.
///
/// Points start out spread round-robin over the clusters from a random
/// offset, then centroids and assignments are refined until no point moves.
/// Clusters that lose all their members are dropped, so the result may hold
/// fewer than `k` entries.
pub fn kmeans<R: Rng + ?Sized>(
    points: &[Srgb<f32>],
    k: usize,
    rng: &mut R,
) -> Result<KMeansResult> {
    kmeans_capped(points, k, DEFAULT_MAX_ITERATIONS, rng)
}

/// Same as [`kmeans`] with an explicit iteration cap.
pub fn kmeans_capped<R: Rng + ?Sized>(
    points: &[Srgb<f32>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<KMeansResult> {
    if k == 0 {
        return Err(PaletteError::InvalidArgument(
            "cluster count must be at least 1".into(),
        ));
    }
    if points.is_empty() {
        return Ok(KMeansResult::default());
    }

    let offset = rng.random_range(0..k);
    let mut assignments: Vec<usize> = (0..points.len()).map(|i| (i + offset) % k).collect();

    let mut active = k;
    let mut sums = vec![[0.0f32; 3]; k];
    let mut counts = vec![0usize; k];
    let mut centroids: Vec<Srgb<f32>> = Vec::with_capacity(k);
    let mut remap = vec![0usize; k];

    let mut iteration = 0;
    loop {
        iteration += 1;

        // Accumulate members per active cluster.
        sums[..active].fill([0.0; 3]);
        counts[..active].fill(0);
        for (point, &cluster) in points.iter().zip(&assignments) {
            let sum = &mut sums[cluster];
            sum[0] += point.red;
            sum[1] += point.green;
            sum[2] += point.blue;
            counts[cluster] += 1;
        }

        // Compact away empty clusters before dividing.
        let mut kept = 0;
        for cluster in 0..active {
            if counts[cluster] == 0 {
                continue;
            }
            remap[cluster] = kept;
            sums[kept] = sums[cluster];
            counts[kept] = counts[cluster];
            kept += 1;
        }
        if kept != active {
            debug!(iteration, from = active, to = kept, "pruned empty clusters");
            for cluster in assignments.iter_mut() {
                *cluster = remap[*cluster];
            }
            active = kept;
        }

        centroids.clear();
        centroids.extend(sums[..active].iter().zip(&counts[..active]).map(|(sum, &count)| {
            let n = count as f32;
            Srgb::new(sum[0] / n, sum[1] / n, sum[2] / n)
        }));

        let mut moved = 0usize;
        for (point, cluster) in points.iter().zip(assignments.iter_mut()) {
            // Ascending scan, strict comparison: the lowest index wins ties.
            let mut best = 0;
            let mut best_dist = distance_squared(*point, centroids[0]);
            for (candidate, centroid) in centroids.iter().enumerate().skip(1) {
                let dist = distance_squared(*point, *centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = candidate;
                }
            }
            if best != *cluster {
                *cluster = best;
                moved += 1;
            }
        }

        if moved == 0 {
            debug!(iteration, clusters = active, "k-means converged");
            break;
        }
        if iteration >= max_iterations {
            warn!(iteration, moved, "k-means hit the iteration cap before converging");
            return Ok(recount(points, &assignments, active));
        }
    }

    Ok(KMeansResult {
        centroids,
        counts: counts[..active].to_vec(),
    })
}

/// Rebuild centroids and counts from the current assignments, used when the
/// loop stops with points still moving.
fn recount(points: &[Srgb<f32>], assignments: &[usize], active: usize) -> KMeansResult {
    let mut sums = vec![[0.0f32; 3]; active];
    let mut counts = vec![0usize; active];
    for (point, &cluster) in points.iter().zip(assignments) {
        sums[cluster][0] += point.red;
        sums[cluster][1] += point.green;
        sums[cluster][2] += point.blue;
        counts[cluster] += 1;
    }

    let mut result = KMeansResult::default();
    for (sum, count) in sums.into_iter().zip(counts) {
        if count == 0 {
            continue;
        }
        let n = count as f32;
        result.centroids.push(Srgb::new(sum[0] / n, sum[1] / n, sum[2] / n));
        result.counts.push(count);
    }
    result
}
