//! Perceptual k-means over a per-pixel Lab color list.
//!
//! Seeding takes the first `k` colors verbatim, so the initial centroids are
//! biased toward whatever comes first in the source buffer (usually the top
//! rows of the image). Duplicates among those seeds leave clusters empty on
//! the first pass; empty clusters are reseeded per [`ReseedPolicy`].
//!
//! Cost is `O(iterations * pixels * k)` with no pre-reduction of the input.

use std::collections::HashSet;

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::IteratorRandom;

use crate::color::{DistanceMetric, Opacity, PerceptualColor, Pixel, to_device};
use crate::config::{QuantizeOptions, ReseedPolicy};
use crate::error::QuantizeError;

/// Centroids plus a per-pixel cluster index (`None` for transparent pixels).
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterResult {
    centroids: Vec<PerceptualColor>,
    assignments: Vec<Option<usize>>,
    iterations: usize,
    converged: bool,
}

impl ClusterResult {
    /// All pixels ignored, no centroids.
    fn empty(len: usize) -> Self {
        Self {
            centroids: Vec::new(),
            assignments: vec![None; len],
            iterations: 0,
            converged: true,
        }
    }

    pub fn centroids(&self) -> &[PerceptualColor] {
        &self.centroids
    }

    /// Index-aligned with the analysed pixel buffer. Every `Some(i)` has
    /// `i < centroids().len()`.
    pub fn assignments(&self) -> &[Option<usize>] {
        &self.assignments
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Device color of each centroid, in cluster order.
    pub fn palette(&self) -> Vec<Pixel> {
        self.centroids.iter().map(to_device).collect()
    }

    /// `RRGGBB` hex of each centroid, in cluster order.
    pub fn palette_hex(&self) -> Vec<String> {
        self.palette().into_iter().map(Pixel::hex).collect()
    }
}

/// Running Lab sum for one cluster.
#[derive(Clone, Copy, Default)]
struct LabSum {
    l: f64,
    a: f64,
    b: f64,
    count: usize,
}

impl LabSum {
    #[inline]
    fn add(&mut self, color: &PerceptualColor) {
        let lab = color.lab();
        self.l += f64::from(lab.l);
        self.a += f64::from(lab.a);
        self.b += f64::from(lab.b);
        self.count += 1;
    }

    fn mean(&self) -> Option<PerceptualColor> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(PerceptualColor::new(
            (self.l / n) as f32,
            (self.a / n) as f32,
            (self.b / n) as f32,
            Opacity::Opaque,
        ))
    }
}

/// Number of distinct opaque colors in `colors`.
pub fn distinct_opaque(colors: &[PerceptualColor]) -> usize {
    colors
        .iter()
        .filter(|c| c.is_opaque())
        .map(PerceptualColor::axis_bits)
        .collect::<HashSet<_>>()
        .len()
}

/// Accepts `1..=available`. An image with no opaque colors accepts any
/// positive `k`; clustering it is a no-op.
pub fn validate_bucket_count(requested: i64, available: usize) -> Result<usize, QuantizeError> {
    let invalid = QuantizeError::InvalidBucketCount {
        requested,
        available,
    };
    let k = usize::try_from(requested).map_err(|_| invalid.clone())?;
    if k == 0 || (available > 0 && k > available) {
        return Err(invalid);
    }
    Ok(k)
}

/// Perceptual k-means settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KMeans {
    pub max_iterations: usize,
    pub threshold: f32,
    pub metric: DistanceMetric,
    pub reseed: ReseedPolicy,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::from_options(&QuantizeOptions::default())
    }
}

impl KMeans {
    pub fn from_options(options: &QuantizeOptions) -> Self {
        Self {
            max_iterations: options.max_iterations,
            threshold: options.convergence_threshold,
            metric: options.metric,
            reseed: options.reseed,
        }
    }

    /// Partitions the opaque entries of `colors` into `k` clusters.
    ///
    /// `k` is validated against the distinct opaque colors before any
    /// iteration runs.
    pub fn cluster<R: Rng + ?Sized>(
        &self,
        colors: &[PerceptualColor],
        k: usize,
        rng: &mut R,
    ) -> Result<ClusterResult, QuantizeError> {
        if self.max_iterations == 0 {
            return Err(QuantizeError::InvalidOptions(
                "max_iterations must be at least 1".into(),
            ));
        }
        let available = distinct_opaque(colors);
        let k = validate_bucket_count(i64::try_from(k).unwrap_or(i64::MAX), available)?;
        if available == 0 {
            info!("no opaque pixels, skipping clustering");
            return Ok(ClusterResult::empty(colors.len()));
        }

        // k <= distinct opaque colors <= colors.len()
        let mut centroids: Vec<PerceptualColor> = colors[..k].to_vec();
        let mut assignments: Vec<Option<usize>> = vec![None; colors.len()];
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..self.max_iterations {
            iterations = iteration + 1;
            self.assign(colors, &centroids, &mut assignments);

            let mut sums = vec![LabSum::default(); k];
            for (color, slot) in colors.iter().zip(&assignments) {
                if let Some(index) = *slot {
                    sums[index].add(color);
                }
            }

            let mut reseeded = 0;
            let mut next = Vec::with_capacity(k);
            for sum in &sums {
                match sum.mean() {
                    Some(mean) => next.push(mean),
                    None => {
                        reseeded += 1;
                        next.push(self.reseed_centroid(colors, rng));
                    }
                }
            }
            if reseeded > 0 {
                warn!("iteration {iteration}: reseeded {reseeded} empty cluster(s)");
            }

            let moved = next
                .iter()
                .zip(&centroids)
                .filter(|(new, old)| self.metric.distance(new, old) >= self.threshold)
                .count();
            debug!("iteration {iteration}: {moved}/{k} centroids moved");
            centroids = next;

            if moved == 0 {
                converged = true;
                break;
            }
        }

        info!("k-means k={k}: {iterations} iteration(s), converged={converged}");
        Ok(ClusterResult {
            centroids,
            assignments,
            iterations,
            converged,
        })
    }

    /// Nearest centroid for each opaque color; ties go to the lowest index.
    fn assign(
        &self,
        colors: &[PerceptualColor],
        centroids: &[PerceptualColor],
        assignments: &mut [Option<usize>],
    ) {
        for (color, slot) in colors.iter().zip(assignments.iter_mut()) {
            if !color.is_opaque() {
                *slot = None;
                continue;
            }
            let mut best = 0;
            let mut best_dist = f32::INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let dist = self.metric.distance(color, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = index;
                }
            }
            *slot = Some(best);
        }
    }

    fn reseed_centroid<R: Rng + ?Sized>(&self, colors: &[PerceptualColor], rng: &mut R) -> PerceptualColor {
        let picked = match self.reseed {
            ReseedPolicy::AnyPixel => None,
            ReseedPolicy::OpaquePixel => colors.iter().filter(|c| c.is_opaque()).choose(rng),
        };
        match picked {
            Some(color) => *color,
            None => colors[rng.random_range(0..colors.len())],
        }
    }
}

/// [`KMeans::cluster`] with default settings and `max_iterations`.
pub fn cluster<R: Rng + ?Sized>(
    colors: &[PerceptualColor],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<ClusterResult, QuantizeError> {
    KMeans {
        max_iterations,
        ..KMeans::default()
    }
    .cluster(colors, k, rng)
}
