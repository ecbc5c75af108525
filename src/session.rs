//! Per-image state: the decoded pixels and their memoized analysis.
//!
//! A session is created when an image is loaded and replaced, never mutated,
//! when the next one is. Each [`QuantizeSession::render`] re-runs clustering
//! onward against the cached analysis.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::{FrequencyTable, ImageAnalysis, analyze};
use crate::art::{ArtCanvas, Shape, generate_art};
use crate::config::QuantizeOptions;
use crate::error::QuantizeError;
use crate::histogram::{HistogramBar, build_histogram};
use crate::kmeans::{ClusterResult, KMeans};
use crate::quantize::quantize;

/// Everything the drawing side needs after one bucket-count change.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendering {
    pub width: u32,
    pub height: u32,
    /// Quantized RGBA, same length as the session's source buffer.
    pub pixels: Vec<u8>,
    pub clusters: ClusterResult,
    /// Frequencies of the quantized image.
    pub frequencies: FrequencyTable,
    pub histogram: Vec<HistogramBar>,
    pub shapes: Vec<Shape>,
}

impl Rendering {
    pub fn palette_hex(&self) -> Vec<String> {
        self.clusters.palette_hex()
    }
}

#[derive(Clone, Debug)]
pub struct QuantizeSession {
    pixels: Vec<u8>,
    analysis: ImageAnalysis,
    options: QuantizeOptions,
}

impl QuantizeSession {
    /// Validates `options` and the buffer dimensions, then analyses the
    /// buffer once.
    pub fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        options: QuantizeOptions,
    ) -> Result<Self, QuantizeError> {
        options.validate()?;
        let analysis = analyze(&pixels, width, height)?;
        info!(
            "loaded {width}x{height} image: {} distinct opaque colors",
            analysis.distinct_opaque_colors()
        );
        Ok(Self {
            pixels,
            analysis,
            options,
        })
    }

    pub fn analysis(&self) -> &ImageAnalysis {
        &self.analysis
    }

    pub fn options(&self) -> &QuantizeOptions {
        &self.options
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Renders with a generator seeded from `options.seed`, or from OS
    /// entropy when unset.
    pub fn render(&self, buckets: usize) -> Result<Rendering, QuantizeError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.render_with(buckets, &mut rng)
    }

    pub fn render_with<R: Rng + ?Sized>(
        &self,
        buckets: usize,
        rng: &mut R,
    ) -> Result<Rendering, QuantizeError> {
        let width = self.analysis.width();
        let height = self.analysis.height();

        let clusters = KMeans::from_options(&self.options).cluster(self.analysis.colors(), buckets, rng)?;
        let pixels = quantize(&self.pixels, &clusters)?;

        let frequencies = analyze(&pixels, width, height)?.frequencies();
        let histogram = build_histogram(&frequencies, self.options.histogram_extent);
        let canvas = ArtCanvas {
            width: self.options.art_width,
            height: self.options.art_height,
            clamp: self.options.clamp_art_to_canvas,
        };
        let shapes = generate_art(&frequencies, &canvas, rng);
        info!(
            "rendered k={buckets}: {} colors, {} bars, {} shapes",
            frequencies.len(),
            histogram.len(),
            shapes.len()
        );

        Ok(Rendering {
            width,
            height,
            pixels,
            clusters,
            frequencies,
            histogram,
            shapes,
        })
    }
}
