//! Per-pixel Lab conversion and color counting over a flat RGBA buffer.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::color::{ColorKey, PerceptualColor, Pixel, RECORD_SIZE, to_perceptual};
use crate::error::QuantizeError;

/// Immutable result of analysing one RGBA buffer.
///
/// `colors` is index-aligned with the buffer the analysis was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAnalysis {
    colors: Vec<PerceptualColor>,
    counts: HashMap<ColorKey, usize>,
    opaque_counts: HashMap<ColorKey, usize>,
    width: u32,
    height: u32,
    opaque_pixels: usize,
}

/// Checks `pixels.len() == width * height * 4` without overflowing.
pub fn check_dimensions(pixels: &[u8], width: u32, height: u32) -> Result<(), QuantizeError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(RECORD_SIZE));
    match expected {
        Some(expected) if expected == pixels.len() => Ok(()),
        expected => Err(QuantizeError::DimensionMismatch {
            width,
            height,
            expected: expected.unwrap_or(usize::MAX),
            actual: pixels.len(),
        }),
    }
}

/// Converts every pixel record to Lab and counts colors by [`ColorKey`].
pub fn analyze(pixels: &[u8], width: u32, height: u32) -> Result<ImageAnalysis, QuantizeError> {
    check_dimensions(pixels, width, height)?;

    let n = pixels.len() / RECORD_SIZE;
    let mut colors = Vec::with_capacity(n);
    let mut counts: HashMap<ColorKey, usize> = HashMap::new();
    let mut opaque_counts: HashMap<ColorKey, usize> = HashMap::new();
    let mut opaque_pixels = 0usize;

    for chunk in pixels.chunks_exact(RECORD_SIZE) {
        let pixel = Pixel::from_rgba([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let key = ColorKey::from(pixel);
        colors.push(to_perceptual(pixel));
        *counts.entry(key).or_default() += 1;
        if pixel.opacity.is_opaque() {
            *opaque_counts.entry(key).or_default() += 1;
            opaque_pixels += 1;
        }
    }

    debug!(
        "analyzed {width}x{height}: {} distinct colors, {} distinct opaque, {opaque_pixels} opaque pixels",
        counts.len(),
        opaque_counts.len()
    );

    Ok(ImageAnalysis {
        colors,
        counts,
        opaque_counts,
        width,
        height,
        opaque_pixels,
    })
}

impl ImageAnalysis {
    pub fn colors(&self) -> &[PerceptualColor] {
        &self.colors
    }

    /// Occurrences of every color, transparent ones included.
    pub fn counts(&self) -> &HashMap<ColorKey, usize> {
        &self.counts
    }

    pub fn opaque_counts(&self) -> &HashMap<ColorKey, usize> {
        &self.opaque_counts
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn opaque_pixels(&self) -> usize {
        self.opaque_pixels
    }

    pub fn distinct_opaque_colors(&self) -> usize {
        self.opaque_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque_pixels == 0
    }

    /// Opaque color proportions. Empty when no pixel is opaque.
    pub fn frequencies(&self) -> FrequencyTable {
        if self.opaque_pixels == 0 {
            return FrequencyTable::default();
        }
        let total = self.opaque_pixels as f64;
        FrequencyTable {
            entries: self
                .opaque_counts
                .iter()
                .map(|(&key, &count)| (key, count as f64 / total))
                .collect(),
        }
    }
}

/// Opaque color → share of opaque pixels. Sums to 1.0 unless empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyTable {
    entries: BTreeMap<ColorKey, f64>,
}

impl FrequencyTable {
    /// Builds a table from explicit proportions. Transparent keys are dropped.
    pub fn from_proportions<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ColorKey, f64)>,
    {
        FrequencyTable {
            entries: entries.into_iter().filter(|(key, _)| key.is_opaque()).collect(),
        }
    }

    pub fn get(&self, key: &ColorKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorKey, f64)> + '_ {
        self.entries.iter().map(|(&key, &p)| (key, p))
    }

    /// Entries sorted ascending by proportion. Ties keep key order.
    pub fn ascending(&self) -> Vec<(ColorKey, f64)> {
        let mut sorted: Vec<(ColorKey, f64)> = self.iter().collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
        sorted
    }
}
