use serde::{Deserialize, Serialize};

use crate::color::DistanceMetric;
use crate::error::QuantizeError;

/// How an empty cluster picks its replacement centroid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReseedPolicy {
    /// Uniformly random entry of the whole color list, transparent ones included.
    #[default]
    AnyPixel,
    /// Uniformly random opaque entry.
    OpaquePixel,
}

/// Tunables for one quantization session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuantizeOptions {
    pub max_iterations: usize,
    /// Every centroid must move less than this (in ΔE) to stop early.
    pub convergence_threshold: f32,
    pub metric: DistanceMetric,
    pub reseed: ReseedPolicy,
    /// Length of the axis the histogram bars are stacked along.
    pub histogram_extent: f64,
    pub art_width: f64,
    pub art_height: f64,
    /// Keep generated shapes inside the art canvas.
    pub clamp_art_to_canvas: bool,
    /// Fixed seed for reseeding and art; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            convergence_threshold: 0.1,
            metric: DistanceMetric::Cie76,
            reseed: ReseedPolicy::AnyPixel,
            histogram_extent: 256.0,
            art_width: 512.0,
            art_height: 512.0,
            clamp_art_to_canvas: true,
            seed: None,
        }
    }
}

impl QuantizeOptions {
    pub fn validate(&self) -> Result<(), QuantizeError> {
        if self.max_iterations == 0 {
            return Err(QuantizeError::InvalidOptions(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !self.convergence_threshold.is_finite() || self.convergence_threshold < 0.0 {
            return Err(QuantizeError::InvalidOptions(format!(
                "convergence_threshold must be a non-negative number, got {}",
                self.convergence_threshold
            )));
        }
        for (name, value) in [
            ("histogram_extent", self.histogram_extent),
            ("art_width", self.art_width),
            ("art_height", self.art_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(QuantizeError::InvalidOptions(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let canvas_area = self.art_width * self.art_height;
        if !canvas_area.is_finite() {
            return Err(QuantizeError::InvalidOptions(format!(
                "art canvas {}x{} has no finite area",
                self.art_width, self.art_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(QuantizeOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_iterations_and_empty_canvas() {
        let options = QuantizeOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(QuantizeError::InvalidOptions(_))));

        let options = QuantizeOptions {
            art_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(QuantizeError::InvalidOptions(_))));
    }

    #[test]
    fn rejects_canvas_with_overflowing_area() {
        let options = QuantizeOptions {
            art_width: 1e200,
            art_height: 1e200,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(QuantizeError::InvalidOptions(_))));
    }
}
