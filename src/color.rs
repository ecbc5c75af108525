//! Conversion between device sRGB pixels and CIE Lab, plus perceptual
//! distance.

use std::fmt;
use std::str::FromStr;

use palette::color_difference::{Ciede2000, EuclideanDistance};
use palette::{Clamp, IntoColor, Lab, Srgb};
use serde::{Deserialize, Serialize, Serializer};

/// Bytes per pixel record in a flat RGBA buffer.
pub const RECORD_SIZE: usize = 4;

/// Binary visibility of a pixel. Partial alpha never survives ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opacity {
    Transparent,
    Opaque,
}

impl Opacity {
    /// Only a fully opaque source alpha maps to [`Opacity::Opaque`].
    #[inline]
    pub fn from_alpha(alpha: u8) -> Self {
        if alpha == u8::MAX {
            Opacity::Opaque
        } else {
            Opacity::Transparent
        }
    }

    #[inline]
    pub fn alpha(self) -> u8 {
        match self {
            Opacity::Opaque => u8::MAX,
            Opacity::Transparent => 0,
        }
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self == Opacity::Opaque
    }
}

/// A device-space pixel: 8-bit sRGB channels and binarized opacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub rgb: [u8; 3],
    pub opacity: Opacity,
}

impl Pixel {
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: [r, g, b],
            opacity: Opacity::Opaque,
        }
    }

    /// Reads one RGBA record, binarizing its alpha.
    #[inline]
    pub fn from_rgba(record: [u8; 4]) -> Self {
        Self {
            rgb: [record[0], record[1], record[2]],
            opacity: Opacity::from_alpha(record[3]),
        }
    }

    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.rgb[0], self.rgb[1], self.rgb[2], self.opacity.alpha()]
    }

    /// `RRGGBB` upper-case hex, without opacity.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

/// Canonical key used wherever colors are counted or looked up.
///
/// Two pixels share a key iff their channels and opacity are equal. The
/// string form is `#RRGGBB` for opaque colors and `#RRGGBB00` for
/// transparent ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorKey(Pixel);

impl ColorKey {
    pub fn is_opaque(self) -> bool {
        self.0.opacity.is_opaque()
    }
}

impl From<Pixel> for ColorKey {
    fn from(pixel: Pixel) -> Self {
        ColorKey(pixel)
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0.rgb;
        match self.0.opacity {
            Opacity::Opaque => write!(f, "#{r:02X}{g:02X}{b:02X}"),
            Opacity::Transparent => write!(f, "#{r:02X}{g:02X}{b:02X}00"),
        }
    }
}

impl Serialize for ColorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A color in CIE Lab (D65) carrying the opacity of the pixel it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerceptualColor {
    lab: Lab,
    opacity: Opacity,
}

impl PerceptualColor {
    pub fn new(l: f32, a: f32, b: f32, opacity: Opacity) -> Self {
        Self {
            lab: Lab::new(l, a, b),
            opacity,
        }
    }

    pub fn lab(&self) -> Lab {
        self.lab
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    pub fn is_opaque(&self) -> bool {
        self.opacity.is_opaque()
    }

    /// Bit pattern of the three axes; equal colors give equal keys.
    pub(crate) fn axis_bits(&self) -> [u32; 3] {
        [self.lab.l.to_bits(), self.lab.a.to_bits(), self.lab.b.to_bits()]
    }
}

/// Converts a device pixel into Lab. sRGB 0 and 255 land on L = 0 and
/// L = 100 respectively.
pub fn to_perceptual(pixel: Pixel) -> PerceptualColor {
    let [r, g, b] = pixel.rgb;
    let lab: Lab = Srgb::<u8>::new(r, g, b).into_format::<f32>().into_color();
    PerceptualColor {
        lab,
        opacity: pixel.opacity,
    }
}

/// Converts back to the nearest device pixel. Out-of-gamut Lab values are
/// clamped to the sRGB cube before rounding; opacity is passed through.
pub fn to_device(color: &PerceptualColor) -> Pixel {
    let rgb: Srgb<f32> = color.lab.into_color();
    let rgb: Srgb<u8> = rgb.clamp().into_format::<u8>();
    Pixel {
        rgb: [rgb.red, rgb.green, rgb.blue],
        opacity: color.opacity,
    }
}

/// Color-difference formula used for cluster assignment and convergence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance in Lab (ΔE*76).
    #[default]
    Cie76,
    /// CIEDE2000 (ΔE*00).
    Ciede2000,
}

impl DistanceMetric {
    /// Symmetric, non-negative, zero only for identical Lab coordinates.
    #[inline]
    pub fn distance(self, a: &PerceptualColor, b: &PerceptualColor) -> f32 {
        match self {
            DistanceMetric::Cie76 => a.lab.distance_squared(b.lab).sqrt(),
            DistanceMetric::Ciede2000 => a.lab.difference(b.lab),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cie76" | "76" => Ok(DistanceMetric::Cie76),
            "ciede2000" | "2000" => Ok(DistanceMetric::Ciede2000),
            other => Err(format!("unknown distance metric `{other}` (cie76, ciede2000)")),
        }
    }
}

/// ΔE*76 between two colors.
pub fn distance(a: &PerceptualColor, b: &PerceptualColor) -> f32 {
    DistanceMetric::Cie76.distance(a, b)
}
