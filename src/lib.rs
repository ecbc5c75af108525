//! Perceptual color-bucket quantization.
//!
//! Pipeline for one loaded image:
//! 1. [`analysis::analyze`] converts the RGBA buffer to Lab and counts colors.
//! 2. [`kmeans::KMeans::cluster`] groups the opaque colors into `k` buckets.
//! 3. [`quantize::quantize`] repaints every pixel with its bucket's centroid.
//! 4. The quantized buffer is analysed again; its [`analysis::FrequencyTable`]
//!    feeds [`histogram::build_histogram`] and [`art::generate_art`].
//!
//! [`session::QuantizeSession`] caches step 1 so a bucket-count change only
//! re-runs steps 2 to 4. The browser drives it through [`wasm::ImageSession`].

pub mod analysis;
pub mod art;
pub mod color;
pub mod config;
pub mod error;
pub mod histogram;
pub mod imaging;
pub mod kmeans;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
pub mod quantize;
pub mod session;
pub mod wasm;

pub use analysis::{FrequencyTable, ImageAnalysis, analyze};
pub use art::{ArtCanvas, Shape, generate_art};
pub use color::{ColorKey, DistanceMetric, Opacity, PerceptualColor, Pixel, distance, to_device, to_perceptual};
pub use config::{QuantizeOptions, ReseedPolicy};
pub use error::QuantizeError;
pub use histogram::{HistogramBar, build_histogram};
pub use kmeans::{ClusterResult, KMeans, cluster};
#[cfg(not(target_arch = "wasm32"))]
pub use native::{QuantizedImage, quantize_bytes};
pub use quantize::quantize;
pub use session::{QuantizeSession, Rendering};
