use anyhow::{Context, Result};

use crate::config::QuantizeOptions;
use crate::imaging::{decode_rgba, encode_png};
use crate::session::{QuantizeSession, Rendering};

/// Quantized PNG plus the statistics it was drawn from.
pub struct QuantizedImage {
    pub png: Vec<u8>,
    pub rendering: Rendering,
}

/// Decodes `input`, quantizes it to `buckets` colors and re-encodes as PNG.
pub fn quantize_bytes(
    input: &[u8],
    buckets: usize,
    fit: Option<(u32, u32)>,
    options: &QuantizeOptions,
) -> Result<QuantizedImage> {
    let (raw, width, height) = decode_rgba(input, fit).context("unable to decode image")?;
    let session = QuantizeSession::new(raw, width, height, options.clone())?;
    let rendering = session.render(buckets)?;
    let png = encode_png(width, height, rendering.pixels.clone()).context("PNG encode error")?;
    Ok(QuantizedImage { png, rendering })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn two_tone_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(8, 4, |x, _| {
            if x < 6 {
                Rgba([200, 30, 30, 255])
            } else {
                Rgba([20, 40, 220, 255])
            }
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn quantizes_encoded_bytes() {
        let options = QuantizeOptions {
            seed: Some(1),
            ..Default::default()
        };
        let out = quantize_bytes(&two_tone_png(), 2, None, &options).unwrap();
        assert!(!out.png.is_empty());
        let mut palette = out.rendering.palette_hex();
        palette.sort();
        assert_eq!(palette, vec!["1428DC".to_string(), "C81E1E".to_string()]);
        assert_eq!(out.rendering.histogram.len(), 2);
        assert!((out.rendering.histogram[1].proportion - 0.75).abs() < 1e-12);
    }

    #[test]
    fn surfaces_bad_bucket_count() {
        let err = quantize_bytes(&two_tone_png(), 3, None, &QuantizeOptions::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid bucket count"));
    }

    #[test]
    fn garbage_input_fails_to_decode() {
        assert!(quantize_bytes(b"not an image", 2, None, &QuantizeOptions::default()).is_err());
    }
}
