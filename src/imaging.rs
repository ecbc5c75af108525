//! Decoding and encoding glue around the `image` crate.

use image::error::{ParameterError, ParameterErrorKind};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, RgbaImage};

/// Scales `img` so it fits inside `max_w` x `max_h`, keeping its aspect
/// ratio. Images may be scaled up as well as down.
pub fn fit_within(img: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (orig_w, orig_h) = img.dimensions();
    if orig_w == 0 || orig_h == 0 || (orig_w, orig_h) == (max_w, max_h) {
        return img.clone();
    }

    let ratio = (max_w as f32 / orig_w as f32).min(max_h as f32 / orig_h as f32);
    let w = ((orig_w as f32) * ratio).round().max(1.0) as u32;
    let h = ((orig_h as f32) * ratio).round().max(1.0) as u32;
    DynamicImage::ImageRgba8(image::imageops::resize(img, w, h, FilterType::Triangle))
}

/// Decodes any supported format and optionally fits it into a bounding box.
/// Returns the raw RGBA bytes and dimensions.
pub fn decode_rgba(input: &[u8], fit: Option<(u32, u32)>) -> Result<(Vec<u8>, u32, u32), ImageError> {
    let img = image::load_from_memory(input)?;
    let img = match fit {
        Some((max_w, max_h)) => fit_within(&img, max_w, max_h),
        None => img,
    };
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok((rgba.into_raw(), w, h))
}

/// PNG-encodes a raw RGBA buffer.
pub fn encode_png(width: u32, height: u32, pixels: Vec<u8>) -> Result<Vec<u8>, ImageError> {
    let img = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
    })?;
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        DynamicImage::ImageRgba8(img).write_to(&mut cursor, ImageFormat::Png)?;
    }
    Ok(buf)
}
