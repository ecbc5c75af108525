//! Browser-facing bindings.
//!
//! The page creates one [`ImageSession`] per loaded image and calls
//! [`ImageSession::render`] whenever the bucket slider moves.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::art::Shape;
use crate::config::QuantizeOptions;
use crate::histogram::HistogramBar;
use crate::imaging::{decode_rgba, encode_png};
use crate::kmeans::validate_bucket_count;
use crate::session::{QuantizeSession, Rendering};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Counts handed to JS saturate instead of wrapping.
fn count_to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value)?;
    Ok(())
}

fn bar_to_js(bar: &HistogramBar) -> Result<Object, JsValue> {
    let obj = Object::new();
    set(&obj, "color", &JsValue::from_str(&bar.color.to_string()))?;
    set(&obj, "proportion", &JsValue::from_f64(bar.proportion))?;
    set(&obj, "offset", &JsValue::from_f64(bar.offset))?;
    set(&obj, "extent", &JsValue::from_f64(bar.extent))?;
    Ok(obj)
}

fn shape_to_js(shape: &Shape) -> Result<Object, JsValue> {
    let obj = Object::new();
    set(&obj, "color", &JsValue::from_str(&shape.color().to_string()))?;
    match *shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            ..
        } => {
            set(&obj, "kind", &JsValue::from_str("rect"))?;
            set(&obj, "x", &JsValue::from_f64(x))?;
            set(&obj, "y", &JsValue::from_f64(y))?;
            set(&obj, "width", &JsValue::from_f64(width))?;
            set(&obj, "height", &JsValue::from_f64(height))?;
        }
        Shape::Circle { cx, cy, radius, .. } => {
            set(&obj, "kind", &JsValue::from_str("circle"))?;
            set(&obj, "cx", &JsValue::from_f64(cx))?;
            set(&obj, "cy", &JsValue::from_f64(cy))?;
            set(&obj, "radius", &JsValue::from_f64(radius))?;
        }
    }
    Ok(obj)
}

/// `{ width, height, palette, histogram, shapes, iterations, converged }`
fn rendering_to_js(rendering: &Rendering) -> Result<Object, JsValue> {
    let palette_js = Array::new();
    for hex in rendering.palette_hex() {
        palette_js.push(&JsValue::from_str(&hex));
    }
    let histogram_js = Array::new();
    for bar in &rendering.histogram {
        histogram_js.push(&JsValue::from(bar_to_js(bar)?));
    }
    let shapes_js = Array::new();
    for shape in &rendering.shapes {
        shapes_js.push(&JsValue::from(shape_to_js(shape)?));
    }

    let result = Object::new();
    set(&result, "width", &JsValue::from(rendering.width))?;
    set(&result, "height", &JsValue::from(rendering.height))?;
    set(&result, "palette", &palette_js)?;
    set(&result, "histogram", &histogram_js)?;
    set(&result, "shapes", &shapes_js)?;
    set(&result, "iterations", &JsValue::from(count_to_u32(rendering.clusters.iterations())))?;
    set(&result, "converged", &JsValue::from_bool(rendering.clusters.converged()))?;
    Ok(result)
}

/// One loaded image with its cached analysis.
#[wasm_bindgen]
pub struct ImageSession {
    inner: QuantizeSession,
}

#[wasm_bindgen]
impl ImageSession {
    /// `pixels` is the canvas `ImageData.data` (RGBA, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, seed: Option<u32>) -> Result<ImageSession, JsValue> {
        let options = QuantizeOptions {
            seed: seed.map(u64::from),
            ..Default::default()
        };
        let inner = QuantizeSession::new(pixels, width, height, options).map_err(js_err)?;
        Ok(ImageSession { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.analysis().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.analysis().height()
    }

    /// Upper bound for the bucket slider.
    #[wasm_bindgen(getter, js_name = distinctColors)]
    pub fn distinct_colors(&self) -> u32 {
        count_to_u32(self.inner.analysis().distinct_opaque_colors())
    }

    /// Quantizes to `buckets` colors. The result carries the RGBA bytes under
    /// `pixels` in addition to the statistics.
    pub fn render(&self, buckets: i32) -> Result<Object, JsValue> {
        let k = validate_bucket_count(
            i64::from(buckets),
            self.inner.analysis().distinct_opaque_colors(),
        )
        .map_err(js_err)?;
        let rendering = self.inner.render(k).map_err(js_err)?;
        let result = rendering_to_js(&rendering)?;
        set(&result, "pixels", &Uint8Array::from(rendering.pixels.as_slice()))?;
        Ok(result)
    }
}

/// Decodes an encoded image, quantizes it and returns a PNG under `image`
/// along with the same statistics as [`ImageSession::render`].
///
/// `max_side` fits the image inside a square of that size first.
#[wasm_bindgen]
pub fn quantize_image(input: Vec<u8>, buckets: i32, max_side: Option<u32>) -> Result<Object, JsValue> {
    let (raw, width, height) = decode_rgba(&input, max_side.map(|s| (s, s)))
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    let session = ImageSession::new(raw, width, height, None)?;
    let k = validate_bucket_count(
        i64::from(buckets),
        session.inner.analysis().distinct_opaque_colors(),
    )
    .map_err(js_err)?;
    let rendering = session.inner.render(k).map_err(js_err)?;

    let result = rendering_to_js(&rendering)?;
    let png = encode_png(width, height, rendering.pixels)
        .map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;
    set(&result, "image", &Uint8Array::from(png.as_slice()))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_saturate_at_u32_max() {
        assert_eq!(count_to_u32(7), 7);
        assert_eq!(count_to_u32(u32::MAX as usize), u32::MAX);
        if let Some(past) = (u32::MAX as usize).checked_add(1) {
            assert_eq!(count_to_u32(past), u32::MAX);
        }
    }
}
