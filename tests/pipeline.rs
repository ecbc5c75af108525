use image::{Rgba, RgbaImage};
use lab_bucket_quantizer::{
    ColorKey, Pixel, QuantizeError, QuantizeOptions, QuantizeSession, ReseedPolicy, analyze,
    to_device,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn options() -> QuantizeOptions {
    QuantizeOptions {
        seed: Some(17),
        reseed: ReseedPolicy::OpaquePixel,
        ..Default::default()
    }
}

/// Left half red, right half blue, bottom-right corner transparent.
fn banded(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if x >= width - 2 && y >= height - 2 {
            Rgba([0, 0, 0, 0])
        } else if x < width / 2 {
            Rgba([230, 20, 20, 255])
        } else {
            Rgba([20, 20, 230, 255])
        }
    })
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 256) as u8, 255])
    })
}

#[test]
fn two_by_two_red_blue_example() {
    let pixels = [
        [255u8, 0, 0, 255],
        [255, 0, 0, 255],
        [0, 0, 255, 255],
        [0, 0, 255, 255],
    ]
    .concat();
    let session = QuantizeSession::new(pixels.clone(), 2, 2, options()).unwrap();
    let rendering = session.render(2).unwrap();

    let a = rendering.clusters.assignments();
    assert_eq!(a[0], a[1]);
    assert_eq!(a[2], a[3]);
    assert_ne!(a[0], a[2]);
    assert_eq!(rendering.pixels, pixels);
    assert_eq!(rendering.histogram.len(), 2);
}

#[test]
fn quantized_pixels_match_centroids() {
    let img = gradient(24, 16);
    let session = QuantizeSession::new(img.into_raw(), 24, 16, options()).unwrap();
    let rendering = session.render(6).unwrap();

    let clusters = &rendering.clusters;
    assert_eq!(clusters.centroids().len(), 6);
    assert_eq!(clusters.assignments().len(), 24 * 16);
    for (record, slot) in rendering.pixels.chunks_exact(4).zip(clusters.assignments()) {
        let index = slot.expect("all pixels are opaque");
        assert!(index < 6);
        let expected = to_device(&clusters.centroids()[index]);
        assert_eq!(&record[..3], &expected.rgb);
        assert_eq!(record[3], 255);
    }
    assert!(rendering.frequencies.len() <= 6);
}

#[test]
fn transparent_corner_stays_transparent() {
    let img = banded(10, 6);
    let session = QuantizeSession::new(img.into_raw(), 10, 6, options()).unwrap();
    let rendering = session.render(2).unwrap();

    let out = RgbaImage::from_raw(10, 6, rendering.pixels.clone()).unwrap();
    assert_eq!(out.get_pixel(9, 5).0, [0, 0, 0, 0]);
    assert_eq!(out.get_pixel(0, 0).0, [230, 20, 20, 255]);
    assert_eq!(out.get_pixel(7, 0).0, [20, 20, 230, 255]);

    let opaque = 10 * 6 - 4;
    let red = ColorKey::from(Pixel::opaque(230, 20, 20));
    assert_eq!(rendering.frequencies.get(&red), Some(30.0 / opaque as f64));
    let total: f64 = rendering.histogram.iter().map(|b| b.extent).sum();
    assert!((total - session.options().histogram_extent).abs() < 1e-9);
}

#[test]
fn art_area_tracks_frequencies() {
    let img = banded(10, 6);
    let session = QuantizeSession::new(img.into_raw(), 10, 6, options()).unwrap();
    let rendering = session.render(2).unwrap();
    let canvas_area = session.options().art_width * session.options().art_height;

    for (color, proportion) in rendering.frequencies.iter() {
        let covered: f64 = rendering
            .shapes
            .iter()
            .filter(|s| s.color() == color)
            .map(|s| s.area())
            .sum();
        let target = proportion * canvas_area;
        assert!((covered - target).abs() <= target * 1e-6);
    }
}

#[test]
fn fully_transparent_image_yields_empty_outputs() {
    let pixels = vec![0u8; 3 * 3 * 4];
    let session = QuantizeSession::new(pixels.clone(), 3, 3, options()).unwrap();
    let rendering = session.render(4).unwrap();
    assert!(rendering.clusters.centroids().is_empty());
    assert_eq!(rendering.pixels, pixels);
    assert!(rendering.histogram.is_empty());
    assert!(rendering.shapes.is_empty());
}

#[test]
fn bucket_count_is_checked_before_clustering() {
    let session = QuantizeSession::new(banded(10, 6).into_raw(), 10, 6, options()).unwrap();
    assert_eq!(
        session.render(0).unwrap_err(),
        QuantizeError::InvalidBucketCount {
            requested: 0,
            available: 2
        }
    );
    assert!(matches!(
        session.render(3),
        Err(QuantizeError::InvalidBucketCount { requested: 3, .. })
    ));
}

#[test]
fn dimension_mismatch_is_fatal() {
    let err = QuantizeSession::new(vec![0; 10], 2, 2, options()).unwrap_err();
    assert!(matches!(err, QuantizeError::DimensionMismatch { actual: 10, .. }));
}

#[test]
fn rerendering_reuses_the_cached_analysis() {
    let raw = gradient(12, 12).into_raw();
    let session = QuantizeSession::new(raw.clone(), 12, 12, options()).unwrap();
    assert_eq!(session.analysis(), &analyze(&raw, 12, 12).unwrap());

    let first = session.render_with(4, &mut StdRng::seed_from_u64(3)).unwrap();
    let second = session.render_with(4, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(first, second);
    let fewer = session.render(2).unwrap();
    assert_eq!(fewer.clusters.centroids().len(), 2);
}
