use crate::color::{Opacity, Pixel, RECORD_SIZE};
use crate::error::QuantizeError;
use crate::kmeans::ClusterResult;

/// Written for every pixel the clustering ignored.
pub const CLEARED: [u8; 4] = [0, 0, 0, 0];

/// Re-colors `original` with the centroid of each pixel's cluster.
///
/// Assigned pixels become `to_device(centroid)` at full opacity. Ignored
/// pixels are cleared to [`CLEARED`], so the output never carries partial
/// alpha.
pub fn quantize(original: &[u8], clusters: &ClusterResult) -> Result<Vec<u8>, QuantizeError> {
    let assignments = clusters.assignments();
    if original.len() != assignments.len() * RECORD_SIZE {
        return Err(QuantizeError::MisalignedAssignments {
            pixels: original.len() / RECORD_SIZE,
            assignments: assignments.len(),
        });
    }

    let palette: Vec<[u8; 4]> = clusters
        .palette()
        .into_iter()
        .map(|pixel| {
            Pixel {
                opacity: Opacity::Opaque,
                ..pixel
            }
            .to_rgba()
        })
        .collect();

    let mut quantized = Vec::with_capacity(original.len());
    for slot in assignments {
        let record = slot
            .and_then(|index| palette.get(index))
            .copied()
            .unwrap_or(CLEARED);
        quantized.extend_from_slice(&record);
    }
    Ok(quantized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::color::to_device;
    use crate::kmeans::KMeans;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_pixel_takes_its_centroid_color() {
        let pixels: Vec<u8> = [
            [250, 10, 10, 255],
            [240, 0, 20, 255],
            [5, 5, 240, 255],
            [90, 90, 90, 0],
            [0, 20, 250, 255],
            [255, 0, 0, 255],
        ]
        .concat();
        let analysis = analyze(&pixels, 3, 2).unwrap();
        let clusters = KMeans::default()
            .cluster(analysis.colors(), 2, &mut StdRng::seed_from_u64(5))
            .unwrap();
        let out = quantize(&pixels, &clusters).unwrap();
        assert_eq!(out.len(), pixels.len());

        for (record, slot) in out.chunks_exact(4).zip(clusters.assignments()) {
            match slot {
                Some(index) => {
                    let expected = to_device(&clusters.centroids()[*index]);
                    assert_eq!(&record[..3], &expected.rgb);
                    assert_eq!(record[3], 255);
                }
                None => assert_eq!(record, CLEARED),
            }
        }
    }

    #[test]
    fn rejects_misaligned_buffers() {
        let pixels = [255u8, 0, 0, 255, 0, 0, 255, 255];
        let analysis = analyze(&pixels, 2, 1).unwrap();
        let clusters = KMeans::default()
            .cluster(analysis.colors(), 1, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(
            quantize(&pixels[..4], &clusters),
            Err(QuantizeError::MisalignedAssignments {
                pixels: 1,
                assignments: 2
            })
        );
    }
}
