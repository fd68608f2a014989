//! Polygon-to-mask rasterization.
//!
//! Even-odd scanline fill over all rings of all polygon features, so
//! holes (inner rings) mask out naturally. Coordinates come in the
//! projected plane and are converted to fractional cell indices by the
//! grid transform.

use ndarray::Array2;

use crate::projection::GeoTransform;
use crate::vector::VectorLayer;

/// Rasterize polygon features into a boolean mask of the given shape.
///
/// A cell is inside when its center falls inside an odd number of ring
/// crossings. A layer with no polygons yields an all-false mask.
pub fn rasterize(
    layer: &VectorLayer,
    transform: &GeoTransform,
    height: usize,
    width: usize,
) -> Array2<bool> {
    let mut mask = Array2::from_elem((height, width), false);

    // Ring vertices as fractional (col, row) pairs
    let rings: Vec<Vec<(f64, f64)>> = layer
        .polygons
        .iter()
        .flat_map(|feature| feature.iter())
        .map(|ring| {
            ring.iter()
                .map(|&(x, y)| transform.invert(x, y))
                .collect()
        })
        .collect();

    if rings.is_empty() {
        return mask;
    }

    let mut crossings: Vec<f64> = Vec::new();
    for row in 0..height {
        let cy = row as f64 + 0.5;
        crossings.clear();

        for ring in &rings {
            if ring.len() < 3 {
                continue;
            }
            let n = ring.len();
            for i in 0..n {
                let (x0, y0) = ring[i];
                let (x1, y1) = ring[(i + 1) % n];
                // Half-open rule avoids double-counting vertices
                if (y0 <= cy && cy < y1) || (y1 <= cy && cy < y0) {
                    let t = (cy - y0) / (y1 - y0);
                    crossings.push(x0 + t * (x1 - x0));
                }
            }
        }

        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // Fill between alternate crossing pairs
        for pair in crossings.chunks_exact(2) {
            let start = pair[0];
            let end = pair[1];
            let c0 = (start - 0.5).ceil().max(0.0) as usize;
            let c1 = (end - 0.5).floor().min(width as f64 - 1.0);
            if c1 < 0.0 {
                continue;
            }
            for col in c0..=(c1 as usize) {
                if col < width {
                    mask[[row, col]] = true;
                }
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::VectorCrs;

    fn layer_with_rings(rings: Vec<Vec<(f64, f64)>>) -> VectorLayer {
        VectorLayer {
            crs: Some(VectorCrs::Projected),
            polygons: vec![rings],
            lines: Vec::new(),
            points: Vec::new(),
        }
    }

    fn identity_transform(height: usize) -> GeoTransform {
        // Row 0 at the top, one unit per cell
        GeoTransform::north_up(0.0, height as f64, 1.0, 1.0)
    }

    #[test]
    fn test_full_cover_square() {
        let layer = layer_with_rings(vec![vec![
            (-1.0, -1.0),
            (11.0, -1.0),
            (11.0, 11.0),
            (-1.0, 11.0),
            (-1.0, -1.0),
        ]]);
        let mask = rasterize(&layer, &identity_transform(10), 10, 10);
        assert!(mask.iter().all(|&v| v));
    }

    #[test]
    fn test_half_cover() {
        // Covers the left half, x in [0, 5)
        let layer = layer_with_rings(vec![vec![
            (0.0, -1.0),
            (5.0, -1.0),
            (5.0, 11.0),
            (0.0, 11.0),
            (0.0, -1.0),
        ]]);
        let mask = rasterize(&layer, &identity_transform(10), 10, 10);
        for row in 0..10 {
            for col in 0..10 {
                assert_eq!(mask[[row, col]], col < 5, "cell ({}, {})", row, col);
            }
        }
    }

    #[test]
    fn test_hole_is_masked_out() {
        // Outer ring covers everything, inner ring punches the middle
        let layer = layer_with_rings(vec![
            vec![
                (-1.0, -1.0),
                (11.0, -1.0),
                (11.0, 11.0),
                (-1.0, 11.0),
                (-1.0, -1.0),
            ],
            vec![(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0), (3.0, 3.0)],
        ]);
        let mask = rasterize(&layer, &identity_transform(10), 10, 10);
        assert!(mask[[0, 0]]);
        assert!(!mask[[5, 5]]);
    }

    #[test]
    fn test_no_polygons_all_false() {
        let layer = VectorLayer {
            crs: None,
            polygons: Vec::new(),
            lines: Vec::new(),
            points: Vec::new(),
        };
        let mask = rasterize(&layer, &identity_transform(4), 4, 4);
        assert!(mask.iter().all(|&v| !v));
    }

    #[test]
    fn test_disjoint_polygon_all_false() {
        let layer = layer_with_rings(vec![vec![
            (100.0, 100.0),
            (110.0, 100.0),
            (110.0, 110.0),
            (100.0, 110.0),
            (100.0, 100.0),
        ]]);
        let mask = rasterize(&layer, &identity_transform(10), 10, 10);
        assert!(mask.iter().all(|&v| !v));
    }
}
