//! The clipped, reprojected grid entity consumed by every drawing stage.

use ndarray::Array2;

use crate::error::{PapermapError, Result};
use crate::projection::GeoTransform;

/// A reprojected, boundary-masked 2-D grid.
///
/// Cells outside the boundary (or no-data in the source) hold NaN, the
/// "not plotted" sentinel. The bounding box is derived from the shape
/// and transform at construction, so the three stay consistent by
/// construction.
#[derive(Debug, Clone)]
pub struct ClippedGrid {
    data: Array2<f32>,
    transform: GeoTransform,
    bounds: [f64; 4],
}

impl ClippedGrid {
    pub fn new(data: Array2<f32>, transform: GeoTransform) -> Result<Self> {
        if data.is_empty() {
            return Err(PapermapError::Ingest {
                message: "Cannot build a grid from an empty array".to_string(),
            });
        }
        let bounds = transform.bounds(data.nrows(), data.ncols());
        Ok(Self {
            data,
            transform,
            bounds,
        })
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// `[left, right, bottom, top]` in projected coordinates.
    pub fn bounds(&self) -> [f64; 4] {
        self.bounds
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Projected width of the visible map area in meters.
    pub fn width_meters(&self) -> f64 {
        self.bounds[1] - self.bounds[0]
    }

    pub fn count_finite(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// Min and max over finite cells, or None when every cell is the
    /// sentinel.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for &v in self.data.iter() {
            if v.is_finite() {
                range = Some(match range {
                    None => (v, v),
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                });
            }
        }
        range
    }

    /// Iterate finite cell values.
    pub fn finite_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn unit_transform() -> GeoTransform {
        GeoTransform::north_up(0.0, 2.0, 1.0, 1.0)
    }

    #[test]
    fn test_bounds_match_transform_and_shape() {
        let grid = ClippedGrid::new(array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]], unit_transform())
            .unwrap();
        assert_eq!(grid.bounds(), [0.0, 3.0, 0.0, 2.0]);
        assert_eq!(grid.width_meters(), 3.0);
    }

    #[test]
    fn test_empty_array_rejected() {
        let empty: Array2<f32> = Array2::zeros((0, 0));
        assert!(ClippedGrid::new(empty, unit_transform()).is_err());
    }

    #[test]
    fn test_finite_range_skips_sentinel() {
        let grid = ClippedGrid::new(
            array![[f32::NAN, 2.0], [7.0, f32::NAN]],
            unit_transform(),
        )
        .unwrap();
        assert_eq!(grid.finite_range(), Some((2.0, 7.0)));
        assert_eq!(grid.count_finite(), 2);
    }

    #[test]
    fn test_all_sentinel_grid() {
        let grid =
            ClippedGrid::new(Array2::from_elem((3, 3), f32::NAN), unit_transform()).unwrap();
        assert_eq!(grid.finite_range(), None);
        assert_eq!(grid.count_finite(), 0);
    }
}
