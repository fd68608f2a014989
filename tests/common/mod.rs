//! Shared helpers for integration tests: synthetic grids, boundaries,
//! and job descriptions that need no files on disk.

use ndarray::Array2;

use papermap::grid::ClippedGrid;
use papermap::projection::GeoTransform;
use papermap::vector::{VectorCrs, VectorLayer};

/// A square grid filled with one value, 100 m cells, origin at (0, 0).
pub fn uniform_grid(size: usize, value: f32) -> ClippedGrid {
    let data = Array2::from_elem((size, size), value);
    grid_from(data)
}

/// A grid built from row-major values.
pub fn grid_from_values(values: Vec<f32>, width: usize) -> ClippedGrid {
    let height = values.len() / width;
    let data = Array2::from_shape_vec((height, width), values).unwrap();
    grid_from(data)
}

fn grid_from(data: Array2<f32>) -> ClippedGrid {
    let top = data.nrows() as f64 * 100.0;
    let transform = GeoTransform::north_up(0.0, top, 100.0, 100.0);
    ClippedGrid::new(data, transform).unwrap()
}

/// A projected rectangular boundary covering the same extent as
/// [`uniform_grid`] of the given size.
pub fn square_boundary(size: usize) -> VectorLayer {
    let side = size as f64 * 100.0;
    VectorLayer {
        crs: Some(VectorCrs::Projected),
        polygons: vec![vec![vec![
            (0.0, 0.0),
            (side, 0.0),
            (side, side),
            (0.0, side),
            (0.0, 0.0),
        ]]],
        lines: Vec::new(),
        points: Vec::new(),
    }
}

/// A minimal single-panel job body; callers patch in what they test.
pub fn minimal_job_json() -> String {
    r#"{
        "boundary": "/data/region.shp",
        "panels": [{"raster": "/data/annual.tif"}]
    }"#
    .to_string()
}
