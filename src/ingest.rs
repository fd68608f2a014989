//! Grid ingestion: resolve the raster path, reproject into the
//! destination plane, clip to the boundary polygon, and optionally
//! convert an accumulated multi-year total into an annual mean.

use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PapermapError, Result};
use crate::grid::ClippedGrid;
use crate::mask;
use crate::projection::{AlbersEqualArea, GeoTransform};
use crate::raster::{self, RasterBand, RasterCrs};
use crate::vector::VectorLayer;

/// Resampling kernel used when warping the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resampling {
    /// For count-like data where values must not be invented
    Nearest,
    /// For continuous fields where smoothing is acceptable
    Bilinear,
}

/// Resolve a path that may contain glob wildcards.
///
/// A wildcard pattern must match exactly one file: zero matches is a
/// not-found error, more than one is ambiguous input.
pub fn resolve_path(pattern: &str) -> Result<PathBuf> {
    let has_wildcard = pattern.contains('*') || pattern.contains('?') || pattern.contains('[');
    if !has_wildcard {
        let path = PathBuf::from(pattern);
        if !path.exists() {
            return Err(PapermapError::Path {
                message: format!("Raster file not found: {}", pattern),
            });
        }
        return Ok(path);
    }

    let matches: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|e| PapermapError::Path {
            message: format!("Invalid path pattern {}: {}", pattern, e),
        })?
        .filter_map(|entry| entry.ok())
        .collect();

    match matches.len() {
        0 => Err(PapermapError::Path {
            message: format!("No file matches pattern: {}", pattern),
        }),
        1 => Ok(matches.into_iter().next().unwrap()),
        n => Err(PapermapError::Path {
            message: format!("Pattern {} is ambiguous: {} files match", pattern, n),
        }),
    }
}

/// Ingest one raster into a boundary-clipped grid in the destination
/// projection.
pub fn ingest(
    pattern: &str,
    boundary: &VectorLayer,
    proj: &AlbersEqualArea,
    period_start: i32,
    period_end: i32,
    annualize: bool,
    resampling: Resampling,
) -> Result<ClippedGrid> {
    let path = resolve_path(pattern)?;
    let band = raster::read_geotiff(&path)?;

    let (data, transform) = match band.crs {
        RasterCrs::Geographic { .. } => warp(&band, proj, resampling),
        RasterCrs::Projected { .. } => {
            debug!(path = %path.display(), "Source already projected, passing through");
            (band.data.clone(), band.transform)
        }
    };

    if boundary.crs.is_none() {
        return Err(PapermapError::Crs {
            message: "Clip boundary declares no coordinate reference".to_string(),
        });
    }
    let boundary_proj = boundary.reproject(proj);

    let mut grid = clip(data, transform, &boundary_proj)?;

    if annualize {
        let years = period_years(period_start, period_end);
        grid.mapv_inplace(|v| if v.is_finite() { v / years as f32 } else { v });
        debug!(years = years, "Annualized accumulated totals");
    }

    let clipped = ClippedGrid::new(grid, transform)?;
    let clipped = crop_to_boundary(clipped, &boundary_proj);

    let finite = clipped.count_finite();
    if finite == 0 {
        warn!(path = %path.display(), "Raster and boundary do not intersect; panel will be empty");
    }
    crate::logging::log_ingest_stats(
        &path.display().to_string(),
        clipped.height(),
        clipped.width(),
        finite,
        clipped
            .finite_range()
            .map(|(lo, hi)| (lo as f64, hi as f64)),
    );

    Ok(clipped)
}

/// Number of years the accumulation covers, never below one.
pub fn period_years(start: i32, end: i32) -> i32 {
    (end - start + 1).max(1)
}

/// Warp a geographic band into the destination projection.
///
/// The destination grid is the projected footprint's bounding box at
/// the source pixel counts, sampled through the inverse projection.
fn warp(band: &RasterBand, proj: &AlbersEqualArea, resampling: Resampling) -> (Array2<f32>, GeoTransform) {
    let (height, width) = (band.height(), band.width());
    let [left, right, bottom, top] = projected_footprint(band, proj);

    let dst_transform = GeoTransform::north_up(
        left,
        top,
        (right - left) / width as f64,
        (top - bottom) / height as f64,
    );

    let mut out = Array2::from_elem((height, width), f32::NAN);
    for row in 0..height {
        for col in 0..width {
            let (x, y) = dst_transform.apply(col as f64 + 0.5, row as f64 + 0.5);
            let (lon, lat) = proj.inverse(x, y);
            let (fc, fr) = band.transform.invert(lon, lat);
            out[[row, col]] = sample(&band.data, fc - 0.5, fr - 0.5, resampling);
        }
    }

    (out, dst_transform)
}

/// Projected bounding box of the source extent, sampled densely along
/// the edges so curved edges under the conic projection are covered.
fn projected_footprint(band: &RasterBand, proj: &AlbersEqualArea) -> [f64; 4] {
    let [l, r, b, t] = band.bounds();
    let steps = 32;
    let mut bbox = [f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY];
    let mut grow = |lon: f64, lat: f64| {
        let (x, y) = proj.forward(lon, lat);
        bbox[0] = bbox[0].min(x);
        bbox[1] = bbox[1].max(x);
        bbox[2] = bbox[2].min(y);
        bbox[3] = bbox[3].max(y);
    };
    for i in 0..=steps {
        let f = i as f64 / steps as f64;
        grow(l + (r - l) * f, b);
        grow(l + (r - l) * f, t);
        grow(l, b + (t - b) * f);
        grow(r, b + (t - b) * f);
    }
    bbox
}

/// Sample the source array at fractional indices.
fn sample(data: &Array2<f32>, fc: f64, fr: f64, resampling: Resampling) -> f32 {
    let (height, width) = (data.nrows() as f64, data.ncols() as f64);
    if fc < -0.5 || fr < -0.5 || fc > width - 0.5 || fr > height - 0.5 {
        return f32::NAN;
    }
    let nearest = || {
        let col = fc.round().clamp(0.0, width - 1.0) as usize;
        let row = fr.round().clamp(0.0, height - 1.0) as usize;
        data[[row, col]]
    };
    match resampling {
        Resampling::Nearest => nearest(),
        Resampling::Bilinear => {
            let c0 = fc.floor().clamp(0.0, width - 1.0) as usize;
            let r0 = fr.floor().clamp(0.0, height - 1.0) as usize;
            let c1 = (c0 + 1).min(data.ncols() - 1);
            let r1 = (r0 + 1).min(data.nrows() - 1);
            let tx = (fc - c0 as f64).clamp(0.0, 1.0) as f32;
            let ty = (fr - r0 as f64).clamp(0.0, 1.0) as f32;
            let corners = [
                data[[r0, c0]],
                data[[r0, c1]],
                data[[r1, c0]],
                data[[r1, c1]],
            ];
            // Any sentinel corner degrades to nearest so masked edges
            // never bleed interpolated values
            if corners.iter().any(|v| !v.is_finite()) {
                nearest()
            } else {
                let top = corners[0] * (1.0 - tx) + corners[1] * tx;
                let bottom = corners[2] * (1.0 - tx) + corners[3] * tx;
                top * (1.0 - ty) + bottom * ty
            }
        }
    }
}

/// Mask everything outside the boundary to the sentinel.
fn clip(mut data: Array2<f32>, transform: GeoTransform, boundary: &VectorLayer) -> Result<Array2<f32>> {
    let (height, width) = (data.nrows(), data.ncols());
    let inside = mask::rasterize(boundary, &transform, height, width);
    for ((row, col), value) in data.indexed_iter_mut() {
        if !inside[[row, col]] {
            *value = f32::NAN;
        }
    }
    Ok(data)
}

/// Crop an all-clipped grid down to the boundary's bounding box.
///
/// An empty intersection leaves the grid untouched (all sentinel).
fn crop_to_boundary(grid: ClippedGrid, boundary: &VectorLayer) -> ClippedGrid {
    let Some([bl, br, bb, bt]) = boundary.bounds() else {
        return grid;
    };
    let transform = *grid.transform();
    let (c0f, r0f) = transform.invert(bl, bt);
    let (c1f, r1f) = transform.invert(br, bb);

    let col0 = c0f.min(c1f).floor().max(0.0) as usize;
    let col1 = (c0f.max(c1f).ceil() as isize).min(grid.width() as isize) as usize;
    let row0 = r0f.min(r1f).floor().max(0.0) as usize;
    let row1 = (r0f.max(r1f).ceil() as isize).min(grid.height() as isize) as usize;

    if col0 >= col1 || row0 >= row1 {
        return grid;
    }
    if col0 == 0 && row0 == 0 && col1 == grid.width() && row1 == grid.height() {
        return grid;
    }

    let data = grid
        .data()
        .slice(ndarray::s![row0..row1, col0..col1])
        .to_owned();
    let (ox, oy) = transform.apply(col0 as f64, row0 as f64);
    let cropped_transform = GeoTransform {
        origin_x: ox,
        origin_y: oy,
        pixel_w: transform.pixel_w,
        pixel_h: transform.pixel_h,
    };
    match ClippedGrid::new(data, cropped_transform) {
        Ok(cropped) => {
            info!(
                rows = row1 - row0,
                cols = col1 - col0,
                "Cropped grid to boundary extent"
            );
            cropped
        }
        Err(_) => grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::VectorCrs;
    use std::fs::File;

    fn projected_square(x0: f64, y0: f64, x1: f64, y1: f64) -> VectorLayer {
        VectorLayer {
            crs: Some(VectorCrs::Projected),
            polygons: vec![vec![vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]]],
            lines: Vec::new(),
            points: Vec::new(),
        }
    }

    #[test]
    fn test_period_years() {
        assert_eq!(period_years(2000, 2009), 10);
        assert_eq!(period_years(2005, 2005), 1);
        assert_eq!(period_years(2010, 2000), 1);
    }

    #[test]
    fn test_resolve_literal_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.tif");
        File::create(&file).unwrap();
        assert_eq!(resolve_path(file.to_str().unwrap()).unwrap(), file);
    }

    #[test]
    fn test_resolve_missing_literal_path() {
        assert!(resolve_path("/definitely/not/here.tif").is_err());
    }

    #[test]
    fn test_resolve_glob_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("spi_2000.tif")).unwrap();
        let pattern = dir.path().join("spi_*.tif");
        let resolved = resolve_path(pattern.to_str().unwrap()).unwrap();
        assert_eq!(resolved, dir.path().join("spi_2000.tif"));
    }

    #[test]
    fn test_resolve_glob_zero_matches() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("missing_*.tif");
        assert!(resolve_path(pattern.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_resolve_glob_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a_1.tif")).unwrap();
        File::create(dir.path().join("a_2.tif")).unwrap();
        let pattern = dir.path().join("a_*.tif");
        let err = resolve_path(pattern.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_sample_nearest_and_bilinear() {
        let data = ndarray::array![[0.0f32, 10.0], [20.0, 30.0]];
        assert_eq!(sample(&data, 0.0, 0.0, Resampling::Nearest), 0.0);
        assert_eq!(sample(&data, 0.5, 0.5, Resampling::Bilinear), 15.0);
        assert!(sample(&data, 5.0, 0.0, Resampling::Nearest).is_nan());
    }

    #[test]
    fn test_bilinear_near_sentinel_degrades_to_nearest() {
        let data = ndarray::array![[f32::NAN, 10.0], [20.0, 30.0]];
        let v = sample(&data, 0.4, 0.4, Resampling::Bilinear);
        // Nearest of (0.4, 0.4) is the NaN corner
        assert!(v.is_nan());
        let v = sample(&data, 0.6, 0.6, Resampling::Bilinear);
        assert_eq!(v, 30.0);
    }

    #[test]
    fn test_clip_masks_outside_cells() {
        let data = Array2::from_elem((10, 10), 5.0f32);
        let transform = GeoTransform::north_up(0.0, 10.0, 1.0, 1.0);
        // Boundary covers the left half
        let boundary = projected_square(-1.0, -1.0, 5.0, 11.0);
        let clipped = clip(data, transform, &boundary).unwrap();
        assert!(clipped[[0, 0]].is_finite());
        assert!(clipped[[0, 9]].is_nan());
    }

    #[test]
    fn test_crop_to_boundary() {
        let data = Array2::from_elem((10, 10), 1.0f32);
        let transform = GeoTransform::north_up(0.0, 10.0, 1.0, 1.0);
        let grid = ClippedGrid::new(data, transform).unwrap();
        let boundary = projected_square(2.0, 2.0, 6.0, 6.0);
        let cropped = crop_to_boundary(grid, &boundary);
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 4);
        assert_eq!(cropped.bounds(), [2.0, 6.0, 2.0, 6.0]);
    }

    #[test]
    fn test_crop_disjoint_boundary_is_noop() {
        let data = Array2::from_elem((4, 4), 1.0f32);
        let transform = GeoTransform::north_up(0.0, 4.0, 1.0, 1.0);
        let grid = ClippedGrid::new(data, transform).unwrap();
        let boundary = projected_square(100.0, 100.0, 110.0, 110.0);
        let cropped = crop_to_boundary(grid, &boundary);
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 4);
    }
}
