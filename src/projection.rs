//! Map projection and affine transform support.
//!
//! papermap composes every panel in one fixed equal-area projection so
//! that areas compare honestly across panels. The projection is a
//! spherical Albers equal-area conic; the default parameters match the
//! administrative maps the tool was built for (standard parallels 25/47,
//! central meridian 105 east) but are fully configurable.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (spherical model).
const EARTH_RADIUS_M: f64 = 6_371_229.0;

/// Albers equal-area conic projection parameters, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlbersParams {
    /// First standard parallel
    pub lat_1: f64,
    /// Second standard parallel
    pub lat_2: f64,
    /// Latitude of origin
    pub lat_0: f64,
    /// Central meridian
    pub lon_0: f64,
}

impl Default for AlbersParams {
    fn default() -> Self {
        Self {
            lat_1: 25.0,
            lat_2: 47.0,
            lat_0: 0.0,
            lon_0: 105.0,
        }
    }
}

/// Spherical Albers equal-area conic projection.
///
/// Forward maps geographic (lon, lat) degrees to projected (x, y)
/// meters; inverse maps back. The cone constants are precomputed at
/// construction.
#[derive(Debug, Clone)]
pub struct AlbersEqualArea {
    params: AlbersParams,
    /// Cone constant
    n: f64,
    /// C constant
    c: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl AlbersEqualArea {
    pub fn new(params: AlbersParams) -> Self {
        let to_rad = PI / 180.0;
        let phi1 = params.lat_1 * to_rad;
        let phi2 = params.lat_2 * to_rad;
        let phi0 = params.lat_0 * to_rad;

        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (phi1.sin() + phi2.sin()) / 2.0
        };
        let c = phi1.cos().powi(2) + 2.0 * n * phi1.sin();
        let rho0 = EARTH_RADIUS_M / n * (c - 2.0 * n * phi0.sin()).sqrt();

        Self { params, n, c, rho0 }
    }

    pub fn params(&self) -> &AlbersParams {
        &self.params
    }

    /// Project geographic coordinates (degrees) to projected meters.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let phi = lat * to_rad;
        let lam = (lon - self.params.lon_0) * to_rad;

        let rho = EARTH_RADIUS_M / self.n * (self.c - 2.0 * self.n * phi.sin()).sqrt();
        let theta = self.n * lam;

        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Unproject (x, y) meters back to geographic coordinates (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;
        let dy = self.rho0 - y;
        let rho = (x * x + dy * dy).sqrt() * self.n.signum();
        let theta = (x * self.n.signum()).atan2(dy * self.n.signum());

        let sin_phi = (self.c - (rho * self.n / EARTH_RADIUS_M).powi(2)) / (2.0 * self.n);
        let phi = sin_phi.clamp(-1.0, 1.0).asin();
        let lam = theta / self.n;

        (self.params.lon_0 + lam * to_deg, phi * to_deg)
    }
}

impl Default for AlbersEqualArea {
    fn default() -> Self {
        Self::new(AlbersParams::default())
    }
}

/// Affine transform mapping array indices to projected coordinates.
///
/// Follows the GDAL convention for north-up grids: `x = origin_x +
/// col * pixel_w`, `y = origin_y + row * pixel_h` with `pixel_h`
/// negative (row 0 is the top of the grid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_w: f64,
    pub pixel_h: f64,
}

impl GeoTransform {
    /// A north-up transform from the top-left corner and cell sizes.
    pub fn north_up(left: f64, top: f64, res_x: f64, res_y: f64) -> Self {
        Self {
            origin_x: left,
            origin_y: top,
            pixel_w: res_x,
            pixel_h: -res_y.abs(),
        }
    }

    /// Map fractional (col, row) indices to projected coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_w,
            self.origin_y + row * self.pixel_h,
        )
    }

    /// Map projected coordinates back to fractional (col, row) indices.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_w,
            (y - self.origin_y) / self.pixel_h,
        )
    }

    /// Bounding box `[left, right, bottom, top]` of a grid of the
    /// given shape under this transform.
    pub fn bounds(&self, height: usize, width: usize) -> [f64; 4] {
        let (x0, y0) = self.apply(0.0, 0.0);
        let (x1, y1) = self.apply(width as f64, height as f64);
        [x0.min(x1), x0.max(x1), y0.min(y1), y0.max(y1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_inverse_roundtrip() {
        let proj = AlbersEqualArea::default();
        for &(lon, lat) in &[(105.0, 35.0), (80.0, 20.0), (130.0, 50.0), (105.0, 0.0)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-6, "lon {} -> {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat {} -> {}", lat, lat2);
        }
    }

    #[test]
    fn test_central_meridian_maps_to_x_zero() {
        let proj = AlbersEqualArea::default();
        let (x, _) = proj.forward(105.0, 30.0);
        assert!(x.abs() < 1e-6);
    }

    #[test]
    fn test_east_of_center_is_positive_x() {
        let proj = AlbersEqualArea::default();
        let (x, _) = proj.forward(110.0, 30.0);
        assert!(x > 0.0);
    }

    #[test]
    fn test_transform_apply_invert() {
        let tfm = GeoTransform::north_up(-1000.0, 2000.0, 50.0, 50.0);
        let (x, y) = tfm.apply(3.0, 4.0);
        assert_eq!(x, -850.0);
        assert_eq!(y, 1800.0);
        let (c, r) = tfm.invert(x, y);
        assert!((c - 3.0).abs() < 1e-12);
        assert!((r - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_ordering() {
        let tfm = GeoTransform::north_up(0.0, 100.0, 10.0, 10.0);
        let [left, right, bottom, top] = tfm.bounds(10, 20);
        assert_eq!(left, 0.0);
        assert_eq!(right, 200.0);
        assert_eq!(bottom, 0.0);
        assert_eq!(top, 100.0);
    }
}
