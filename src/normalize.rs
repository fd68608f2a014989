//! Value-range normalization for color mapping.
//!
//! A composition maps values to colors through a [`ValueRange`]: one
//! shared range across every panel, or one independent range per panel
//! with an optional percentile cap. Degenerate data never fails; it
//! falls back to the `(0, 1)` range so the panel still renders.

use tracing::{debug, warn};

use crate::grid::ClippedGrid;

/// A strictly increasing `(vmin, vmax)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub vmin: f32,
    pub vmax: f32,
}

impl ValueRange {
    /// Build a range, coercing degenerate or non-finite input to the
    /// `(0, 1)` fallback.
    pub fn checked(vmin: f32, vmax: f32) -> Self {
        if !vmin.is_finite() || !vmax.is_finite() || vmin >= vmax {
            debug!(
                vmin = vmin as f64,
                vmax = vmax as f64,
                "Degenerate value range, using (0, 1) fallback"
            );
            Self {
                vmin: 0.0,
                vmax: 1.0,
            }
        } else {
            Self { vmin, vmax }
        }
    }

    pub fn fallback() -> Self {
        Self {
            vmin: 0.0,
            vmax: 1.0,
        }
    }

    /// Map a value to the `[0, 1]` color fraction, clamped.
    pub fn fraction(&self, value: f32) -> f32 {
        ((value - self.vmin) / (self.vmax - self.vmin)).clamp(0.0, 1.0)
    }
}

/// One shared range over all panels' finite values.
///
/// `override_max` replaces the observed maximum when given; the
/// observed minimum always stands.
pub fn shared_range(grids: &[ClippedGrid], override_max: Option<f32>) -> ValueRange {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for grid in grids {
        if let Some((gmin, gmax)) = grid.finite_range() {
            lo = lo.min(gmin);
            hi = hi.max(gmax);
        }
    }
    if let Some(cap) = override_max {
        hi = cap;
    }
    if !lo.is_finite() || !hi.is_finite() {
        warn!("No finite values across any panel, shared range falls back to (0, 1)");
        return ValueRange::fallback();
    }
    ValueRange::checked(lo, hi)
}

/// Independent range for one panel.
///
/// "Percentile not requested" and "no finite values" are distinct
/// branches: the former uses the true maximum, the latter takes the
/// fallback so a genuinely empty panel is never disguised as a
/// full-range choice.
pub fn panel_range(grid: &ClippedGrid, percentile: Option<f32>) -> ValueRange {
    let Some((lo, hi)) = grid.finite_range() else {
        warn!("Panel has no finite values, range falls back to (0, 1)");
        return ValueRange::fallback();
    };
    match percentile {
        None => ValueRange::checked(lo, hi),
        Some(p) => {
            let mut values: Vec<f32> = grid.finite_values().collect();
            let cap = percentile_of(&mut values, p);
            ValueRange::checked(lo, cap)
        }
    }
}

/// Linear-interpolated percentile over a non-empty sample, p in 0..=100.
fn percentile_of(values: &mut [f32], p: f32) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let p = p.clamp(0.0, 100.0);
    let rank = (p / 100.0) * (values.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        values[lo]
    } else {
        let t = rank - lo as f32;
        values[lo] * (1.0 - t) + values[hi] * t
    }
}

/// N evenly spaced tick values between vmin and vmax inclusive.
///
/// The first and last ticks are pinned to exactly vmin and vmax so the
/// colorbar labels never drift off the extremes.
pub fn ticks(range: ValueRange, count: usize) -> Vec<f32> {
    let count = count.max(2);
    let mut out = Vec::with_capacity(count);
    let step = (range.vmax - range.vmin) / (count - 1) as f32;
    for i in 0..count {
        out.push(range.vmin + step * i as f32);
    }
    out[0] = range.vmin;
    out[count - 1] = range.vmax;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GeoTransform;
    use ndarray::Array2;

    fn grid_of(values: Vec<f32>, width: usize) -> ClippedGrid {
        let height = values.len() / width;
        let data = Array2::from_shape_vec((height, width), values).unwrap();
        ClippedGrid::new(data, GeoTransform::north_up(0.0, height as f64, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_checked_degenerate_falls_back() {
        assert_eq!(ValueRange::checked(5.0, 5.0), ValueRange::fallback());
        assert_eq!(ValueRange::checked(7.0, 3.0), ValueRange::fallback());
        assert_eq!(
            ValueRange::checked(f32::NAN, 10.0),
            ValueRange::fallback()
        );
    }

    #[test]
    fn test_shared_range_union() {
        let a = grid_of(vec![0.0, 10.0, f32::NAN, 4.0], 2);
        let b = grid_of(vec![5.0, 20.0, 8.0, f32::NAN], 2);
        let range = shared_range(&[a, b], None);
        assert_eq!(range, ValueRange { vmin: 0.0, vmax: 20.0 });
    }

    #[test]
    fn test_shared_range_override_max() {
        let a = grid_of(vec![0.0, 10.0], 2);
        let range = shared_range(&[a], Some(50.0));
        assert_eq!(range.vmax, 50.0);
        assert_eq!(range.vmin, 0.0);
    }

    #[test]
    fn test_shared_range_all_sentinel() {
        let a = grid_of(vec![f32::NAN; 4], 2);
        assert_eq!(shared_range(&[a], None), ValueRange::fallback());
    }

    #[test]
    fn test_panel_range_constant_grid_falls_back() {
        let g = grid_of(vec![5.0; 4], 2);
        assert_eq!(panel_range(&g, None), ValueRange::fallback());
    }

    #[test]
    fn test_panel_range_percentile_over_finite_only() {
        let mut values: Vec<f32> = (0..=100).map(|v| v as f32).collect();
        values.extend([f32::NAN; 9]);
        let g = grid_of(values, 10);
        let range = panel_range(&g, Some(90.0));
        assert_eq!(range.vmin, 0.0);
        assert!((range.vmax - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_panel_range_empty_is_fallback_even_with_percentile() {
        let g = grid_of(vec![f32::NAN; 4], 2);
        assert_eq!(panel_range(&g, Some(95.0)), ValueRange::fallback());
    }

    #[test]
    fn test_ticks_pin_endpoints() {
        for count in [2, 3, 6, 11] {
            let t = ticks(ValueRange { vmin: 0.1, vmax: 0.9 }, count);
            assert_eq!(t.len(), count);
            assert_eq!(t[0], 0.1);
            assert_eq!(t[count - 1], 0.9);
        }
    }

    #[test]
    fn test_ticks_evenly_spaced() {
        let t = ticks(ValueRange { vmin: 0.0, vmax: 10.0 }, 6);
        assert_eq!(t, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_fraction_clamps() {
        let r = ValueRange { vmin: 0.0, vmax: 10.0 };
        assert_eq!(r.fraction(-5.0), 0.0);
        assert_eq!(r.fraction(5.0), 0.5);
        assert_eq!(r.fraction(50.0), 1.0);
    }
}
