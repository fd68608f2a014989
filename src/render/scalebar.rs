//! Scale bars.
//!
//! A bar's length is resolved first (user-specified kilometers, or a
//! "nice" round number derived from the visible map width), then one
//! of five interchangeable styles renders the resolved length. Style
//! choice never affects the resolution step.

use image::Rgba;
use serde::Deserialize;

use super::canvas::{Canvas, PixelRect, BLACK, WHITE};
use super::{anchor_point, apply_offset, Corner};

/// Callback signature for externally supplied renderers.
pub type CustomScaleBarFn = fn(&mut Canvas, &ResolvedScaleBar);

/// The five builtin looks plus an escape hatch for custom renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleBarStyle {
    /// Alternating black/white segment boxes
    Segmented,
    /// Single ruled line with end ticks
    Ruled,
    /// Multi-tick ruler with per-tick labels
    Ruler,
    /// Two stacked bands, checkerboard fill
    DoubleBand,
    /// One bold line with a label
    Minimal,
    Custom(CustomScaleBarFn),
}

/// Parameters for one scale bar instance.
#[derive(Debug, Clone)]
pub struct ScaleBarSpec {
    pub style: ScaleBarStyle,
    /// Fixed bar length; None resolves a nice length from map width
    pub length_km: Option<f64>,
    pub segments: usize,
    pub font_size: f32,
    pub line_width: f32,
    pub corner: Corner,
    /// Inset from the anchor corner, fraction of the map rectangle
    pub pad: f64,
}

impl Default for ScaleBarSpec {
    fn default() -> Self {
        Self {
            style: ScaleBarStyle::Segmented,
            length_km: None,
            segments: 4,
            font_size: 14.0,
            line_width: 2.0,
            corner: Corner::SouthWest,
            pad: 0.05,
        }
    }
}

/// A scale bar whose length and pixel geometry are fixed; ready to be
/// drawn by any style.
#[derive(Debug, Clone)]
pub struct ResolvedScaleBar {
    pub length_km: f64,
    /// Left end of the bar in pixels
    pub x0: f32,
    /// Baseline y in pixels
    pub y: f32,
    pub px_len: f32,
    pub bar_height: f32,
    pub segments: usize,
    pub font_size: f32,
    pub line_width: f32,
}

impl ResolvedScaleBar {
    pub fn label(&self) -> String {
        if (self.length_km.fract()).abs() < 1e-9 {
            format!("{} km", self.length_km as i64)
        } else {
            format!("{} km", self.length_km)
        }
    }
}

/// Round the target length up to the nearest 1/2/5/10 x 10^k.
///
/// The target is one 4.8th of the visible width, so the bar spans
/// roughly a fifth of the panel.
pub fn nice_length_km(visible_width_m: f64) -> f64 {
    let target = (visible_width_m / 4.8) / 1000.0;
    if !target.is_finite() || target <= 0.0 {
        return 1.0;
    }
    let k = target.log10().floor();
    let magnitude = 10f64.powf(k);
    for mult in [1.0, 2.0, 5.0, 10.0] {
        let candidate = mult * magnitude;
        if candidate >= target {
            return candidate;
        }
    }
    10.0 * magnitude
}

/// Resolve length and geometry for a bar anchored inside `map_rect`.
pub fn resolve(
    spec: &ScaleBarSpec,
    map_rect: &PixelRect,
    meters_per_px: f64,
    offset: (f64, f64),
) -> ResolvedScaleBar {
    let length_km = match spec.length_km {
        Some(len) if len > 0.0 => len,
        _ => nice_length_km(map_rect.w as f64 * meters_per_px),
    };

    let mut px_len = if meters_per_px > 0.0 {
        (length_km * 1000.0 / meters_per_px) as f32
    } else {
        map_rect.w as f32 / 5.0
    };
    px_len = px_len.clamp(8.0, map_rect.w as f32 * 0.9);

    let anchor = anchor_point(map_rect, spec.corner, spec.pad);
    let (ax, ay) = apply_offset(anchor, map_rect, offset);
    let x0 = if spec.corner.is_east() { ax - px_len } else { ax };

    ResolvedScaleBar {
        length_km,
        x0,
        y: ay,
        px_len,
        bar_height: (spec.font_size * 0.45).max(4.0),
        segments: spec.segments.max(1),
        font_size: spec.font_size,
        line_width: spec.line_width,
    }
}

/// Draw a scale bar. Resolution happens here; the style only renders.
pub fn draw(
    canvas: &mut Canvas,
    map_rect: &PixelRect,
    meters_per_px: f64,
    spec: &ScaleBarSpec,
    offset: (f64, f64),
) {
    let bar = resolve(spec, map_rect, meters_per_px, offset);
    match spec.style {
        ScaleBarStyle::Segmented => draw_segmented(canvas, &bar),
        ScaleBarStyle::Ruled => draw_ruled(canvas, &bar),
        ScaleBarStyle::Ruler => draw_ruler(canvas, &bar),
        ScaleBarStyle::DoubleBand => draw_double_band(canvas, &bar),
        ScaleBarStyle::Minimal => draw_minimal(canvas, &bar),
        ScaleBarStyle::Custom(f) => f(canvas, &bar),
    }
}

fn label_above(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
    canvas.text_centered(
        bar.x0 + bar.px_len / 2.0,
        bar.y - bar.bar_height - bar.font_size - 2.0,
        bar.font_size,
        BLACK,
        &bar.label(),
    );
}

fn draw_segmented(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
    let seg_w = bar.px_len / bar.segments as f32;
    for i in 0..bar.segments {
        let color: Rgba<u8> = if i % 2 == 0 { BLACK } else { WHITE };
        canvas.fill_rect(
            PixelRect {
                x: (bar.x0 + i as f32 * seg_w).round() as i32,
                y: (bar.y - bar.bar_height).round() as i32,
                w: seg_w.round().max(1.0) as u32,
                h: bar.bar_height.round().max(1.0) as u32,
            },
            color,
        );
    }
    canvas.hollow_rect(
        PixelRect {
            x: bar.x0.round() as i32,
            y: (bar.y - bar.bar_height).round() as i32,
            w: bar.px_len.round().max(1.0) as u32,
            h: bar.bar_height.round().max(1.0) as u32,
        },
        BLACK,
    );
    label_above(canvas, bar);
}

fn draw_ruled(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
    let tick = bar.bar_height;
    canvas.line((bar.x0, bar.y), (bar.x0 + bar.px_len, bar.y), bar.line_width, BLACK);
    canvas.line((bar.x0, bar.y - tick), (bar.x0, bar.y), bar.line_width, BLACK);
    canvas.line(
        (bar.x0 + bar.px_len, bar.y - tick),
        (bar.x0 + bar.px_len, bar.y),
        bar.line_width,
        BLACK,
    );
    label_above(canvas, bar);
}

fn draw_ruler(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
    canvas.line((bar.x0, bar.y), (bar.x0 + bar.px_len, bar.y), bar.line_width, BLACK);
    let seg_w = bar.px_len / bar.segments as f32;
    let km_per_seg = bar.length_km / bar.segments as f64;
    for i in 0..=bar.segments {
        let x = bar.x0 + i as f32 * seg_w;
        let tick = if i == 0 || i == bar.segments {
            bar.bar_height
        } else {
            bar.bar_height * 0.6
        };
        canvas.line((x, bar.y - tick), (x, bar.y), bar.line_width, BLACK);
        let km = km_per_seg * i as f64;
        let text = if km.fract().abs() < 1e-9 {
            format!("{}", km as i64)
        } else {
            format!("{:.1}", km)
        };
        canvas.text_centered(
            x,
            bar.y - bar.bar_height - bar.font_size - 2.0,
            bar.font_size * 0.85,
            BLACK,
            &text,
        );
    }
    // Unit sits to the right of the bar
    canvas.text(
        bar.x0 + bar.px_len + bar.font_size * 0.4,
        bar.y - bar.font_size * 0.8,
        bar.font_size * 0.85,
        BLACK,
        "km",
    );
}

fn draw_double_band(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
    let seg_w = bar.px_len / bar.segments as f32;
    let band_h = (bar.bar_height / 2.0).max(2.0);
    for row in 0..2 {
        for i in 0..bar.segments {
            let dark = (i + row) % 2 == 0;
            let color: Rgba<u8> = if dark { BLACK } else { WHITE };
            canvas.fill_rect(
                PixelRect {
                    x: (bar.x0 + i as f32 * seg_w).round() as i32,
                    y: (bar.y - bar.bar_height + row as f32 * band_h).round() as i32,
                    w: seg_w.round().max(1.0) as u32,
                    h: band_h.round().max(1.0) as u32,
                },
                color,
            );
        }
    }
    canvas.hollow_rect(
        PixelRect {
            x: bar.x0.round() as i32,
            y: (bar.y - bar.bar_height).round() as i32,
            w: bar.px_len.round().max(1.0) as u32,
            h: bar.bar_height.round().max(1.0) as u32,
        },
        BLACK,
    );
    label_above(canvas, bar);
}

fn draw_minimal(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
    canvas.line(
        (bar.x0, bar.y),
        (bar.x0 + bar.px_len, bar.y),
        (bar.line_width * 2.0).max(3.0),
        BLACK,
    );
    label_above(canvas, bar);
}

/// Style names as they appear in job files; `Custom` is code-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleBarStyleName {
    Segmented,
    Ruled,
    Ruler,
    DoubleBand,
    Minimal,
}

impl From<ScaleBarStyleName> for ScaleBarStyle {
    fn from(name: ScaleBarStyleName) -> Self {
        match name {
            ScaleBarStyleName::Segmented => ScaleBarStyle::Segmented,
            ScaleBarStyleName::Ruled => ScaleBarStyle::Ruled,
            ScaleBarStyleName::Ruler => ScaleBarStyle::Ruler,
            ScaleBarStyleName::DoubleBand => ScaleBarStyle::DoubleBand,
            ScaleBarStyleName::Minimal => ScaleBarStyle::Minimal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: PixelRect = PixelRect {
        x: 0,
        y: 0,
        w: 1000,
        h: 800,
    };

    #[test]
    fn test_nice_length_rounds_up() {
        // 480 km wide -> target 100 km -> first candidate >= 100 is 100
        assert_eq!(nice_length_km(480_000.0), 100.0);
        // target 62.5 -> 100
        assert_eq!(nice_length_km(300_000.0), 100.0);
        // target 12.5 -> 20
        assert_eq!(nice_length_km(60_000.0), 20.0);
        // target 1.04 -> 2
        assert_eq!(nice_length_km(5_000.0), 2.0);
    }

    #[test]
    fn test_nice_length_degenerate_width() {
        assert_eq!(nice_length_km(0.0), 1.0);
        assert_eq!(nice_length_km(f64::NAN), 1.0);
    }

    #[test]
    fn test_user_length_wins_over_nice_length() {
        let spec = ScaleBarSpec {
            length_km: Some(42.0),
            ..Default::default()
        };
        let bar = resolve(&spec, &MAP, 100.0, (0.0, 0.0));
        assert_eq!(bar.length_km, 42.0);
    }

    #[test]
    fn test_resolved_px_len_follows_scale() {
        let spec = ScaleBarSpec {
            length_km: Some(10.0),
            ..Default::default()
        };
        // 10 km at 100 m/px = 100 px
        let bar = resolve(&spec, &MAP, 100.0, (0.0, 0.0));
        assert_eq!(bar.px_len, 100.0);
    }

    #[test]
    fn test_px_len_clamped_to_map_width() {
        let spec = ScaleBarSpec {
            length_km: Some(10_000.0),
            ..Default::default()
        };
        let bar = resolve(&spec, &MAP, 100.0, (0.0, 0.0));
        assert!(bar.px_len <= MAP.w as f32 * 0.9);
    }

    #[test]
    fn test_east_corner_extends_leftward() {
        let spec = ScaleBarSpec {
            length_km: Some(10.0),
            corner: Corner::SouthEast,
            pad: 0.0,
            ..Default::default()
        };
        let bar = resolve(&spec, &MAP, 100.0, (0.0, 0.0));
        assert_eq!(bar.x0 + bar.px_len, MAP.right() as f32);
    }

    #[test]
    fn test_offset_shifts_bar() {
        let spec = ScaleBarSpec {
            length_km: Some(10.0),
            pad: 0.0,
            ..Default::default()
        };
        let base = resolve(&spec, &MAP, 100.0, (0.0, 0.0));
        let moved = resolve(&spec, &MAP, 100.0, (0.1, 0.0));
        assert_eq!(moved.x0 - base.x0, 100.0);
    }

    #[test]
    fn test_label_formatting() {
        let spec = ScaleBarSpec {
            length_km: Some(50.0),
            ..Default::default()
        };
        let bar = resolve(&spec, &MAP, 100.0, (0.0, 0.0));
        assert_eq!(bar.label(), "50 km");
    }

    #[test]
    fn test_every_style_draws_without_font() {
        let styles = [
            ScaleBarStyle::Segmented,
            ScaleBarStyle::Ruled,
            ScaleBarStyle::Ruler,
            ScaleBarStyle::DoubleBand,
            ScaleBarStyle::Minimal,
        ];
        for style in styles {
            let mut canvas = Canvas::new(1000, 800, None).unwrap();
            let spec = ScaleBarSpec {
                style,
                length_km: Some(20.0),
                ..Default::default()
            };
            draw(&mut canvas, &MAP, 100.0, &spec, (0.0, 0.0));
        }
    }

    #[test]
    fn test_custom_style_callback_runs() {
        fn mark(canvas: &mut Canvas, bar: &ResolvedScaleBar) {
            canvas.put_pixel(bar.x0 as i32, bar.y as i32, BLACK);
        }
        let mut canvas = Canvas::new(1000, 800, None).unwrap();
        let spec = ScaleBarSpec {
            style: ScaleBarStyle::Custom(mark),
            length_km: Some(10.0),
            corner: Corner::NorthWest,
            pad: 0.1,
            ..Default::default()
        };
        draw(&mut canvas, &MAP, 100.0, &spec, (0.0, 0.0));
        assert_eq!(canvas.pixel(100, 80), BLACK);
    }
}
