//! Colorbars.
//!
//! A colorbar is the palette strip for one resolved value range plus
//! tick marks whose first and last values are pinned to the range
//! extremes. Per-panel bars hang off their panel; the shared bar lives
//! in the layout's reserved band, shortened by a shrink percentage and
//! centered along its side.

use serde::Deserialize;

use super::canvas::{Canvas, PixelRect, BLACK};
use super::{apply_offset, DecorationKind};
use crate::layout::{DecorationSide, FracRect};
use crate::normalize::{ticks, ValueRange};
use crate::palette::PaletteTable;
use crate::render::OffsetStore;

pub const DEFAULT_TICK_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl From<DecorationSide> for Orientation {
    fn from(side: DecorationSide) -> Self {
        if side.is_vertical() {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

/// Geometry and labeling parameters for one colorbar.
#[derive(Debug, Clone)]
pub struct ColorbarSpec {
    /// Strip thickness as a fraction of the panel size
    pub thickness: f64,
    /// Gap between panel and strip, fraction of the panel size
    pub pad: f64,
    /// Shared-bar length percentage, clamped to 30..=100
    pub shrink: f64,
    pub tick_count: usize,
    pub font_size: f32,
    pub label: Option<String>,
}

impl Default for ColorbarSpec {
    fn default() -> Self {
        Self {
            thickness: 0.04,
            pad: 0.02,
            shrink: 100.0,
            tick_count: DEFAULT_TICK_COUNT,
            font_size: 12.0,
            label: None,
        }
    }
}

/// Clamp the shrink percentage to its legal window and return a 0..=1
/// factor.
pub fn shrink_factor(shrink: f64) -> f64 {
    shrink.clamp(30.0, 100.0) / 100.0
}

/// Compact tick label, trailing zeros trimmed.
pub fn format_value(v: f32) -> String {
    if !v.is_finite() {
        return String::new();
    }
    if v.abs() >= 1000.0 {
        // Round half away from zero; the formatter's half-to-even would
        // print 1234.5 as 1234
        return format!("{:.0}", v.round());
    }
    let text = format!("{:.2}", v);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Draw the palette strip with its outline, ticks, and labels.
pub fn draw_strip(
    canvas: &mut Canvas,
    strip: PixelRect,
    orientation: Orientation,
    palette: &PaletteTable,
    range: ValueRange,
    spec: &ColorbarSpec,
) {
    if strip.w == 0 || strip.h == 0 {
        return;
    }

    match orientation {
        Orientation::Vertical => {
            for dy in 0..strip.h {
                // Row 0 is the top of the strip, which carries vmax
                let frac = 1.0 - dy as f32 / (strip.h - 1).max(1) as f32;
                let [r, g, b, a] = palette.color_at(frac);
                canvas.fill_rect(
                    PixelRect {
                        x: strip.x,
                        y: strip.y + dy as i32,
                        w: strip.w,
                        h: 1,
                    },
                    image::Rgba([r, g, b, a]),
                );
            }
        }
        Orientation::Horizontal => {
            for dx in 0..strip.w {
                let frac = dx as f32 / (strip.w - 1).max(1) as f32;
                let [r, g, b, a] = palette.color_at(frac);
                canvas.fill_rect(
                    PixelRect {
                        x: strip.x + dx as i32,
                        y: strip.y,
                        w: 1,
                        h: strip.h,
                    },
                    image::Rgba([r, g, b, a]),
                );
            }
        }
    }
    canvas.hollow_rect(strip, BLACK);

    let values = ticks(range, spec.tick_count.max(2));
    let count = values.len();
    for (i, value) in values.iter().enumerate() {
        let frac = i as f32 / (count - 1) as f32;
        let text = format_value(*value);
        match orientation {
            Orientation::Vertical => {
                let y = strip.bottom() as f32 - frac * strip.h as f32;
                canvas.line(
                    (strip.right() as f32, y),
                    (strip.right() as f32 + 4.0, y),
                    1.0,
                    BLACK,
                );
                canvas.text(
                    strip.right() as f32 + 6.0,
                    y - spec.font_size / 2.0,
                    spec.font_size,
                    BLACK,
                    &text,
                );
            }
            Orientation::Horizontal => {
                let x = strip.x as f32 + frac * strip.w as f32;
                canvas.line(
                    (x, strip.bottom() as f32),
                    (x, strip.bottom() as f32 + 4.0),
                    1.0,
                    BLACK,
                );
                canvas.text_centered(
                    x,
                    strip.bottom() as f32 + 6.0,
                    spec.font_size,
                    BLACK,
                    &text,
                );
            }
        }
    }

    if let Some(label) = &spec.label {
        match orientation {
            Orientation::Vertical => {
                canvas.text_centered(
                    strip.center().0,
                    strip.y as f32 - spec.font_size - 4.0,
                    spec.font_size,
                    BLACK,
                    label,
                );
            }
            Orientation::Horizontal => {
                canvas.text_centered(
                    strip.center().0,
                    strip.bottom() as f32 + spec.font_size + 10.0,
                    spec.font_size,
                    BLACK,
                    label,
                );
            }
        }
    }
}

/// Per-panel colorbar on the panel's right edge.
pub fn draw_panel_colorbar(
    canvas: &mut Canvas,
    panel: &PixelRect,
    palette: &PaletteTable,
    range: ValueRange,
    spec: &ColorbarSpec,
    offsets: &OffsetStore,
) {
    let thickness = (spec.thickness * panel.w as f64).max(3.0) as u32;
    let pad = (spec.pad * panel.w as f64) as i32;
    let base = (panel.right() as f32 + pad as f32, panel.y as f32);
    let (x, y) = apply_offset(base, panel, offsets.get(DecorationKind::Colorbar));
    let strip = PixelRect {
        x: x.round() as i32,
        y: y.round() as i32,
        w: thickness,
        h: panel.h,
    };
    draw_strip(canvas, strip, Orientation::Vertical, palette, range, spec);
}

/// Shared colorbar inside the layout's reserved band.
pub fn draw_shared_colorbar(
    canvas: &mut Canvas,
    band: &FracRect,
    side: DecorationSide,
    palette: &PaletteTable,
    range: ValueRange,
    spec: &ColorbarSpec,
    offsets: &OffsetStore,
) {
    let band_px = canvas.px_rect(band);
    let factor = shrink_factor(spec.shrink);
    let orientation = Orientation::from(side);

    let strip = match orientation {
        Orientation::Vertical => {
            let h = (band_px.h as f64 * factor) as u32;
            PixelRect {
                x: band_px.x,
                y: band_px.y + ((band_px.h - h) / 2) as i32,
                w: band_px.w.min(24),
                h,
            }
        }
        Orientation::Horizontal => {
            let w = (band_px.w as f64 * factor) as u32;
            PixelRect {
                x: band_px.x + ((band_px.w - w) / 2) as i32,
                y: band_px.y,
                w,
                h: band_px.h.min(24),
            }
        }
    };

    let (x, y) = apply_offset(
        (strip.x as f32, strip.y as f32),
        &band_px,
        offsets.get(DecorationKind::Colorbar),
    );
    let strip = PixelRect {
        x: x.round() as i32,
        y: y.round() as i32,
        ..strip
    };
    draw_strip(canvas, strip, orientation, palette, range, spec);
}
