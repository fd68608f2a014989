//! North indicators.
//!
//! Stateless: every style draws from the same `(anchor, size, pad)`
//! contract, so styles are interchangeable without touching call
//! sites. Sizes are fractions of the map rectangle height.

use serde::Deserialize;

use super::canvas::{Canvas, PixelRect, BLACK, WHITE};
use super::{anchor_point, apply_offset, Corner};

/// Callback signature for externally supplied renderers.
pub type CustomNorthFn = fn(&mut Canvas, &NorthFrame);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NorthStyle {
    /// Solid upward triangle
    Triangle,
    /// Arrow head on a shaft
    ArrowShaft,
    /// Circled needle
    Compass,
    /// Four-point star
    Star,
    /// Bare thin arrow
    Minimal,
    Custom(CustomNorthFn),
}

/// Parameters for one north indicator.
#[derive(Debug, Clone)]
pub struct NorthSpec {
    pub style: NorthStyle,
    /// Indicator height as a fraction of the map rectangle height
    pub size: f64,
    pub font_size: f32,
    pub line_width: f32,
    pub corner: Corner,
    pub pad: f64,
}

impl Default for NorthSpec {
    fn default() -> Self {
        Self {
            style: NorthStyle::Triangle,
            size: 0.08,
            font_size: 14.0,
            line_width: 2.0,
            corner: Corner::NorthEast,
            pad: 0.04,
        }
    }
}

/// Resolved pixel frame handed to each style.
#[derive(Debug, Clone, Copy)]
pub struct NorthFrame {
    /// Horizontal center
    pub cx: f32,
    /// Top of the indicator
    pub top: f32,
    /// Indicator height in pixels
    pub height: f32,
    pub font_size: f32,
    pub line_width: f32,
}

/// Draw a north indicator anchored inside `map_rect`.
pub fn draw(canvas: &mut Canvas, map_rect: &PixelRect, spec: &NorthSpec, offset: (f64, f64)) {
    let height = (spec.size * map_rect.h as f64).max(8.0) as f32;
    let anchor = anchor_point(map_rect, spec.corner, spec.pad);
    let (ax, ay) = apply_offset(anchor, map_rect, offset);

    // The anchor is the indicator's near corner; center it horizontally
    // a half-width inward and hang it downward from northern corners
    let half_w = height * 0.35;
    let cx = if spec.corner.is_east() { ax - half_w } else { ax + half_w };
    let top = if spec.corner.is_north() { ay } else { ay - height };

    let frame = NorthFrame {
        cx,
        top,
        height,
        font_size: spec.font_size,
        line_width: spec.line_width,
    };

    match spec.style {
        NorthStyle::Triangle => draw_triangle(canvas, &frame),
        NorthStyle::ArrowShaft => draw_arrow_shaft(canvas, &frame),
        NorthStyle::Compass => draw_compass(canvas, &frame),
        NorthStyle::Star => draw_star(canvas, &frame),
        NorthStyle::Minimal => draw_minimal(canvas, &frame),
        NorthStyle::Custom(f) => f(canvas, &frame),
    }
}

fn label_below(canvas: &mut Canvas, frame: &NorthFrame) {
    canvas.text_centered(
        frame.cx,
        frame.top + frame.height + 2.0,
        frame.font_size,
        BLACK,
        "N",
    );
}

fn draw_triangle(canvas: &mut Canvas, frame: &NorthFrame) {
    let half_w = frame.height * 0.35;
    canvas.fill_polygon(
        &[
            (frame.cx, frame.top),
            (frame.cx + half_w, frame.top + frame.height),
            (frame.cx - half_w, frame.top + frame.height),
        ],
        BLACK,
    );
    label_below(canvas, frame);
}

fn draw_arrow_shaft(canvas: &mut Canvas, frame: &NorthFrame) {
    let head_h = frame.height * 0.45;
    let half_w = frame.height * 0.3;
    let bottom = frame.top + frame.height;
    canvas.fill_polygon(
        &[
            (frame.cx, frame.top),
            (frame.cx + half_w, frame.top + head_h),
            (frame.cx - half_w, frame.top + head_h),
        ],
        BLACK,
    );
    canvas.line(
        (frame.cx, frame.top + head_h),
        (frame.cx, bottom),
        frame.line_width,
        BLACK,
    );
    label_below(canvas, frame);
}

fn draw_compass(canvas: &mut Canvas, frame: &NorthFrame) {
    let radius = frame.height / 2.0;
    let cy = frame.top + radius;
    canvas.hollow_circle((frame.cx, cy), radius, BLACK);
    // Needle: dark north half, light south half
    let half_w = radius * 0.35;
    canvas.fill_polygon(
        &[
            (frame.cx, frame.top),
            (frame.cx + half_w, cy),
            (frame.cx - half_w, cy),
        ],
        BLACK,
    );
    canvas.fill_polygon(
        &[
            (frame.cx, frame.top + frame.height),
            (frame.cx + half_w, cy),
            (frame.cx - half_w, cy),
        ],
        WHITE,
    );
    canvas.hollow_circle((frame.cx, cy), radius - 1.0, BLACK);
    label_below(canvas, frame);
}

fn draw_star(canvas: &mut Canvas, frame: &NorthFrame) {
    let half = frame.height / 2.0;
    let cy = frame.top + half;
    let inner = half * 0.3;
    // Four long points with short diagonals between them
    let pts = [
        (frame.cx, frame.top),
        (frame.cx + inner, cy - inner),
        (frame.cx + half, cy),
        (frame.cx + inner, cy + inner),
        (frame.cx, frame.top + frame.height),
        (frame.cx - inner, cy + inner),
        (frame.cx - half, cy),
        (frame.cx - inner, cy - inner),
    ];
    canvas.fill_polygon(&pts, BLACK);
    label_below(canvas, frame);
}

fn draw_minimal(canvas: &mut Canvas, frame: &NorthFrame) {
    let bottom = frame.top + frame.height;
    let wing = frame.height * 0.25;
    canvas.line((frame.cx, frame.top), (frame.cx, bottom), frame.line_width, BLACK);
    canvas.line(
        (frame.cx, frame.top),
        (frame.cx - wing, frame.top + wing),
        frame.line_width,
        BLACK,
    );
    canvas.line(
        (frame.cx, frame.top),
        (frame.cx + wing, frame.top + wing),
        frame.line_width,
        BLACK,
    );
    label_below(canvas, frame);
}

/// Style names as they appear in job files; `Custom` is code-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NorthStyleName {
    Triangle,
    ArrowShaft,
    Compass,
    Star,
    Minimal,
}

impl From<NorthStyleName> for NorthStyle {
    fn from(name: NorthStyleName) -> Self {
        match name {
            NorthStyleName::Triangle => NorthStyle::Triangle,
            NorthStyleName::ArrowShaft => NorthStyle::ArrowShaft,
            NorthStyleName::Compass => NorthStyle::Compass,
            NorthStyleName::Star => NorthStyle::Star,
            NorthStyleName::Minimal => NorthStyle::Minimal,
        }
    }
}
