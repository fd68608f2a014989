//! Multi-panel layout planning.
//!
//! Margins and spacing are fractions of the canvas, bottom-left
//! origin. Spacing shrinks as the panel count grows (a coarse lookup,
//! not a formula); margins widen on whichever side hosts a shared
//! decoration band and at the bottom when a caption is present, and
//! are clamped so the plotting area never degenerates.

use serde::{Deserialize, Serialize};

use crate::error::{PapermapError, Result};

/// Which canvas edge a shared decoration band occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl DecorationSide {
    pub fn is_vertical(self) -> bool {
        matches!(self, DecorationSide::Left | DecorationSide::Right)
    }
}

/// A rectangle in canvas fractions, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl FracRect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// The computed layout for one composition. Never mutated; a changed
/// grid shape or decoration configuration produces a fresh plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub rows: usize,
    pub cols: usize,
    /// Left edge of the plotting area
    pub left: f64,
    /// Right edge of the plotting area
    pub right: f64,
    /// Bottom edge of the plotting area
    pub bottom: f64,
    /// Top edge of the plotting area
    pub top: f64,
    /// Horizontal gap as a fraction of panel width
    pub wspace: f64,
    /// Vertical gap as a fraction of panel height
    pub hspace: f64,
    /// Side reserved for the shared decoration band, if any
    pub shared_side: Option<DecorationSide>,
}

/// Advisory canvas size for a given grid shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeAdvice {
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    pub wspace: f64,
    pub hspace: f64,
    pub preview_width_px: u32,
    pub preview_height_px: u32,
}

fn wspace_for(cols: usize) -> f64 {
    match cols {
        0 | 1 => 0.12,
        2 => 0.08,
        3 => 0.05,
        _ => 0.02,
    }
}

fn hspace_for(rows: usize) -> f64 {
    match rows {
        0 | 1 => 0.22,
        2 => 0.18,
        _ => 0.12,
    }
}

/// Compute the layout for `rows` x `cols` panels.
pub fn plan(
    rows: usize,
    cols: usize,
    shared_side: Option<DecorationSide>,
    has_caption: bool,
) -> Result<LayoutPlan> {
    if rows == 0 || cols == 0 {
        return Err(PapermapError::InvalidParameter {
            param: "rows/cols".to_string(),
            message: format!("Panel grid {}x{} is empty", rows, cols),
        });
    }

    let mut wspace = wspace_for(cols);
    let hspace = hspace_for(rows);

    let mut left: f64 = 0.05;
    let mut right: f64 = 0.95;
    let mut top: f64 = 0.92;
    let mut bottom: f64 = 0.08;

    match shared_side {
        Some(DecorationSide::Right) => {
            right = 0.86;
            // Dense grids need breathing room next to the band, so the
            // shared side imposes a spacing floor
            wspace = wspace.max(0.05);
        }
        Some(DecorationSide::Left) => {
            left = 0.14;
            wspace = wspace.max(0.05);
        }
        Some(DecorationSide::Top) => top = 0.84,
        Some(DecorationSide::Bottom) => bottom = 0.16,
        None => {}
    }

    if has_caption {
        bottom += 0.06;
    }

    left = left.clamp(0.01, 0.2);
    bottom = bottom.clamp(0.01, 0.2);
    right = right.clamp(0.8, 0.99);
    top = top.clamp(0.8, 0.99);

    Ok(LayoutPlan {
        rows,
        cols,
        left,
        right,
        bottom,
        top,
        wspace,
        hspace,
        shared_side,
    })
}

impl LayoutPlan {
    pub fn panel_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Rectangle of the panel at `index` in reading order (row-major,
    /// row 0 at the top).
    pub fn panel_rect(&self, index: usize) -> FracRect {
        let row = index / self.cols;
        let col = index % self.cols;

        let total_w = self.right - self.left;
        let total_h = self.top - self.bottom;
        let panel_w = total_w / (self.cols as f64 + self.wspace * (self.cols as f64 - 1.0));
        let panel_h = total_h / (self.rows as f64 + self.hspace * (self.rows as f64 - 1.0));
        let gap_w = self.wspace * panel_w;
        let gap_h = self.hspace * panel_h;

        let x0 = self.left + col as f64 * (panel_w + gap_w);
        let y1 = self.top - row as f64 * (panel_h + gap_h);

        FracRect {
            x0,
            y0: y1 - panel_h,
            x1: x0 + panel_w,
            y1,
        }
    }

    /// The canvas strip reserved for the shared decoration band.
    pub fn shared_band_rect(&self) -> Option<FracRect> {
        let side = self.shared_side?;
        Some(match side {
            DecorationSide::Right => FracRect {
                x0: self.right + 0.02,
                x1: (self.right + 0.06).min(0.99),
                y0: self.bottom,
                y1: self.top,
            },
            DecorationSide::Left => FracRect {
                x0: (self.left - 0.06).max(0.01),
                x1: self.left - 0.02,
                y0: self.bottom,
                y1: self.top,
            },
            DecorationSide::Top => FracRect {
                x0: self.left,
                x1: self.right,
                y0: self.top + 0.02,
                y1: (self.top + 0.06).min(0.99),
            },
            DecorationSide::Bottom => FracRect {
                x0: self.left,
                x1: self.right,
                y0: (self.bottom - 0.06).max(0.01),
                y1: self.bottom - 0.02,
            },
        })
    }
}

fn panel_width_in(cols: usize) -> f64 {
    match cols {
        0 | 1 => 5.0,
        2 => 4.0,
        3 => 3.5,
        _ => 3.2,
    }
}

fn panel_height_in(rows: usize) -> f64 {
    match rows {
        0 | 1 => 3.5,
        2 => 3.0,
        _ => 2.8,
    }
}

/// Suggest a canvas size so more panels yield a bigger canvas with
/// roughly constant per-panel legibility. Advisory only; the caller
/// may apply or ignore it.
pub fn advise(
    rows: usize,
    cols: usize,
    shared_side: Option<DecorationSide>,
    has_caption: bool,
    dpi: u32,
) -> Result<SizeAdvice> {
    if rows == 0 || cols == 0 {
        return Err(PapermapError::InvalidParameter {
            param: "rows/cols".to_string(),
            message: format!("Panel grid {}x{} is empty", rows, cols),
        });
    }

    let mut margin_left = 0.5;
    let mut margin_right = 0.5;
    let mut margin_top = 0.8;
    let mut margin_bottom = 1.0;

    match shared_side {
        Some(DecorationSide::Right) => margin_right += 0.8,
        Some(DecorationSide::Left) => margin_left += 0.8,
        Some(DecorationSide::Top) => margin_top += 0.6,
        Some(DecorationSide::Bottom) => margin_bottom += 0.6,
        None => {}
    }
    if has_caption {
        margin_bottom += 0.5;
    }

    let figure_width_in = cols as f64 * panel_width_in(cols) + margin_left + margin_right;
    let figure_height_in = rows as f64 * panel_height_in(rows) + margin_top + margin_bottom;

    Ok(SizeAdvice {
        figure_width_in,
        figure_height_in,
        wspace: wspace_for(cols),
        hspace: hspace_for(rows),
        preview_width_px: (figure_width_in * dpi as f64).round() as u32,
        preview_height_px: (figure_height_in * dpi as f64).round() as u32,
    })
}
