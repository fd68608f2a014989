//! Rendering: panel images, boundary outlines, and decorations.

pub mod canvas;
pub mod colorbar;
pub mod draw;
pub mod north;
pub mod offsets;
pub mod scalebar;

use serde::{Deserialize, Serialize};

pub use canvas::{Canvas, PixelRect, BLACK, WHITE};
pub use offsets::{DecorationKind, OffsetStore};

/// Anchor corner for a decoration, in map terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub fn is_east(self) -> bool {
        matches!(self, Corner::NorthEast | Corner::SouthEast)
    }

    pub fn is_north(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }
}

/// Anchor point in pixels for a corner of `rect`, inset by `pad`
/// expressed as a fraction of the rectangle size.
pub fn anchor_point(rect: &PixelRect, corner: Corner, pad: f64) -> (f32, f32) {
    let pad_x = (pad * rect.w as f64) as f32;
    let pad_y = (pad * rect.h as f64) as f32;
    let x = if corner.is_east() {
        rect.right() as f32 - pad_x
    } else {
        rect.x as f32 + pad_x
    };
    let y = if corner.is_north() {
        rect.y as f32 + pad_y
    } else {
        rect.bottom() as f32 - pad_y
    };
    (x, y)
}

/// Apply a persisted panel-fraction offset (+y up) to a pixel anchor.
pub fn apply_offset(anchor: (f32, f32), rect: &PixelRect, offset: (f64, f64)) -> (f32, f32) {
    (
        anchor.0 + (offset.0 * rect.w as f64) as f32,
        anchor.1 - (offset.1 * rect.h as f64) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: PixelRect = PixelRect {
        x: 100,
        y: 200,
        w: 400,
        h: 300,
    };

    #[test]
    fn test_anchor_corners() {
        assert_eq!(anchor_point(&RECT, Corner::NorthWest, 0.0), (100.0, 200.0));
        assert_eq!(anchor_point(&RECT, Corner::SouthEast, 0.0), (500.0, 500.0));
    }

    #[test]
    fn test_anchor_pad_insets() {
        let (x, y) = anchor_point(&RECT, Corner::SouthWest, 0.05);
        assert_eq!(x, 100.0 + 20.0);
        assert_eq!(y, 500.0 - 15.0);
    }

    #[test]
    fn test_offset_moves_up_for_positive_dy() {
        let moved = apply_offset((100.0, 500.0), &RECT, (0.1, 0.1));
        assert_eq!(moved, (140.0, 470.0));
    }
}
