//! Panel drawing: the grid image, the boundary outline, and overlay
//! layers.

use image::Rgba;
use tracing::warn;

use super::canvas::{Canvas, PixelRect, BLACK};
use crate::grid::ClippedGrid;
use crate::normalize::ValueRange;
use crate::palette::PaletteTable;
use crate::vector::{OverlayMode, VectorLayer};

/// Pixel frame of a drawn map plus the projection window it shows.
///
/// Holds what decorations need: the rectangle, the ground resolution,
/// and enough to project vector coordinates onto the image.
#[derive(Debug, Clone, Copy)]
pub struct MapFrame {
    pub rect: PixelRect,
    /// `[left, right, bottom, top]` in projected meters
    pub window: [f64; 4],
    pub meters_per_px: f64,
}

impl MapFrame {
    /// Project a point in projected meters to canvas pixels.
    pub fn to_px(&self, x: f64, y: f64) -> (f32, f32) {
        let [left, right, bottom, top] = self.window;
        let fx = (x - left) / (right - left);
        let fy = (top - y) / (top - bottom);
        (
            self.rect.x as f32 + (fx * self.rect.w as f64) as f32,
            self.rect.y as f32 + (fy * self.rect.h as f64) as f32,
        )
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA`; anything else is opaque black.
pub fn parse_color(text: &str) -> Rgba<u8> {
    let hex = text.trim_start_matches('#');
    let parse = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        6 => match (parse(0..2), parse(2..4), parse(4..6)) {
            (Some(r), Some(g), Some(b)) => Rgba([r, g, b, 255]),
            _ => BLACK,
        },
        8 => match (parse(0..2), parse(2..4), parse(4..6), parse(6..8)) {
            (Some(r), Some(g), Some(b), Some(a)) => Rgba([r, g, b, a]),
            _ => BLACK,
        },
        _ => {
            warn!(color = text, "Unparsable color, using black");
            BLACK
        }
    }
}

/// Largest rectangle of the grid's aspect ratio centered in the panel.
fn fit_rect(panel: &PixelRect, grid: &ClippedGrid) -> PixelRect {
    let [left, right, bottom, top] = grid.bounds();
    let aspect = (right - left) / (top - bottom);
    let panel_aspect = panel.w as f64 / panel.h as f64;

    let (w, h) = if aspect >= panel_aspect {
        (panel.w, ((panel.w as f64 / aspect) as u32).max(1))
    } else {
        (((panel.h as f64 * aspect) as u32).max(1), panel.h)
    };

    PixelRect {
        x: panel.x + ((panel.w - w) / 2) as i32,
        y: panel.y + ((panel.h - h) / 2) as i32,
        w,
        h,
    }
}

/// Draw the grid as a colored image inside the panel rectangle.
///
/// Sentinel cells stay the canvas background. Returns the map frame
/// the decorations anchor to.
pub fn draw_grid(
    canvas: &mut Canvas,
    panel: &PixelRect,
    grid: &ClippedGrid,
    palette: &PaletteTable,
    range: ValueRange,
) -> MapFrame {
    let rect = fit_rect(panel, grid);
    let [left, right, bottom, top] = grid.bounds();
    let transform = *grid.transform();

    for dy in 0..rect.h {
        let y = top - (dy as f64 + 0.5) / rect.h as f64 * (top - bottom);
        for dx in 0..rect.w {
            let x = left + (dx as f64 + 0.5) / rect.w as f64 * (right - left);
            let (fc, fr) = transform.invert(x, y);
            let (col, row) = (fc.floor() as isize, fr.floor() as isize);
            if col < 0 || row < 0 || col >= grid.width() as isize || row >= grid.height() as isize
            {
                continue;
            }
            let value = grid.data()[[row as usize, col as usize]];
            if !value.is_finite() {
                continue;
            }
            let [r, g, b, a] = palette.color_at(range.fraction(value));
            canvas.put_pixel(rect.x + dx as i32, rect.y + dy as i32, Rgba([r, g, b, a]));
        }
    }

    MapFrame {
        rect,
        window: [left, right, bottom, top],
        meters_per_px: (right - left) / rect.w as f64,
    }
}

/// Trace the boundary rings as an outline.
pub fn draw_boundary(
    canvas: &mut Canvas,
    frame: &MapFrame,
    boundary: &VectorLayer,
    line_width: f32,
    color: Rgba<u8>,
) {
    for feature in &boundary.polygons {
        for ring in feature {
            let points: Vec<(f32, f32)> =
                ring.iter().map(|&(x, y)| frame.to_px(x, y)).collect();
            canvas.polyline(&points, line_width, color);
        }
    }
}

/// Draw one overlay layer in the given mode.
pub fn draw_overlay(
    canvas: &mut Canvas,
    frame: &MapFrame,
    layer: &VectorLayer,
    mode: OverlayMode,
    color: Rgba<u8>,
    line_width: f32,
) {
    match mode {
        OverlayMode::Line => {
            for line in &layer.lines {
                let points: Vec<(f32, f32)> =
                    line.iter().map(|&(x, y)| frame.to_px(x, y)).collect();
                canvas.polyline(&points, line_width, color);
            }
        }
        OverlayMode::Boundary => {
            draw_boundary(canvas, frame, layer, line_width, color);
        }
        OverlayMode::Fill => {
            for feature in &layer.polygons {
                // Only the outer ring fills; holes would need even-odd
                // compositing the raster path does not provide
                if let Some(outer) = feature.first() {
                    let points: Vec<(f32, f32)> =
                        outer.iter().map(|&(x, y)| frame.to_px(x, y)).collect();
                    let fill = Rgba([color[0], color[1], color[2], 96]);
                    canvas.fill_polygon(&points, fill);
                    canvas.polyline(&points, line_width, color);
                }
            }
        }
        OverlayMode::Point => {
            for &(x, y) in &layer.points {
                let center = frame.to_px(x, y);
                canvas.fill_circle(center, (line_width * 2.0).max(3.0), color);
            }
        }
    }
}

/// Centered panel title above the map.
pub fn draw_title(canvas: &mut Canvas, panel: &PixelRect, title: &str, font_size: f32) {
    canvas.text_centered(
        panel.center().0,
        panel.y as f32 - font_size - 4.0,
        font_size,
        BLACK,
        title,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteStore;
    use crate::projection::GeoTransform;
    use crate::vector::VectorCrs;
    use ndarray::Array2;

    fn grid_10x20() -> ClippedGrid {
        // 10 rows x 20 cols, 100 m cells, so 2000 m x 1000 m
        let data = Array2::from_elem((10, 20), 5.0f32);
        ClippedGrid::new(data, GeoTransform::north_up(0.0, 1000.0, 100.0, 100.0)).unwrap()
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0000"), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("10a0ff"), Rgba([16, 160, 255, 255]));
        assert_eq!(parse_color("#00000080"), Rgba([0, 0, 0, 128]));
        assert_eq!(parse_color("junk"), BLACK);
    }

    #[test]
    fn test_fit_rect_preserves_aspect() {
        let panel = PixelRect {
            x: 0,
            y: 0,
            w: 400,
            h: 400,
        };
        let rect = fit_rect(&panel, &grid_10x20());
        // Grid is twice as wide as tall
        assert_eq!(rect.w, 400);
        assert_eq!(rect.h, 200);
        assert_eq!(rect.y, 100);
    }

    #[test]
    fn test_draw_grid_colors_finite_cells_only() {
        let mut data = Array2::from_elem((10, 10), 3.0f32);
        data[[0, 0]] = f32::NAN;
        let grid =
            ClippedGrid::new(data, GeoTransform::north_up(0.0, 1000.0, 100.0, 100.0)).unwrap();

        let store = PaletteStore::new();
        let palette = store.resolve("seq_viridis");
        let mut canvas = Canvas::new(100, 100, None).unwrap();
        let panel = PixelRect {
            x: 0,
            y: 0,
            w: 100,
            h: 100,
        };
        let frame = draw_grid(
            &mut canvas,
            &panel,
            &grid,
            &palette,
            ValueRange {
                vmin: 0.0,
                vmax: 10.0,
            },
        );
        assert_eq!(frame.rect.w, 100);
        assert_eq!(frame.meters_per_px, 10.0);
        // Top-left cell is sentinel, stays background white
        assert_eq!(canvas.pixel(2, 2), super::super::WHITE);
        // Center cell takes the palette color for fraction 0.3
        let expected = palette.color_at(0.3);
        assert_eq!(canvas.pixel(50, 50), Rgba(expected));
    }

    #[test]
    fn test_map_frame_projects_corners() {
        let frame = MapFrame {
            rect: PixelRect {
                x: 10,
                y: 20,
                w: 100,
                h: 50,
            },
            window: [0.0, 2000.0, 0.0, 1000.0],
            meters_per_px: 20.0,
        };
        assert_eq!(frame.to_px(0.0, 1000.0), (10.0, 20.0));
        assert_eq!(frame.to_px(2000.0, 0.0), (110.0, 70.0));
    }

    #[test]
    fn test_draw_overlay_point_marks_canvas() {
        let frame = MapFrame {
            rect: PixelRect {
                x: 0,
                y: 0,
                w: 100,
                h: 100,
            },
            window: [0.0, 100.0, 0.0, 100.0],
            meters_per_px: 1.0,
        };
        let layer = VectorLayer {
            crs: Some(VectorCrs::Projected),
            polygons: Vec::new(),
            lines: Vec::new(),
            points: vec![(50.0, 50.0)],
        };
        let mut canvas = Canvas::new(100, 100, None).unwrap();
        draw_overlay(
            &mut canvas,
            &frame,
            &layer,
            OverlayMode::Point,
            Rgba([200, 0, 0, 255]),
            1.5,
        );
        assert_eq!(canvas.pixel(50, 50), Rgba([200, 0, 0, 255]));
    }
}
