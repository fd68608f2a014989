//! The drawing surface.
//!
//! `Canvas` wraps an RGBA image and the loaded label font, and
//! translates canvas-fraction coordinates (bottom-left origin, as the
//! layout engine produces) into pixel coordinates (top-left origin, as
//! the image crates expect). All drawing goes through here so the rest
//! of the renderer never touches pixel-space conversions.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
    draw_line_segment_mut, draw_polygon_mut, draw_text_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use tracing::debug;

use crate::error::{PapermapError, Result};
use crate::layout::FracRect;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A pixel-space rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }
}

pub struct Canvas {
    img: RgbaImage,
    font: Option<Font<'static>>,
}

impl Canvas {
    /// A white canvas of the given pixel size.
    pub fn new(width: u32, height: u32, font: Option<Font<'static>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PapermapError::Render {
                message: format!("Canvas size {}x{} is degenerate", width, height),
            });
        }
        Ok(Self {
            img: RgbaImage::from_pixel(width, height, WHITE),
            font,
        })
    }

    /// Load a TrueType font for label text.
    pub fn load_font(path: &std::path::Path) -> Result<Font<'static>> {
        let data = std::fs::read(path)?;
        Font::try_from_vec(data).ok_or_else(|| PapermapError::Render {
            message: format!("Cannot parse font file {}", path.display()),
        })
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Convert a fraction point (bottom-left origin) to pixels.
    pub fn px_point(&self, fx: f64, fy: f64) -> (f32, f32) {
        (
            (fx * self.img.width() as f64) as f32,
            ((1.0 - fy) * self.img.height() as f64) as f32,
        )
    }

    /// Convert a fraction rectangle to a pixel rectangle.
    pub fn px_rect(&self, rect: &FracRect) -> PixelRect {
        let (x0, y1) = self.px_point(rect.x0, rect.y0);
        let (x1, y0) = self.px_point(rect.x1, rect.y1);
        PixelRect {
            x: x0.round() as i32,
            y: y0.round() as i32,
            w: (x1 - x0).round().max(1.0) as u32,
            h: (y1 - y0).round().max(1.0) as u32,
        }
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.img.width() && (y as u32) < self.img.height() {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    /// A straight line with the given stroke width in pixels.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba<u8>) {
        let strokes = width.round().max(1.0) as i32;
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return;
        }
        // Offset parallel strokes along the perpendicular
        let (nx, ny) = (-dy / len, dx / len);
        for i in 0..strokes {
            let off = i as f32 - (strokes - 1) as f32 / 2.0;
            let shift = (nx * off, ny * off);
            draw_line_segment_mut(
                &mut self.img,
                (from.0 + shift.0, from.1 + shift.1),
                (to.0 + shift.0, to.1 + shift.1),
                color,
            );
        }
    }

    pub fn polyline(&mut self, points: &[(f32, f32)], width: f32, color: Rgba<u8>) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        draw_filled_rect_mut(
            &mut self.img,
            Rect::at(rect.x, rect.y).of_size(rect.w, rect.h),
            color,
        );
    }

    pub fn hollow_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        draw_hollow_rect_mut(
            &mut self.img,
            Rect::at(rect.x, rect.y).of_size(rect.w, rect.h),
            color,
        );
    }

    /// A filled polygon; the closing point must not repeat the first.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba<u8>) {
        let mut poly: Vec<Point<i32>> = points
            .iter()
            .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        poly.dedup();
        if poly.len() >= 2 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() < 3 {
            return;
        }
        draw_polygon_mut(&mut self.img, &poly, color);
    }

    pub fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        draw_filled_circle_mut(
            &mut self.img,
            (center.0.round() as i32, center.1.round() as i32),
            radius.round().max(1.0) as i32,
            color,
        );
    }

    pub fn hollow_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        draw_hollow_circle_mut(
            &mut self.img,
            (center.0.round() as i32, center.1.round() as i32),
            radius.round().max(1.0) as i32,
            color,
        );
    }

    /// Draw text with its top-left at (x, y). A missing font skips the
    /// label and logs once per call site at debug.
    pub fn text(&mut self, x: f32, y: f32, size: f32, color: Rgba<u8>, text: &str) {
        let Some(font) = self.font.as_ref() else {
            debug!(text = text, "No font loaded, skipping label");
            return;
        };
        draw_text_mut(
            &mut self.img,
            color,
            x.round() as i32,
            y.round() as i32,
            Scale::uniform(size),
            font,
            text,
        );
    }

    /// Advance width of a string at the given size, 0 without a font.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let Some(font) = self.font.as_ref() else {
            return 0.0;
        };
        let scale = Scale::uniform(size);
        font.layout(text, scale, rusttype::point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Draw centered text around (cx, y_top).
    pub fn text_centered(&mut self, cx: f32, y: f32, size: f32, color: Rgba<u8>, text: &str) {
        let w = self.text_width(text, size);
        self.text(cx - w / 2.0, y, size, color, text);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.img.get_pixel(x, y)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }
}
