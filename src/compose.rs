//! The composition driver.
//!
//! Orchestrates ingest, normalization, layout, and rendering into one
//! figure. Normalization is a separate phase with its own type so the
//! every-panel-before-any-drawing ordering is enforced by signatures:
//! [`compute_ranges`] consumes all grids and produces
//! [`ResolvedRanges`], and only that feeds [`Composer::render_figure`].

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{PapermapError, Result};
use crate::grid::ClippedGrid;
use crate::ingest::{self, Resampling};
use crate::layout::{self, DecorationSide};
use crate::logging;
use crate::normalize::{self, ValueRange};
use crate::palette::{PaletteStore, DEFAULT_PALETTE};
use crate::projection::AlbersEqualArea;
use crate::render::colorbar::{self, ColorbarSpec, DEFAULT_TICK_COUNT};
use crate::render::draw;
use crate::render::north::{self, NorthSpec, NorthStyleName};
use crate::render::scalebar::{self, ScaleBarSpec, ScaleBarStyleName};
use crate::render::{Canvas, Corner, DecorationKind, OffsetStore, BLACK};
use crate::vector::{self, OverlayMode, VectorLayer};

/// One panel of the composition.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelSpec {
    /// Raster path, possibly a glob pattern with exactly one match
    pub raster: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Palette override; the composition default applies when absent
    #[serde(default)]
    pub palette: Option<String>,
}

/// Shared or per-panel color normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NormalizationSpec {
    Shared {
        #[serde(default)]
        override_max: Option<f32>,
    },
    PerPanel {
        #[serde(default)]
        percentile: Option<f32>,
    },
}

impl Default for NormalizationSpec {
    fn default() -> Self {
        NormalizationSpec::Shared { override_max: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorbarJob {
    #[serde(default)]
    pub shared: bool,
    #[serde(default = "default_cbar_side")]
    pub side: DecorationSide,
    #[serde(default = "default_shrink")]
    pub shrink: f64,
    #[serde(default = "default_tick_count")]
    pub ticks: usize,
    #[serde(default = "default_cbar_thickness")]
    pub thickness: f64,
    #[serde(default = "default_cbar_pad")]
    pub pad: f64,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScaleBarJob {
    #[serde(default = "default_scalebar_style")]
    pub style: ScaleBarStyleName,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub length_km: Option<f64>,
    #[serde(default = "default_segments")]
    pub segments: usize,
    #[serde(default = "default_scalebar_corner")]
    pub corner: Corner,
    #[serde(default = "default_decoration_pad")]
    pub pad: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NorthJob {
    #[serde(default = "default_north_style")]
    pub style: NorthStyleName,
    #[serde(default)]
    pub shared: bool,
    #[serde(default = "default_north_size")]
    pub size: f64,
    #[serde(default = "default_north_corner")]
    pub corner: Corner,
    #[serde(default = "default_decoration_pad")]
    pub pad: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayJob {
    pub path: String,
    /// Draw mode; inferred from the geometry type when absent
    #[serde(default)]
    pub mode: Option<OverlayMode>,
    #[serde(default = "default_overlay_color")]
    pub color: String,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

/// A complete job description, read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    pub boundary: String,
    pub panels: Vec<PanelSpec>,
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub cols: Option<usize>,
    #[serde(default)]
    pub palette: Option<String>,
    #[serde(default)]
    pub normalization: NormalizationSpec,
    #[serde(default)]
    pub annualize: bool,
    #[serde(default)]
    pub period_start: i32,
    #[serde(default)]
    pub period_end: i32,
    #[serde(default = "default_resampling")]
    pub resampling: Resampling,
    #[serde(default)]
    pub colorbar: Option<ColorbarJob>,
    #[serde(default)]
    pub scale_bar: Option<ScaleBarJob>,
    #[serde(default)]
    pub north: Option<NorthJob>,
    #[serde(default)]
    pub overlays: Vec<OverlayJob>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub figure: Option<FigureSize>,
}

fn default_cbar_side() -> DecorationSide {
    DecorationSide::Right
}
fn default_shrink() -> f64 {
    100.0
}
fn default_tick_count() -> usize {
    DEFAULT_TICK_COUNT
}
fn default_cbar_thickness() -> f64 {
    0.04
}
fn default_cbar_pad() -> f64 {
    0.02
}
fn default_scalebar_style() -> ScaleBarStyleName {
    ScaleBarStyleName::Segmented
}
fn default_segments() -> usize {
    4
}
fn default_scalebar_corner() -> Corner {
    Corner::SouthWest
}
fn default_north_style() -> NorthStyleName {
    NorthStyleName::Triangle
}
fn default_north_size() -> f64 {
    0.08
}
fn default_north_corner() -> Corner {
    Corner::NorthEast
}
fn default_decoration_pad() -> f64 {
    0.05
}
fn default_overlay_color() -> String {
    "#333333".to_string()
}
fn default_line_width() -> f32 {
    1.0
}
fn default_resampling() -> Resampling {
    Resampling::Bilinear
}

impl JobSpec {
    /// Load a job description from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let job: JobSpec = serde_json::from_str(&content)?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        if self.panels.is_empty() {
            return Err(PapermapError::InvalidParameter {
                param: "panels".to_string(),
                message: "A composition needs at least one panel".to_string(),
            });
        }
        let (rows, cols) = self.grid_shape();
        if rows * cols < self.panels.len() {
            return Err(PapermapError::InvalidParameter {
                param: "rows/cols".to_string(),
                message: format!(
                    "A {}x{} grid cannot hold {} panels",
                    rows,
                    cols,
                    self.panels.len()
                ),
            });
        }
        Ok(())
    }

    /// Grid shape, defaulting to one row of all panels.
    pub fn grid_shape(&self) -> (usize, usize) {
        let cols = self.cols.unwrap_or(self.panels.len()).max(1);
        let rows = self
            .rows
            .unwrap_or_else(|| (self.panels.len() + cols - 1) / cols)
            .max(1);
        (rows, cols)
    }

    fn shared_side(&self) -> Option<DecorationSide> {
        self.colorbar
            .as_ref()
            .filter(|cb| cb.shared)
            .map(|cb| cb.side)
    }
}

/// Resolved normalization for a whole composition.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRanges {
    Shared(ValueRange),
    PerPanel(Vec<ValueRange>),
}

impl ResolvedRanges {
    pub fn for_panel(&self, index: usize) -> ValueRange {
        match self {
            ResolvedRanges::Shared(range) => *range,
            ResolvedRanges::PerPanel(ranges) => {
                ranges.get(index).copied().unwrap_or_else(ValueRange::fallback)
            }
        }
    }

    /// The range a shared colorbar labels.
    pub fn shared(&self) -> Option<ValueRange> {
        match self {
            ResolvedRanges::Shared(range) => Some(*range),
            ResolvedRanges::PerPanel(_) => None,
        }
    }
}

/// Phase one: every panel's extremes before any drawing.
pub fn compute_ranges(grids: &[ClippedGrid], spec: &NormalizationSpec) -> ResolvedRanges {
    match spec {
        NormalizationSpec::Shared { override_max } => {
            ResolvedRanges::Shared(normalize::shared_range(grids, *override_max))
        }
        NormalizationSpec::PerPanel { percentile } => ResolvedRanges::PerPanel(
            grids
                .iter()
                .map(|g| normalize::panel_range(g, *percentile))
                .collect(),
        ),
    }
}

/// Panel index that carries shared scale bars and north indicators:
/// the last panel in reading order.
pub fn shared_decoration_index(panel_count: usize) -> usize {
    panel_count.saturating_sub(1)
}

/// A rendered composition holding its drawing surface.
///
/// The surface is released either by [`Figure::close`] or on drop, so
/// repeated compositions in a long-lived process cannot accumulate
/// canvases.
pub struct Figure {
    canvas: Option<Canvas>,
    dpi: u32,
}

impl Figure {
    fn new(canvas: Canvas, dpi: u32) -> Self {
        Self {
            canvas: Some(canvas),
            dpi,
        }
    }

    /// Pixels of the rendered figure, for preview consumers.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref().map(|c| c.image())
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Write the figure to every requested path; the extension selects
    /// the format (png, jpg/jpeg, svg).
    pub fn export(&self, paths: &[PathBuf], jpeg_quality: u8) -> Result<()> {
        let canvas = self.canvas.as_ref().ok_or_else(|| PapermapError::Render {
            message: "Figure already closed".to_string(),
        })?;
        for path in paths {
            let start = Instant::now();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            match ext.as_str() {
                "png" => {
                    canvas
                        .image()
                        .save_with_format(path, image::ImageFormat::Png)
                        .map_err(|e| PapermapError::Export {
                            message: format!("{}: {}", path.display(), e),
                        })?;
                }
                "jpg" | "jpeg" => {
                    let rgb = image::DynamicImage::ImageRgba8(canvas.image().clone()).to_rgb8();
                    let file = std::fs::File::create(path)?;
                    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                        std::io::BufWriter::new(file),
                        jpeg_quality,
                    );
                    encoder
                        .encode_image(&rgb)
                        .map_err(|e| PapermapError::Export {
                            message: format!("{}: {}", path.display(), e),
                        })?;
                }
                "svg" => write_svg(canvas.image(), path, self.dpi)?,
                other => {
                    return Err(PapermapError::Export {
                        message: format!(
                            "Unsupported output format .{} for {}",
                            other,
                            path.display()
                        ),
                    });
                }
            }
            logging::log_operation_end("export", start, true);
            info!(path = %path.display(), "Figure exported");
        }
        Ok(())
    }

    /// Release the drawing surface. Release problems are logged, never
    /// propagated, so they cannot block an otherwise-finished export.
    pub fn close(mut self) {
        if let Some(canvas) = self.canvas.take() {
            debug!(
                width = canvas.width(),
                height = canvas.height(),
                "Figure surface released"
            );
            drop(canvas);
        }
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        if self.canvas.take().is_some() {
            debug!("Figure surface released on drop");
        }
    }
}

/// SVG writer: the rendered raster embedded base64 with the physical
/// size derived from the dpi, stamped with a provenance comment.
fn write_svg(image: &RgbaImage, path: &Path, dpi: u32) -> Result<()> {
    use base64::Engine;

    let mut png_bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut png_bytes), image::ImageOutputFormat::Png)
        .map_err(|e| PapermapError::Export {
            message: format!("{}: {}", path.display(), e),
        })?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&png_bytes);

    let width_in = image.width() as f64 / dpi as f64;
    let height_in = image.height() as f64 / dpi as f64;

    let svg = format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!-- Generated by {} {} on {} -->\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
            "xmlns:xlink=\"http://www.w3.org/1999/xlink\" ",
            "width=\"{:.3}in\" height=\"{:.3}in\" viewBox=\"0 0 {} {}\">\n",
            "  <image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" ",
            "xlink:href=\"data:image/png;base64,{}\"/>\n",
            "</svg>\n"
        ),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().to_rfc3339(),
        width_in,
        height_in,
        image.width(),
        image.height(),
        image.width(),
        image.height(),
        encoded,
    );
    std::fs::write(path, svg)?;
    Ok(())
}

/// Preview keeps the figure alive; export writes files and releases it.
#[derive(Debug, Clone)]
pub enum OutputMode {
    Preview,
    Export(Vec<PathBuf>),
}

/// The driver: borrows its context objects so stores live across
/// compositions without any global state.
pub struct Composer<'a> {
    pub config: &'a Config,
    pub palettes: &'a PaletteStore,
    pub offsets: &'a OffsetStore,
}

impl<'a> Composer<'a> {
    pub fn new(config: &'a Config, palettes: &'a PaletteStore, offsets: &'a OffsetStore) -> Self {
        Self {
            config,
            palettes,
            offsets,
        }
    }

    /// Run a whole job: ingest, normalize, render, then either return
    /// the figure (preview) or export and release it.
    pub fn run(&self, job: &JobSpec, mode: OutputMode) -> Result<Option<Figure>> {
        job.validate()?;
        let start = Instant::now();
        logging::log_operation_start("compose", Some(&format!("{} panels", job.panels.len())));

        let proj = AlbersEqualArea::new(self.config.projection);
        let boundary = vector::read_boundary(Path::new(&job.boundary))?;

        // Ingest everything first; any failure fails the composition
        let mut grids = Vec::with_capacity(job.panels.len());
        for panel in &job.panels {
            let grid = ingest::ingest(
                &panel.raster,
                &boundary,
                &proj,
                job.period_start,
                job.period_end,
                job.annualize,
                job.resampling,
            )?;
            grids.push(grid);
        }

        let ranges = compute_ranges(&grids, &job.normalization);
        let figure = self.render_figure(job, &boundary.reproject(&proj), &grids, &ranges)?;

        logging::log_operation_end("compose", start, true);

        match mode {
            OutputMode::Preview => Ok(Some(figure)),
            OutputMode::Export(paths) => {
                let result = figure.export(&paths, self.config.render.jpeg_quality);
                figure.close();
                result.map(|_| None)
            }
        }
    }

    /// Phase two: draw every panel under its resolved range.
    pub fn render_figure(
        &self,
        job: &JobSpec,
        boundary: &VectorLayer,
        grids: &[ClippedGrid],
        ranges: &ResolvedRanges,
    ) -> Result<Figure> {
        let (rows, cols) = job.grid_shape();
        let plan = layout::plan(rows, cols, job.shared_side(), job.caption.is_some())?;

        let dpi = self.config.render.dpi;
        let (width_px, height_px) = match job.figure {
            Some(size) => (
                (size.width_in * dpi as f64).round() as u32,
                (size.height_in * dpi as f64).round() as u32,
            ),
            None => {
                let advice =
                    layout::advise(rows, cols, job.shared_side(), job.caption.is_some(), dpi)?;
                (advice.preview_width_px, advice.preview_height_px)
            }
        };

        let font = match &self.config.render.font_path {
            Some(path) => match Canvas::load_font(path) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Font unavailable, labels will be skipped");
                    None
                }
            },
            None => None,
        };
        let mut canvas = Canvas::new(width_px, height_px, font)?;

        let overlays = self.load_overlays(job)?;
        let default_palette = job.palette.as_deref().unwrap_or(DEFAULT_PALETTE);
        let last = shared_decoration_index(grids.len());

        for (index, grid) in grids.iter().enumerate() {
            let panel_px = canvas.px_rect(&plan.panel_rect(index));
            let palette_name = job.panels[index]
                .palette
                .as_deref()
                .unwrap_or(default_palette);
            let palette = self.palettes.resolve(palette_name);
            let range = ranges.for_panel(index);

            let frame = draw::draw_grid(&mut canvas, &panel_px, grid, &palette, range);
            draw::draw_boundary(&mut canvas, &frame, boundary, 1.5, BLACK);

            for (layer, mode, color, line_width) in &overlays {
                draw::draw_overlay(&mut canvas, &frame, layer, *mode, *color, *line_width);
            }

            if let Some(title) = &job.panels[index].title {
                draw::draw_title(&mut canvas, &panel_px, title, 16.0);
            }

            if let Some(cb) = &job.colorbar {
                if !cb.shared {
                    let spec = ColorbarSpec {
                        thickness: cb.thickness,
                        pad: cb.pad,
                        shrink: cb.shrink,
                        tick_count: cb.ticks,
                        font_size: 12.0,
                        label: cb.label.clone(),
                    };
                    colorbar::draw_panel_colorbar(
                        &mut canvas,
                        &frame.rect,
                        &palette,
                        range,
                        &spec,
                        self.offsets,
                    );
                }
            }

            if let Some(sb) = &job.scale_bar {
                if !sb.shared || index == last {
                    let spec = self.scale_bar_spec(sb);
                    scalebar::draw(
                        &mut canvas,
                        &frame.rect,
                        frame.meters_per_px,
                        &spec,
                        self.offsets.get(DecorationKind::ScaleBar),
                    );
                }
            }

            if let Some(nj) = &job.north {
                if !nj.shared || index == last {
                    let spec = NorthSpec {
                        style: nj.style.into(),
                        size: nj.size,
                        corner: nj.corner,
                        pad: nj.pad,
                        ..Default::default()
                    };
                    north::draw(
                        &mut canvas,
                        &frame.rect,
                        &spec,
                        self.offsets.get(DecorationKind::North),
                    );
                }
            }
        }

        // The shared colorbar labels the union range, drawn once
        if let Some(cb) = &job.colorbar {
            if cb.shared {
                if let Some(band) = plan.shared_band_rect() {
                    let range = ranges
                        .shared()
                        .unwrap_or_else(|| match ranges {
                            ResolvedRanges::PerPanel(_) => {
                                normalize::shared_range(grids, None)
                            }
                            ResolvedRanges::Shared(r) => *r,
                        });
                    let palette = self.palettes.resolve(default_palette);
                    let spec = ColorbarSpec {
                        thickness: cb.thickness,
                        pad: cb.pad,
                        shrink: cb.shrink,
                        tick_count: cb.ticks,
                        font_size: 12.0,
                        label: cb.label.clone(),
                    };
                    colorbar::draw_shared_colorbar(
                        &mut canvas,
                        &band,
                        cb.side,
                        &palette,
                        range,
                        &spec,
                        self.offsets,
                    );
                }
            }
        }

        if let Some(caption) = &job.caption {
            let (cx, cy) = (
                canvas.width() as f32 / 2.0,
                (1.0 - plan.bottom / 2.0) as f32 * canvas.height() as f32,
            );
            canvas.text_centered(cx, cy, 14.0, BLACK, caption);
        }

        Ok(Figure::new(canvas, dpi))
    }

    fn scale_bar_spec(&self, sb: &ScaleBarJob) -> ScaleBarSpec {
        ScaleBarSpec {
            style: sb.style.into(),
            length_km: sb.length_km,
            segments: sb.segments,
            corner: sb.corner,
            pad: sb.pad,
            ..Default::default()
        }
    }

    /// Load overlay layers; a layer without a CRS is skipped with a
    /// warning rather than failing the composition.
    fn load_overlays(
        &self,
        job: &JobSpec,
    ) -> Result<Vec<(VectorLayer, OverlayMode, image::Rgba<u8>, f32)>> {
        let proj = AlbersEqualArea::new(self.config.projection);
        let mut out = Vec::new();
        for overlay in &job.overlays {
            let layer = vector::read_layer(Path::new(&overlay.path))?;
            if layer.crs.is_none() {
                warn!(
                    path = %overlay.path,
                    "Overlay has no coordinate reference, skipping layer"
                );
                continue;
            }
            let mode = overlay.mode.unwrap_or_else(|| layer.inferred_mode());
            out.push((
                layer.reproject(&proj),
                mode,
                draw::parse_color(&overlay.color),
                overlay.line_width,
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GeoTransform;
    use ndarray::Array2;

    fn grid_of(values: Vec<f32>, width: usize) -> ClippedGrid {
        let height = values.len() / width;
        let data = Array2::from_shape_vec((height, width), values).unwrap();
        ClippedGrid::new(data, GeoTransform::north_up(0.0, height as f64 * 100.0, 100.0, 100.0))
            .unwrap()
    }

    #[test]
    fn test_compute_ranges_shared() {
        let grids = vec![
            grid_of(vec![0.0, 10.0, 3.0, f32::NAN], 2),
            grid_of(vec![5.0, 20.0, f32::NAN, 7.0], 2),
        ];
        let ranges = compute_ranges(&grids, &NormalizationSpec::Shared { override_max: None });
        assert_eq!(
            ranges,
            ResolvedRanges::Shared(ValueRange {
                vmin: 0.0,
                vmax: 20.0
            })
        );
    }

    #[test]
    fn test_compute_ranges_per_panel() {
        let grids = vec![
            grid_of(vec![0.0, 10.0, 3.0, 4.0], 2),
            grid_of(vec![f32::NAN; 4], 2),
        ];
        let ranges = compute_ranges(&grids, &NormalizationSpec::PerPanel { percentile: None });
        assert_eq!(ranges.for_panel(0), ValueRange { vmin: 0.0, vmax: 10.0 });
        assert_eq!(ranges.for_panel(1), ValueRange::fallback());
    }

    #[test]
    fn test_shared_decoration_index_is_last_in_reading_order() {
        assert_eq!(shared_decoration_index(6), 5);
        assert_eq!(shared_decoration_index(1), 0);
        assert_eq!(shared_decoration_index(0), 0);
    }

    #[test]
    fn test_grid_shape_defaults() {
        let job = job_with_panels(3);
        assert_eq!(job.grid_shape(), (1, 3));
    }

    #[test]
    fn test_validate_rejects_undersized_grid() {
        let mut job = job_with_panels(6);
        job.rows = Some(2);
        job.cols = Some(2);
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_panels() {
        let job = job_with_panels(0);
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_job_spec_parses_minimal_json() {
        let json = r#"{
            "boundary": "/data/region.shp",
            "panels": [{"raster": "/data/spi_*.tif", "title": "SPI"}]
        }"#;
        let job: JobSpec = serde_json::from_str(json).unwrap();
        assert_eq!(job.panels.len(), 1);
        assert!(matches!(
            job.normalization,
            NormalizationSpec::Shared { override_max: None }
        ));
        assert_eq!(job.resampling, Resampling::Bilinear);
    }

    #[test]
    fn test_job_spec_parses_decorations() {
        let json = r#"{
            "boundary": "/data/region.shp",
            "panels": [{"raster": "a.tif"}, {"raster": "b.tif"}],
            "rows": 1, "cols": 2,
            "normalization": {"mode": "per_panel", "percentile": 98.0},
            "colorbar": {"shared": true, "side": "right", "shrink": 80.0},
            "scale_bar": {"style": "double_band", "shared": true, "corner": "south_east"},
            "north": {"style": "compass"}
        }"#;
        let job: JobSpec = serde_json::from_str(json).unwrap();
        assert!(matches!(
            job.normalization,
            NormalizationSpec::PerPanel {
                percentile: Some(p)
            } if p == 98.0
        ));
        assert_eq!(job.shared_side(), Some(DecorationSide::Right));
        let sb = job.scale_bar.unwrap();
        assert_eq!(sb.style, ScaleBarStyleName::DoubleBand);
        assert!(sb.shared);
    }

    #[test]
    fn test_figure_export_png_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let canvas = Canvas::new(40, 30, None).unwrap();
        let figure = Figure::new(canvas, 100);
        let out = dir.path().join("map.png");
        figure.export(&[out.clone()], 92).unwrap();
        figure.close();
        assert!(out.exists());
    }

    #[test]
    fn test_figure_export_svg_embeds_raster() {
        let dir = tempfile::tempdir().unwrap();
        let canvas = Canvas::new(40, 30, None).unwrap();
        let figure = Figure::new(canvas, 100);
        let out = dir.path().join("map.svg");
        figure.export(&[out.clone()], 92).unwrap();
        figure.close();
        let svg = std::fs::read_to_string(out).unwrap();
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains("width=\"0.400in\""));
    }

    #[test]
    fn test_figure_export_unknown_extension_fails() {
        let canvas = Canvas::new(10, 10, None).unwrap();
        let figure = Figure::new(canvas, 100);
        let err = figure
            .export(&[PathBuf::from("/tmp/figure.bmp")], 92)
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported output format"));
    }

    fn job_with_panels(count: usize) -> JobSpec {
        JobSpec {
            boundary: "/data/region.shp".to_string(),
            panels: (0..count)
                .map(|i| PanelSpec {
                    raster: format!("panel_{}.tif", i),
                    title: None,
                    palette: None,
                })
                .collect(),
            rows: None,
            cols: None,
            palette: None,
            normalization: NormalizationSpec::default(),
            annualize: false,
            period_start: 0,
            period_end: 0,
            resampling: Resampling::Bilinear,
            colorbar: None,
            scale_bar: None,
            north: None,
            overlays: Vec::new(),
            caption: None,
            figure: None,
        }
    }
}
