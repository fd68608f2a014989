//! # papermap
//!
//! A cartographic composition engine: gridded GeoTIFF rasters clipped
//! to an administrative boundary and rendered as publication-quality
//! single or multi-panel map figures.
//!
//! ## Key Features
//!
//! - **Boundary-driven ingest**: Reproject, clip, and crop any gridded
//!   GeoTIFF to a shapefile boundary in one call
//! - **Shared or per-panel normalization**: One color scale across a
//!   whole panel grid, or an independent scale per panel
//! - **Print decorations**: Colorbars, five scale bar styles, five
//!   north indicator styles, with persisted per-figure nudge offsets
//! - **Multi-format export**: PNG, JPEG, and SVG from one composition
//!
//! ## Architecture
//!
//! - **Ingest**: GeoTIFF and shapefile readers, reprojection onto an
//!   Albers equal-area grid, boundary masking
//! - **Normalization**: Value ranges resolved across all panels before
//!   any pixel is drawn
//! - **Layout**: Margins, panel slots, and shared decoration bands in
//!   figure fractions
//! - **Render**: A raster canvas plus the decoration drawing code
//! - **Compose**: The driver tying the phases together

pub mod compose;
pub mod config;
pub mod error;
pub mod grid;
pub mod ingest;
pub mod layout;
pub mod logging;
pub mod mask;
pub mod normalize;
pub mod palette;
pub mod projection;
pub mod raster;
pub mod render;
pub mod vector;

pub use compose::{Composer, Figure, JobSpec, OutputMode};
pub use config::Config;
pub use error::{PapermapError, Result};
pub use grid::ClippedGrid;
pub use logging::{
    init_tracing, log_error, log_ingest_stats, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use normalize::ValueRange;
pub use palette::PaletteStore;
pub use projection::{AlbersEqualArea, AlbersParams, GeoTransform};
pub use render::OffsetStore;
