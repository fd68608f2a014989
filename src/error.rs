//! Error types for the papermap library.
//!
//! One enum covers every failure mode in the crate. Input errors are
//! fatal and carry a human-readable cause; degenerate-data conditions
//! are not errors at all and are handled locally by the stages that
//! encounter them.

use thiserror::Error;

/// The main error type for papermap operations.
#[derive(Error, Debug)]
pub enum PapermapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding errors
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Shapefile reading errors
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Path resolution errors (missing file, zero or multiple glob matches)
    #[error("Path error: {message}")]
    Path { message: String },

    /// A required coordinate reference is missing or unusable
    #[error("CRS error: {message}")]
    Crs { message: String },

    /// Raster ingestion errors
    #[error("Ingest error: {message}")]
    Ingest { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Malformed palette definition or import file
    #[error("Palette error: {message}")]
    Palette { message: String },

    /// Figure rendering errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// Export/encoding errors
    #[error("Export error: {message}")]
    Export { message: String },
}

/// Convenience type alias for Results with PapermapError
pub type Result<T> = std::result::Result<T, PapermapError>;
