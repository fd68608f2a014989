//! papermap - boundary-clipped raster maps, composed for print
//!
//! This is the main entry point for the papermap application.

use std::path::PathBuf;

use tracing::{error, info};

use papermap::compose::{Composer, JobSpec, OutputMode};
use papermap::render::OffsetStore;
use papermap::{Config, PaletteStore, PapermapError, Result};

fn main() -> Result<()> {
    // Initialize tracing with default level first
    papermap::init_tracing("info");

    info!("Starting papermap v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let (config, job_file, output) = Config::load().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    // Re-initialize tracing with configured level
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }

    let output = output.ok_or_else(|| PapermapError::Config {
        message: "An output path is required (-o figure.png)".to_string(),
    })?;

    info!("Loading job file: {:?}", job_file);
    let job = JobSpec::load(&job_file).map_err(|e| {
        error!("Failed to load job file: {}", e);
        e
    })?;

    let palettes = PaletteStore::new();
    let offsets = match &config.offsets_path {
        Some(path) => OffsetStore::load(path),
        None => OffsetStore::empty(),
    };

    info!(
        "Composing {} panel(s) against boundary {:?}",
        job.panels.len(),
        job.boundary
    );

    let composer = Composer::new(&config, &palettes, &offsets);
    let outputs: Vec<PathBuf> = vec![output];
    composer
        .run(&job, OutputMode::Export(outputs))
        .map_err(|e| {
            papermap::log_error(&e, "composition");
            e
        })?;

    info!("Done");
    Ok(())
}
