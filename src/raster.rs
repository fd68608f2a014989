//! Single-band GeoTIFF reading.
//!
//! Reads band 1 of the first image directory, converts every numeric
//! sample type to `f32`, replaces the declared no-data value with NaN
//! (the "not plotted" sentinel used throughout the crate), and decodes
//! the georeferencing tags into a [`GeoTransform`] plus a CRS class.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, warn};

use crate::error::{PapermapError, Result};
use crate::projection::GeoTransform;

/// GeoTIFF geokey ids we care about.
const GT_MODEL_TYPE: u64 = 1024;
const GEOGRAPHIC_TYPE: u64 = 2048;
const PROJECTED_CS_TYPE: u64 = 3072;

/// Coordinate reference class of a raster, with the EPSG code when the
/// file declares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterCrs {
    /// Longitude/latitude degrees
    Geographic { epsg: Option<u32> },
    /// Already in a projected plane (assumed to match the destination)
    Projected { epsg: Option<u32> },
}

/// One decoded raster band with its georeferencing.
#[derive(Debug, Clone)]
pub struct RasterBand {
    /// Row-major values, no-data already replaced by NaN
    pub data: Array2<f32>,
    /// Index-to-coordinate affine transform
    pub transform: GeoTransform,
    /// Coordinate reference class
    pub crs: RasterCrs,
}

impl RasterBand {
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Bounding box `[left, right, bottom, top]` in source coordinates.
    pub fn bounds(&self) -> [f64; 4] {
        self.transform.bounds(self.height(), self.width())
    }
}

/// Read band 1 of a GeoTIFF file.
pub fn read_geotiff(path: &Path) -> Result<RasterBand> {
    let file = File::open(path).map_err(|e| PapermapError::Path {
        message: format!("Cannot open raster {}: {}", path.display(), e),
    })?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    let samples_per_pixel = decoder
        .get_tag_u64(Tag::SamplesPerPixel)
        .unwrap_or(1)
        .max(1) as usize;

    let pixel_scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| PapermapError::Ingest {
            message: format!(
                "Raster {} has no ModelPixelScale tag; cannot georeference",
                path.display()
            ),
        })?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| PapermapError::Ingest {
            message: format!(
                "Raster {} has no ModelTiepoint tag; cannot georeference",
                path.display()
            ),
        })?;
    let transform = transform_from_geotags(&pixel_scale, &tiepoint).ok_or_else(|| {
        PapermapError::Ingest {
            message: format!("Raster {} carries malformed georeferencing tags", path.display()),
        }
    })?;

    let crs = match decoder.get_tag_u64_vec(Tag::GeoKeyDirectoryTag) {
        Ok(keys) => classify_geokeys(&keys),
        Err(_) => {
            warn!(
                path = %path.display(),
                "Raster has no GeoKey directory; assuming geographic coordinates"
            );
            RasterCrs::Geographic { epsg: None }
        }
    };

    let nodata = match decoder.get_tag_ascii_string(Tag::GdalNodata) {
        Ok(text) => parse_nodata(&text),
        Err(_) => None,
    };

    let decoded = decoder.read_image()?;
    let values = samples_to_f32(decoded, samples_per_pixel, nodata);

    let expected = (width as usize) * (height as usize);
    if values.len() != expected {
        return Err(PapermapError::Ingest {
            message: format!(
                "Raster {}: expected {} cells, decoded {}",
                path.display(),
                expected,
                values.len()
            ),
        });
    }

    let data = Array2::from_shape_vec((height as usize, width as usize), values).map_err(|e| {
        PapermapError::Ingest {
            message: format!("Raster {}: {}", path.display(), e),
        }
    })?;

    debug!(
        path = %path.display(),
        width = width,
        height = height,
        nodata = nodata.unwrap_or(f32::NAN) as f64,
        "GeoTIFF band decoded"
    );

    Ok(RasterBand { data, transform, crs })
}

/// Build the affine transform from ModelPixelScale + ModelTiepoint.
///
/// Only the common raster-space-origin tiepoint (i=j=0) is supported;
/// an offset tiepoint is shifted back to the origin.
fn transform_from_geotags(pixel_scale: &[f64], tiepoint: &[f64]) -> Option<GeoTransform> {
    if pixel_scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    let (sx, sy) = (pixel_scale[0], pixel_scale[1]);
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Some(GeoTransform {
        origin_x: x - i * sx,
        origin_y: y + j * sy.abs(),
        pixel_w: sx,
        pixel_h: -sy.abs(),
    })
}

/// Classify the CRS from a GeoKey directory (header + 4-short entries).
fn classify_geokeys(keys: &[u64]) -> RasterCrs {
    let mut model_type = None;
    let mut geographic_epsg = None;
    let mut projected_epsg = None;

    for entry in keys.chunks_exact(4).skip(1) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        // Only inline SHORT values (location 0) are meaningful here
        if location != 0 {
            continue;
        }
        match key_id {
            GT_MODEL_TYPE => model_type = Some(value),
            GEOGRAPHIC_TYPE => geographic_epsg = Some(value as u32),
            PROJECTED_CS_TYPE => projected_epsg = Some(value as u32),
            _ => {}
        }
    }

    match model_type {
        Some(1) => RasterCrs::Projected {
            epsg: projected_epsg,
        },
        Some(2) => RasterCrs::Geographic {
            epsg: geographic_epsg,
        },
        _ => RasterCrs::Geographic {
            epsg: geographic_epsg,
        },
    }
}

/// Parse the GDAL nodata ASCII tag ("nan" is a legal spelling).
fn parse_nodata(text: &str) -> Option<f32> {
    let trimmed = text.trim_end_matches('\0').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f32>().ok()
}

/// Flatten a decoded image to band-1 `f32` values with nodata replaced
/// by NaN.
fn samples_to_f32(
    decoded: DecodingResult,
    samples_per_pixel: usize,
    nodata: Option<f32>,
) -> Vec<f32> {
    fn collect<T: Copy, F: Fn(T) -> f32>(
        buf: Vec<T>,
        stride: usize,
        nodata: Option<f32>,
        to_f32: F,
    ) -> Vec<f32> {
        buf.iter()
            .step_by(stride)
            .map(|&v| {
                let v = to_f32(v);
                match nodata {
                    Some(nd) if v == nd || (nd.is_nan() && v.is_nan()) => f32::NAN,
                    _ => v,
                }
            })
            .collect()
    }

    let stride = samples_per_pixel.max(1);
    match decoded {
        DecodingResult::U8(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::U16(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::U32(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::U64(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::I8(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::I16(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::I32(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::I64(buf) => collect(buf, stride, nodata, |v| v as f32),
        DecodingResult::F32(buf) => collect(buf, stride, nodata, |v| v),
        DecodingResult::F64(buf) => collect(buf, stride, nodata, |v| v as f32),
    }
}
