//! Shapefile boundary and overlay reading.
//!
//! Geometry is flattened into plain coordinate lists right after
//! decoding so the rest of the crate never touches shapefile types.
//! The sidecar `.prj` supplies the CRS; the clip boundary must have
//! one, overlays without one are skipped by the caller.

use std::path::Path;

use shapefile::Shape;
use tracing::debug;

use crate::error::{PapermapError, Result};
use crate::projection::AlbersEqualArea;

/// Coordinate reference class parsed from a `.prj` WKT string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorCrs {
    Geographic,
    Projected,
}

/// How an overlay layer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// Open polylines
    Line,
    /// Polygon outlines only
    Boundary,
    /// Polygons filled with an outline
    Fill,
    /// Point markers
    Point,
}

/// A vector layer flattened to coordinate lists.
///
/// Polygons keep their ring structure (feature -> rings -> vertices);
/// the first ring of each feature is the outer ring.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    pub crs: Option<VectorCrs>,
    pub polygons: Vec<Vec<Vec<(f64, f64)>>>,
    pub lines: Vec<Vec<(f64, f64)>>,
    pub points: Vec<(f64, f64)>,
}

impl VectorLayer {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }

    /// The draw mode implied by the dominant geometry type.
    pub fn inferred_mode(&self) -> OverlayMode {
        if !self.polygons.is_empty() {
            OverlayMode::Boundary
        } else if !self.lines.is_empty() {
            OverlayMode::Line
        } else {
            OverlayMode::Point
        }
    }

    /// Reproject geographic coordinates into the destination plane.
    ///
    /// A layer already in a projected CRS passes through unchanged.
    pub fn reproject(&self, proj: &AlbersEqualArea) -> VectorLayer {
        if self.crs != Some(VectorCrs::Geographic) {
            return self.clone();
        }
        let fwd = |&(lon, lat): &(f64, f64)| proj.forward(lon, lat);
        VectorLayer {
            crs: Some(VectorCrs::Projected),
            polygons: self
                .polygons
                .iter()
                .map(|rings| rings.iter().map(|r| r.iter().map(fwd).collect()).collect())
                .collect(),
            lines: self
                .lines
                .iter()
                .map(|l| l.iter().map(fwd).collect())
                .collect(),
            points: self.points.iter().map(fwd).collect(),
        }
    }

    /// Bounding box `[left, right, bottom, top]` over every vertex, or
    /// None for an empty layer.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let mut acc: Option<[f64; 4]> = None;
        let mut fold = |&(x, y): &(f64, f64)| {
            acc = Some(match acc {
                None => [x, x, y, y],
                Some([l, r, b, t]) => [l.min(x), r.max(x), b.min(y), t.max(y)],
            });
        };
        for rings in &self.polygons {
            for ring in rings {
                ring.iter().for_each(&mut fold);
            }
        }
        for line in &self.lines {
            line.iter().for_each(&mut fold);
        }
        self.points.iter().for_each(&mut fold);
        acc
    }
}

/// Read a shapefile into a flattened layer.
///
/// The `.prj` sidecar is looked up next to the `.shp`; its absence
/// leaves `crs` as None for the caller to judge.
pub fn read_layer(path: &Path) -> Result<VectorLayer> {
    let shapes = shapefile::read_shapes(path).map_err(|e| PapermapError::Ingest {
        message: format!("Cannot read shapefile {}: {}", path.display(), e),
    })?;

    let mut layer = VectorLayer {
        crs: read_prj(path)?,
        polygons: Vec::new(),
        lines: Vec::new(),
        points: Vec::new(),
    };

    for shape in shapes {
        match shape {
            Shape::Polygon(poly) => {
                let mut rings = Vec::new();
                for ring in poly.rings() {
                    rings.push(ring.points().iter().map(|p| (p.x, p.y)).collect());
                }
                if !rings.is_empty() {
                    layer.polygons.push(rings);
                }
            }
            Shape::Polyline(line) => {
                for part in line.parts() {
                    layer.lines.push(part.iter().map(|p| (p.x, p.y)).collect());
                }
            }
            Shape::Point(p) => layer.points.push((p.x, p.y)),
            Shape::Multipoint(mp) => {
                layer
                    .points
                    .extend(mp.points().iter().map(|p| (p.x, p.y)));
            }
            Shape::NullShape => {}
            other => {
                debug!(
                    path = %path.display(),
                    shape = %other.shapetype(),
                    "Skipping unsupported shape type"
                );
            }
        }
    }

    debug!(
        path = %path.display(),
        polygons = layer.polygons.len(),
        lines = layer.lines.len(),
        points = layer.points.len(),
        "Shapefile read"
    );

    Ok(layer)
}

/// Read the clip boundary; a missing or unclassifiable CRS is fatal.
pub fn read_boundary(path: &Path) -> Result<VectorLayer> {
    let layer = read_layer(path)?;
    if layer.crs.is_none() {
        return Err(PapermapError::Crs {
            message: format!(
                "Boundary {} declares no coordinate reference (missing or unreadable .prj)",
                path.display()
            ),
        });
    }
    if layer.polygons.is_empty() {
        return Err(PapermapError::Ingest {
            message: format!("Boundary {} contains no polygon features", path.display()),
        });
    }
    Ok(layer)
}

fn read_prj(shp_path: &Path) -> Result<Option<VectorCrs>> {
    let prj_path = shp_path.with_extension("prj");
    if !prj_path.exists() {
        return Ok(None);
    }
    let wkt = std::fs::read_to_string(&prj_path)?;
    Ok(classify_wkt(&wkt))
}

/// Classify a WKT CRS string: PROJCS wins over a nested GEOGCS.
fn classify_wkt(wkt: &str) -> Option<VectorCrs> {
    let upper = wkt.to_ascii_uppercase();
    if upper.contains("PROJCS") || upper.contains("PROJCRS") {
        Some(VectorCrs::Projected)
    } else if upper.contains("GEOGCS") || upper.contains("GEOGCRS") {
        Some(VectorCrs::Geographic)
    } else {
        None
    }
}
