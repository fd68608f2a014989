//! Persisted decoration offsets.
//!
//! The interactive preview lets a user nudge the colorbar, scale bar,
//! and north indicator; the resulting `(dx, dy)` pairs persist as a
//! small JSON file and are added to each decoration's base anchor on
//! the next composition. A missing file means all offsets are zero.
//! Saving is best-effort: failures are logged, never propagated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which decoration an offset applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationKind {
    Colorbar,
    ScaleBar,
    North,
}

impl DecorationKind {
    fn key(self) -> &'static str {
        match self {
            DecorationKind::Colorbar => "cbar",
            DecorationKind::ScaleBar => "scale",
            DecorationKind::North => "north",
        }
    }
}

/// Session-scoped offset store, keyed by decoration kind.
///
/// Offsets are in panel-fraction units, +x right and +y up.
#[derive(Debug)]
pub struct OffsetStore {
    path: Option<PathBuf>,
    offsets: HashMap<String, (f64, f64)>,
}

impl OffsetStore {
    /// An in-memory store with every offset zero.
    pub fn empty() -> Self {
        Self {
            path: None,
            offsets: HashMap::new(),
        }
    }

    /// Load from a JSON file; a missing file yields all-zero offsets.
    pub fn load(path: &Path) -> Self {
        let offsets = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, (f64, f64)>>(&content) {
                Ok(map) => {
                    debug!(path = %path.display(), entries = map.len(), "Offsets loaded");
                    map
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed offsets file, using zeros");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path: Some(path.to_path_buf()),
            offsets,
        }
    }

    pub fn get(&self, kind: DecorationKind) -> (f64, f64) {
        self.offsets.get(kind.key()).copied().unwrap_or((0.0, 0.0))
    }

    pub fn set(&mut self, kind: DecorationKind, dx: f64, dy: f64) {
        self.offsets.insert(kind.key().to_string(), (dx, dy));
    }

    /// Persist to the backing file. Failures are logged and swallowed
    /// so they never block an otherwise-successful composition.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string_pretty(&self.offsets)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .and_then(|json| std::fs::write(path, json));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Could not save decoration offsets");
        }
    }
}
