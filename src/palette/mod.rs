//! Palette resolution.
//!
//! Every palette, builtin or custom, resolves to a 256-stop RGBA
//! lookup table. Resolution never fails: unknown identifiers fall back
//! to [`builtin::DEFAULT_PALETTE`]. The store memoizes resolved tables
//! and holds custom registrations from the import flow; it is a plain
//! context object so tests and long-lived callers inject their own.

pub mod builtin;
pub mod import;

use std::collections::HashMap;
use std::sync::Arc;

use colorgrad::{CustomGradient, Gradient};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{PapermapError, Result};

pub use builtin::DEFAULT_PALETTE;

const LUT_SIZE: usize = 256;

/// A resolved palette: a continuous `[0, 1]` to RGBA mapping.
#[derive(Debug, Clone)]
pub struct PaletteTable {
    name: String,
    lut: Vec<[u8; 4]>,
}

impl PaletteTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for a fraction in `[0, 1]`, clamped outside.
    pub fn color_at(&self, frac: f32) -> [u8; 4] {
        let index = (frac.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize;
        self.lut[index]
    }

    fn from_gradient(name: &str, gradient: &Gradient, reversed: bool) -> Self {
        let lut = (0..LUT_SIZE)
            .map(|i| {
                let mut t = i as f64 / (LUT_SIZE - 1) as f64;
                if reversed {
                    t = 1.0 - t;
                }
                gradient.at(t).to_rgba8()
            })
            .collect();
        Self {
            name: name.to_string(),
            lut,
        }
    }

    /// Build from ordered hex breakpoints (minimum 2).
    pub fn from_breakpoints(name: &str, colors: &[String]) -> Result<Self> {
        if colors.len() < 2 {
            return Err(PapermapError::Palette {
                message: format!(
                    "Palette {} needs at least 2 breakpoints, got {}",
                    name,
                    colors.len()
                ),
            });
        }
        let refs: Vec<&str> = colors.iter().map(|c| c.as_str()).collect();
        let gradient = CustomGradient::new()
            .html_colors(&refs)
            .build()
            .map_err(|e| PapermapError::Palette {
                message: format!("Palette {}: {}", name, e),
            })?;
        Ok(Self::from_gradient(name, &gradient, false))
    }
}

/// Memoizing palette resolver.
pub struct PaletteStore {
    cache: Mutex<HashMap<String, Arc<PaletteTable>>>,
    custom: Mutex<HashMap<String, Vec<String>>>,
}

impl PaletteStore {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            custom: Mutex::new(HashMap::new()),
        }
    }

    /// Register an imported breakpoint palette.
    ///
    /// A name collision gets a `_N` suffix; the name actually
    /// registered is returned.
    pub fn register(&self, name: &str, colors: Vec<String>) -> Result<String> {
        if colors.len() < 2 {
            return Err(PapermapError::Palette {
                message: format!(
                    "Cannot register {}: needs at least 2 colors, got {}",
                    name,
                    colors.len()
                ),
            });
        }
        let mut custom = self.custom.lock();
        let mut final_name = name.to_string();
        let mut counter = 1;
        while custom.contains_key(&final_name) || builtin::REGISTRY.contains_key(final_name.as_str())
        {
            counter += 1;
            final_name = format!("{}_{}", name, counter);
        }
        custom.insert(final_name.clone(), colors);
        // A stale memo from an earlier resolve of this name would
        // shadow the new palette with the fallback table
        self.cache.lock().remove(&final_name);
        debug!(palette = %final_name, "Custom palette registered");
        Ok(final_name)
    }

    /// Names of all registered custom palettes.
    pub fn custom_names(&self) -> Vec<String> {
        self.custom.lock().keys().cloned().collect()
    }

    /// Resolve an identifier to a palette table.
    ///
    /// Order: memoized table, registered custom entry, builtin
    /// registry, bare colorgrad preset name, then the default.
    pub fn resolve(&self, identifier: &str) -> Arc<PaletteTable> {
        if let Some(table) = self.cache.lock().get(identifier) {
            return Arc::clone(table);
        }

        let table = Arc::new(self.build(identifier));
        self.cache
            .lock()
            .insert(identifier.to_string(), Arc::clone(&table));
        table
    }

    fn build(&self, identifier: &str) -> PaletteTable {
        if let Some(colors) = self.custom.lock().get(identifier) {
            match PaletteTable::from_breakpoints(identifier, colors) {
                Ok(table) => return table,
                Err(e) => {
                    warn!(palette = identifier, error = %e, "Custom palette failed to build, using default");
                    return self.build_default();
                }
            }
        }

        if let Some(def) = builtin::REGISTRY.get(identifier) {
            return match def {
                builtin::BuiltinDef::Preset { preset, reversed } => {
                    // Registry entries are checked against the preset
                    // table by tests; a miss here means a broken build
                    match builtin::preset_gradient(preset) {
                        Some(gradient) => {
                            PaletteTable::from_gradient(identifier, &gradient, *reversed)
                        }
                        None => self.build_default(),
                    }
                }
                builtin::BuiltinDef::Colors(colors) => {
                    let owned: Vec<String> = colors.iter().map(|c| c.to_string()).collect();
                    PaletteTable::from_breakpoints(identifier, &owned)
                        .unwrap_or_else(|_| self.build_default())
                }
            };
        }

        if let Some(gradient) = builtin::preset_gradient(identifier) {
            return PaletteTable::from_gradient(identifier, &gradient, false);
        }

        warn!(
            palette = identifier,
            default = DEFAULT_PALETTE,
            "Unknown palette identifier, using default"
        );
        self.build_default()
    }

    fn build_default(&self) -> PaletteTable {
        // The default maps to a colorgrad preset, so this cannot miss
        let gradient = builtin::preset_gradient("yl_or_rd")
            .unwrap_or_else(colorgrad::viridis);
        PaletteTable::from_gradient(DEFAULT_PALETTE, &gradient, false)
    }
}

impl Default for PaletteStore {
    fn default() -> Self {
        Self::new()
    }
}
