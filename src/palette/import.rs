//! Palette import from external color-table files.
//!
//! Three source formats normalize into the same ordered hex breakpoint
//! list and register in the [`PaletteStore`](super::PaletteStore) as
//! `imported_<stem>`:
//!
//! - `.clr`: one `value R G B` row per color, file order kept
//! - `.cpt`: segment rows carrying a start and optionally an end RGB
//! - anything else: freeform text with `#RRGGBB`, `rgb(r, g, b)` or
//!   bare numeric triplets (0..=1 or 0..=255, auto-detected)

use std::path::Path;

use tracing::info;

use crate::error::{PapermapError, Result};

use super::PaletteStore;

/// Import a palette file and register it; returns the registered name.
pub fn import_palette(store: &PaletteStore, path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| PapermapError::Palette {
        message: format!("Cannot read palette file {}: {}", path.display(), e),
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let colors = match ext.as_str() {
        "clr" => parse_clr(&content),
        "cpt" => parse_cpt(&content),
        _ => parse_freeform(&content),
    };

    if colors.len() < 2 {
        return Err(PapermapError::Palette {
            message: format!(
                "Palette file {} yields {} colors; at least 2 are required",
                path.display(),
                colors.len()
            ),
        });
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("palette");
    let name = store.register(&format!("imported_{}", stem), colors)?;
    info!(palette = %name, source = %path.display(), "Palette imported");
    Ok(name)
}

fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// `value R G B` rows; the value column orders the file and is
/// otherwise ignored.
fn parse_clr(content: &str) -> Vec<String> {
    let mut colors = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        if parts[0].parse::<f64>().is_err() {
            continue;
        }
        let rgb: Option<Vec<u8>> = parts[1..4].iter().map(|p| p.parse::<u8>().ok()).collect();
        if let Some(rgb) = rgb {
            colors.push(to_hex(rgb[0], rgb[1], rgb[2]));
        }
    }
    colors
}

/// GMT segment rows: `v1 R G B v2 R G B`; both segment endpoints are
/// kept. `B`/`F`/`N` rows and comments are skipped.
fn parse_cpt(content: &str) -> Vec<String> {
    let mut colors = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with('B')
            || line.starts_with('F')
            || line.starts_with('N')
        {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 4 {
            let rgb: Option<Vec<u8>> =
                parts[1..4].iter().map(|p| p.parse::<u8>().ok()).collect();
            if let Some(rgb) = rgb {
                colors.push(to_hex(rgb[0], rgb[1], rgb[2]));
            }
        }
        if parts.len() >= 8 {
            let rgb: Option<Vec<u8>> =
                parts[5..8].iter().map(|p| p.parse::<u8>().ok()).collect();
            if let Some(rgb) = rgb {
                colors.push(to_hex(rgb[0], rgb[1], rgb[2]));
            }
        }
    }
    colors
}

/// Freeform text: each line yields at most one color, first match wins
/// among hex, `rgb()`, and bare numeric triplet forms.
fn parse_freeform(content: &str) -> Vec<String> {
    let mut colors = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(color) = find_hex(line)
            .or_else(|| find_rgb_call(line))
            .or_else(|| find_numeric_triplet(line))
        {
            colors.push(color);
        }
    }
    colors
}

fn find_hex(line: &str) -> Option<String> {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && i + 6 < bytes.len() {
            let hex = &line[i + 1..i + 7];
            if hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Some(format!("#{}", hex.to_ascii_lowercase()));
            }
        }
    }
    None
}

fn find_rgb_call(line: &str) -> Option<String> {
    let lower = line.to_ascii_lowercase();
    let start = lower.find("rgb")?;
    let open = lower[start..].find('(')? + start;
    let close = lower[open..].find(')')? + open;
    let inner = &line[open + 1..close];
    let parts: Vec<&str> = inner.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return None;
    }
    let rgb: Option<Vec<u8>> = parts.iter().map(|p| p.parse::<u8>().ok()).collect();
    rgb.map(|c| to_hex(c[0], c[1], c[2]))
}

fn find_numeric_triplet(line: &str) -> Option<String> {
    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }
    let values: Option<Vec<f64>> = parts[..3].iter().map(|p| p.parse::<f64>().ok()).collect();
    let values = values?;
    if values.iter().any(|&v| v < 0.0 || v > 255.0) {
        return None;
    }
    // Values above 1 imply the 0..=255 convention
    let scale = if values.iter().any(|&v| v > 1.0) {
        1.0
    } else {
        255.0
    };
    let to_u8 = |v: f64| (v * scale).round().clamp(0.0, 255.0) as u8;
    Some(to_hex(to_u8(values[0]), to_u8(values[1]), to_u8(values[2])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_clr() {
        let content = "# comment\n0 255 255 255\n1 254 240 217\n2 253 204 138\n";
        let colors = parse_clr(content);
        assert_eq!(colors, vec!["#ffffff", "#fef0d9", "#fdcc8a"]);
    }

    #[test]
    fn test_parse_cpt_keeps_both_segment_ends() {
        let content = "# COLOR_MODEL = RGB\n0 255 0 0 1 0 255 0\nB 0 0 0\nF 255 255 255\n";
        let colors = parse_cpt(content);
        assert_eq!(colors, vec!["#ff0000", "#00ff00"]);
    }

    #[test]
    fn test_parse_freeform_hex_and_rgb() {
        let content = "#FF0000\nrgb(0, 255, 0)\n0 0 255\n";
        let colors = parse_freeform(content);
        assert_eq!(colors, vec!["#ff0000", "#00ff00", "#0000ff"]);
    }

    #[test]
    fn test_parse_freeform_unit_range_triplet() {
        let colors = parse_freeform("1.0 0.5 0.0\n0.0, 0.0, 1.0\n");
        assert_eq!(colors, vec!["#ff8000", "#0000ff"]);
    }

    #[test]
    fn test_parse_freeform_255_range_triplet() {
        let colors = parse_freeform("255 128 0\n");
        assert_eq!(colors, vec!["#ff8000"]);
    }

    #[test]
    fn test_import_registers_under_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drought_ramp.clr");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "0 255 255 255").unwrap();
        writeln!(file, "1 120 60 30").unwrap();

        let store = PaletteStore::new();
        let name = import_palette(&store, &path).unwrap();
        assert_eq!(name, "imported_drought_ramp");

        let table = store.resolve(&name);
        assert_eq!(table.color_at(0.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_import_too_few_colors_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.clr");
        std::fs::write(&path, "0 10 20 30\n").unwrap();

        let store = PaletteStore::new();
        assert!(import_palette(&store, &path).is_err());
    }
}
