//! End-to-end composition tests over synthetic grids and boundaries.
//!
//! Rasters and shapefiles are exercised in unit tests; here the
//! pipeline runs from prepared grids through layout, rendering, and
//! export with no files read from disk.

mod common;

use pretty_assertions::assert_eq;

use papermap::compose::{
    compute_ranges, shared_decoration_index, Composer, JobSpec, NormalizationSpec, ResolvedRanges,
};
use papermap::render::{OffsetStore, WHITE};
use papermap::{Config, PaletteStore, ValueRange};

fn test_config() -> Config {
    let mut config = Config::default();
    // Keep rendered surfaces small
    config.render.dpi = 60;
    config
}

fn render(job_json: &str, panel_values: &[f32]) -> papermap::Figure {
    let job: JobSpec = serde_json::from_str(job_json).unwrap();
    let config = test_config();
    let palettes = PaletteStore::new();
    let offsets = OffsetStore::empty();
    let composer = Composer::new(&config, &palettes, &offsets);

    let grids: Vec<_> = panel_values
        .iter()
        .map(|&v| common::uniform_grid(50, v))
        .collect();
    let boundary = common::square_boundary(50);
    let ranges = compute_ranges(&grids, &job.normalization);
    composer
        .render_figure(&job, &boundary, &grids, &ranges)
        .unwrap()
}

#[test]
fn test_uniform_grid_yields_fallback_range() {
    let grid = common::uniform_grid(100, 5.0);
    assert_eq!(grid.count_finite(), 10_000);

    let ranges = compute_ranges(
        std::slice::from_ref(&grid),
        &NormalizationSpec::Shared { override_max: None },
    );
    // A single repeated value is degenerate; the scale falls back
    assert_eq!(
        ranges,
        ResolvedRanges::Shared(ValueRange {
            vmin: 0.0,
            vmax: 1.0
        })
    );
}

#[test]
fn test_shared_range_spans_all_panels() {
    let grids = vec![
        common::grid_from_values(vec![0.0, 10.0, 2.0, 7.0], 2),
        common::grid_from_values(vec![5.0, 20.0, 6.0, 11.0], 2),
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
fn test_per_panel_ranges_are_independent() {
    let grids = vec![
        common::grid_from_values(vec![0.0, 10.0, 2.0, 7.0], 2),
        common::grid_from_values(vec![5.0, 20.0, 6.0, 11.0], 2),
    ];
    let ranges = compute_ranges(&grids, &NormalizationSpec::PerPanel { percentile: None });
    assert_eq!(ranges.for_panel(0), ValueRange { vmin: 0.0, vmax: 10.0 });
    assert_eq!(ranges.for_panel(1), ValueRange { vmin: 5.0, vmax: 20.0 });
}

#[test]
fn test_single_panel_renders_map_pixels() {
    let figure = render(&common::minimal_job_json(), &[5.0]);
    let image = figure.image().unwrap();
    assert!(image.width() > 0 && image.height() > 0);

    // The clipped grid must leave colored pixels on the white canvas
    let painted = image.pixels().filter(|&&p| p != WHITE).count();
    assert!(painted > 100, "expected painted map area, got {}", painted);
}

#[test]
fn test_six_panel_grid_with_shared_decorations_renders() {
    let job_json = r#"{
        "boundary": "/data/region.shp",
        "panels": [
            {"raster": "a.tif", "title": "1981"},
            {"raster": "b.tif", "title": "1990"},
            {"raster": "c.tif", "title": "2000"},
            {"raster": "d.tif", "title": "2010"},
            {"raster": "e.tif", "title": "2020"},
            {"raster": "f.tif", "title": "2023"}
        ],
        "rows": 2, "cols": 3,
        "colorbar": {"shared": true, "side": "right"},
        "scale_bar": {"shared": true},
        "north": {"shared": true}
    }"#;
    // Shared scale bar and north indicator land on the last panel
    assert_eq!(shared_decoration_index(6), 5);

    let figure = render(job_json, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert!(figure.image().is_some());
}

#[test]
fn test_decorated_panel_paints_more_than_bare_panel() {
    let bare = render(&common::minimal_job_json(), &[5.0]);
    let decorated = render(
        r#"{
            "boundary": "/data/region.shp",
            "panels": [{"raster": "/data/annual.tif"}],
            "colorbar": {"shared": false},
            "scale_bar": {"style": "segmented"},
            "north": {"style": "triangle"}
        }"#,
        &[5.0],
    );
    let count = |f: &papermap::Figure| {
        f.image()
            .unwrap()
            .pixels()
            .filter(|&&p| p != WHITE)
            .count()
    };
    assert!(count(&decorated) > count(&bare));
}

#[test]
fn test_empty_palette_name_falls_back_to_default() {
    let store = PaletteStore::new();
    let fallback = store.resolve("");
    let default = store.resolve(papermap::palette::DEFAULT_PALETTE);
    for i in 0..=4 {
        let frac = i as f32 / 4.0;
        assert_eq!(fallback.color_at(frac), default.color_at(frac));
    }
}

#[test]
fn test_export_writes_requested_formats() {
    let dir = tempfile::tempdir().unwrap();
    let figure = render(&common::minimal_job_json(), &[5.0]);

    let png = dir.path().join("figure.png");
    let jpg = dir.path().join("figure.jpg");
    let svg = dir.path().join("figure.svg");
    figure
        .export(&[png.clone(), jpg.clone(), svg.clone()], 92)
        .unwrap();
    figure.close();

    for path in [&png, &jpg, &svg] {
        let size = std::fs::metadata(path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
}

#[test]
fn test_explicit_figure_size_overrides_advice() {
    let job_json = r#"{
        "boundary": "/data/region.shp",
        "panels": [{"raster": "/data/annual.tif"}],
        "figure": {"width_in": 4.0, "height_in": 3.0}
    }"#;
    let figure = render(job_json, &[5.0]);
    let image = figure.image().unwrap();
    // dpi 60
    assert_eq!((image.width(), image.height()), (240, 180));
}
