//! The builtin palette registry.
//!
//! Two kinds of entries: references to colorgrad preset gradients, and
//! curated ordered hex breakpoints for the thematic sets (seasons,
//! compound events, paper-grade ramps, monochrome ramps). Identifiers
//! follow a `group_name` convention.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The documented default, substituted for unknown identifiers.
pub const DEFAULT_PALETTE: &str = "seq_ylorrd";

/// A builtin palette definition.
#[derive(Debug, Clone, Copy)]
pub enum BuiltinDef {
    /// A colorgrad preset, optionally sampled in reverse
    Preset {
        preset: &'static str,
        reversed: bool,
    },
    /// Ordered hex breakpoints
    Colors(&'static [&'static str]),
}

/// Look up a colorgrad preset gradient by its snake_case name.
pub fn preset_gradient(name: &str) -> Option<colorgrad::Gradient> {
    let grad = match name {
        "viridis" => colorgrad::viridis(),
        "plasma" => colorgrad::plasma(),
        "inferno" => colorgrad::inferno(),
        "magma" => colorgrad::magma(),
        "cividis" => colorgrad::cividis(),
        "turbo" => colorgrad::turbo(),
        "yl_or_rd" => colorgrad::yl_or_rd(),
        "yl_or_br" => colorgrad::yl_or_br(),
        "or_rd" => colorgrad::or_rd(),
        "yl_gn" => colorgrad::yl_gn(),
        "yl_gn_bu" => colorgrad::yl_gn_bu(),
        "pu_bu_gn" => colorgrad::pu_bu_gn(),
        "pu_bu" => colorgrad::pu_bu(),
        "gn_bu" => colorgrad::gn_bu(),
        "bu_gn" => colorgrad::bu_gn(),
        "bu_pu" => colorgrad::bu_pu(),
        "blues" => colorgrad::blues(),
        "greens" => colorgrad::greens(),
        "greys" => colorgrad::greys(),
        "oranges" => colorgrad::oranges(),
        "purples" => colorgrad::purples(),
        "reds" => colorgrad::reds(),
        "rd_yl_bu" => colorgrad::rd_yl_bu(),
        "rd_yl_gn" => colorgrad::rd_yl_gn(),
        "spectral" => colorgrad::spectral(),
        "br_bg" => colorgrad::br_bg(),
        "pi_yg" => colorgrad::pi_yg(),
        "pr_gn" => colorgrad::pr_gn(),
        "pu_or" => colorgrad::pu_or(),
        "rd_bu" => colorgrad::rd_bu(),
        "rd_gy" => colorgrad::rd_gy(),
        "rainbow" => colorgrad::rainbow(),
        "sinebow" => colorgrad::sinebow(),
        "warm" => colorgrad::warm(),
        "cool" => colorgrad::cool(),
        _ => return None,
    };
    Some(grad)
}

macro_rules! preset {
    ($name:expr) => {
        BuiltinDef::Preset {
            preset: $name,
            reversed: false,
        }
    };
    ($name:expr, rev) => {
        BuiltinDef::Preset {
            preset: $name,
            reversed: true,
        }
    };
}

pub static REGISTRY: Lazy<HashMap<&'static str, BuiltinDef>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, BuiltinDef> = HashMap::new();

    // Perceptually uniform sequential
    m.insert("seq_viridis", preset!("viridis"));
    m.insert("seq_plasma", preset!("plasma"));
    m.insert("seq_inferno", preset!("inferno"));
    m.insert("seq_magma", preset!("magma"));
    m.insert("seq_cividis", preset!("cividis"));
    m.insert("seq_turbo", preset!("turbo"));

    // Thematic sequential
    m.insert("seq_ylorrd", preset!("yl_or_rd"));
    m.insert("seq_ord", preset!("or_rd"));
    m.insert("seq_ylgn", preset!("yl_gn"));
    m.insert("seq_ylgnbu", preset!("yl_gn_bu"));
    m.insert("seq_pubugn", preset!("pu_bu_gn"));
    m.insert("seq_gnbu", preset!("gn_bu"));
    m.insert("seq_blues", preset!("blues"));
    m.insert("seq_oranges", preset!("oranges"));

    // Diverging
    m.insert("div_rdyblu_r", preset!("rd_yl_bu", rev));
    m.insert("div_coolwarm", preset!("rd_bu", rev));
    m.insert("div_spectral", preset!("spectral"));
    m.insert("div_brbg", preset!("br_bg"));
    m.insert("div_piyg", preset!("pi_yg"));
    m.insert("div_prgn", preset!("pr_gn"));
    m.insert("div_puor", preset!("pu_or"));
    m.insert("div_rdbu", preset!("rd_bu"));

    // Cyclic
    m.insert("cyc_sinebow", preset!("sinebow"));

    // Seasons
    m.insert(
        "season_spring",
        BuiltinDef::Colors(&["#f7fcf5", "#d9f0d3", "#a6dba0", "#5aae61", "#1b7837"]),
    );
    m.insert(
        "season_summer",
        BuiltinDef::Colors(&["#f7fbff", "#deebf7", "#9ecae1", "#4292c6", "#08519c"]),
    );
    m.insert(
        "season_autumn",
        BuiltinDef::Colors(&["#fff5eb", "#fee6ce", "#fdae6b", "#e6550d", "#7f2704"]),
    );
    m.insert(
        "season_winter",
        BuiltinDef::Colors(&["#ffffff", "#e0f3f8", "#abd9e9", "#74add1", "#4575b4"]),
    );

    // Compound events (warm/cold x wet/dry)
    m.insert(
        "evt_ww_ocean",
        BuiltinDef::Colors(&["#e0f3f8", "#b2e2e2", "#66c2a4", "#2ca25f", "#006d2c"]),
    );
    m.insert(
        "evt_wd_desert",
        BuiltinDef::Colors(&["#fff7bc", "#fee391", "#fec44f", "#fe9929", "#d95f0e"]),
    );
    m.insert(
        "evt_cw_polar",
        BuiltinDef::Colors(&["#f7f4f9", "#d4b9da", "#c994c7", "#756bb1", "#54278f"]),
    );
    m.insert(
        "evt_cd_drought",
        BuiltinDef::Colors(&["#f7f7f7", "#cccccc", "#969696", "#636363", "#252525"]),
    );

    // Paper-grade sequential
    m.insert(
        "sci_batlow",
        BuiltinDef::Colors(&[
            "#011959", "#084594", "#2E7FB8", "#65ADC2", "#A3D3A1", "#E4E09B", "#F7CB5A",
            "#F59D15", "#D14905",
        ]),
    );
    m.insert(
        "sci_oslo",
        BuiltinDef::Colors(&[
            "#1B2A41", "#274863", "#3C6E8F", "#6297B0", "#93B7C8", "#C4CFD6", "#E6E6E6",
            "#E7D9C5", "#D2B599",
        ]),
    );
    m.insert(
        "sci_lapaz",
        BuiltinDef::Colors(&[
            "#2D004B", "#5E2A84", "#8F56B5", "#B583D1", "#D8B6E3", "#E8E2F0", "#D3E6E6",
            "#A9D4C1", "#6BB68E", "#3A8C5C",
        ]),
    );
    m.insert(
        "sci_hawaii",
        BuiltinDef::Colors(&[
            "#00184F", "#003D7E", "#0069A6", "#00A2B5", "#25C4A8", "#7CD6A2", "#CFE29E",
            "#F8DE8A", "#F5C45B", "#E78C2D",
        ]),
    );
    m.insert(
        "sci_tokyo",
        BuiltinDef::Colors(&[
            "#003C3C", "#0C6666", "#2E8E7D", "#6BAB88", "#A8C08E", "#E0D79F", "#F1C37C",
            "#E59A5E", "#C46A5B", "#7A3A4E",
        ]),
    );
    m.insert(
        "sci_devon",
        BuiltinDef::Colors(&[
            "#08306B", "#2171B5", "#6BAED6", "#BDD7E7", "#EFF3FF", "#FEE0B6", "#FDB863",
            "#E08214", "#B35806", "#7F3B08",
        ]),
    );
    m.insert(
        "sci_ocean_deep",
        BuiltinDef::Colors(&[
            "#001F3F", "#003F7F", "#005F9F", "#007FBF", "#009FDF", "#20BFE7", "#60D7EF",
            "#A0E7F7", "#D0F3FB", "#F0FBFF",
        ]),
    );

    // Paper-grade diverging
    m.insert(
        "sci_vik",
        BuiltinDef::Colors(&[
            "#00204D", "#1B5E9E", "#4FA7F5", "#BFE5FF", "#FFFFFF", "#FFC4C4", "#F66E6E",
            "#C51313", "#7A0202",
        ]),
    );
    m.insert(
        "sci_broc",
        BuiltinDef::Colors(&[
            "#2E4A7D", "#4F77A3", "#84A9C0", "#BFD3D9", "#E9ECEC", "#E0D6CD", "#C8B19A",
            "#A07D60", "#6E4E3A",
        ]),
    );
    m.insert(
        "sci_cork",
        BuiltinDef::Colors(&[
            "#2C6B6F", "#3F8F8F", "#7FBFB1", "#D8EFE8", "#F6F6F6", "#E9D4EA", "#C29ACB",
            "#8A5EA8", "#5B2C7F",
        ]),
    );
    m.insert(
        "sci_roma",
        BuiltinDef::Colors(&[
            "#5C0000", "#A82E2E", "#D97C7C", "#F2C6C6", "#F7F7F7", "#C7D8F2", "#81A6D9",
            "#2C63A8", "#002B6C",
        ]),
    );
    m.insert(
        "sci_burl",
        BuiltinDef::Colors(&[
            "#6E3B22", "#9B623A", "#C9936B", "#E6C7A3", "#F3EFE7", "#CAD7E3", "#96B1CC",
            "#5E7CA3", "#2E4E73",
        ]),
    );
    m.insert(
        "sci_greenmagenta",
        BuiltinDef::Colors(&[
            "#0B775E", "#3BA091", "#84CDBD", "#D6ECE1", "#F7F7F7", "#E7D5E8", "#C39BC7",
            "#985EA1", "#6B1F7C",
        ]),
    );

    // Ocean / ice
    m.insert(
        "sci_ice",
        BuiltinDef::Colors(&[
            "#f7fcfd", "#e0f3f8", "#ccece6", "#99d8c9", "#66c2a4", "#41ae76", "#238b45",
            "#006d2c", "#00441b",
        ]),
    );
    m.insert(
        "sci_deepsea",
        BuiltinDef::Colors(&[
            "#001020", "#001F3A", "#00335B", "#004C7A", "#00669A", "#1987B8", "#4FA9CF",
            "#89C8E0", "#BFE0EE", "#E6F4F9",
        ]),
    );

    // Monochrome ramps
    m.insert(
        "mono_grey",
        BuiltinDef::Colors(&[
            "#ffffff", "#ededed", "#d9d9d9", "#bfbfbf", "#999999", "#6b6b6b", "#3b3b3b",
        ]),
    );
    m.insert(
        "mono_red",
        BuiltinDef::Colors(&[
            "#fff5f5", "#fccfcf", "#f79a9a", "#ef6b6b", "#d63b3b", "#a92020", "#6d0f0f",
        ]),
    );
    m.insert(
        "mono_orange",
        BuiltinDef::Colors(&[
            "#fff6ea", "#ffd9b5", "#ffbd7a", "#ff9f3a", "#ed7a00", "#b75a00", "#6e3700",
        ]),
    );
    m.insert(
        "mono_gold",
        BuiltinDef::Colors(&[
            "#fffce6", "#fff2a8", "#ffe36b", "#ffd138", "#f0b400", "#b98900", "#6f4f00",
        ]),
    );
    m.insert(
        "mono_green",
        BuiltinDef::Colors(&[
            "#f1fbf3", "#ccefd5", "#9adfae", "#63c986", "#2ea35f", "#177a41", "#0c4f29",
        ]),
    );
    m.insert(
        "mono_teal",
        BuiltinDef::Colors(&[
            "#effaf9", "#c9ece8", "#93d6cf", "#5dbbb3", "#2a9893", "#187376", "#0b4b4f",
        ]),
    );
    m.insert(
        "mono_cyan",
        BuiltinDef::Colors(&[
            "#f0fbff", "#c9ecfb", "#93d5f5", "#59b7e6", "#2a92c6", "#176a97", "#0b435f",
        ]),
    );
    m.insert(
        "mono_blue",
        BuiltinDef::Colors(&[
            "#f3f7ff", "#d3e0ff", "#a9c2ff", "#7aa0f5", "#4b7bdb", "#2b56b0", "#18336d",
        ]),
    );
    m.insert(
        "mono_indigo",
        BuiltinDef::Colors(&[
            "#f5f5ff", "#d7d7fa", "#b1b1f0", "#8484df", "#5a5ac0", "#3b3b97", "#24245f",
        ]),
    );
    m.insert(
        "mono_purple",
        BuiltinDef::Colors(&[
            "#fcf5ff", "#ead7fb", "#d0b1f0", "#b184df", "#8e5ac0", "#6a3b97", "#40245f",
        ]),
    );
    m.insert(
        "mono_magenta",
        BuiltinDef::Colors(&[
            "#fff0fa", "#f8c6e8", "#ee99d2", "#df6bb6", "#c13b93", "#8f1f6e", "#551445",
        ]),
    );
    m.insert(
        "mono_pink",
        BuiltinDef::Colors(&[
            "#fff2f6", "#ffd0dd", "#ffabc3", "#ff84a8", "#f4578c", "#c6366d", "#7a2043",
        ]),
    );
    m.insert(
        "mono_brown",
        BuiltinDef::Colors(&[
            "#fbf6f2", "#ead9cc", "#d4b99d", "#ba946d", "#976f49", "#6e4d2f", "#402c19",
        ]),
    );

    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_registered() {
        assert!(REGISTRY.contains_key(DEFAULT_PALETTE));
    }

    #[test]
    fn test_every_preset_entry_resolves() {
        for (key, def) in REGISTRY.iter() {
            if let BuiltinDef::Preset { preset, .. } = def {
                assert!(
                    preset_gradient(preset).is_some(),
                    "{} references unknown preset {}",
                    key,
                    preset
                );
            }
        }
    }

    #[test]
    fn test_breakpoint_entries_have_at_least_two_colors() {
        for (key, def) in REGISTRY.iter() {
            if let BuiltinDef::Colors(colors) = def {
                assert!(colors.len() >= 2, "{} has too few breakpoints", key);
            }
        }
    }

    #[test]
    fn test_unknown_preset_name() {
        assert!(preset_gradient("definitely_not_a_preset").is_none());
    }
}
