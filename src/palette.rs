//! Seasonal colour palettes for each leaf habit.

use serde::Serialize;

use crate::symbol::{LeafHabit, Season, WinterInterest};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorPalette {
    pub canopy_fill: &'static str,
    pub canopy_gradient_start: &'static str,
    pub canopy_gradient_end: &'static str,
    pub cluster_fill: &'static str,
    pub texture_color: &'static str,
    pub outline_stroke: &'static str,
    pub outline_opacity: f64,
    pub canopy_opacity: f64,
    pub cluster_opacity: f64,
}

const DECIDUOUS_SPRING: ColorPalette = ColorPalette {
    canopy_fill: "#9cc86b",
    canopy_gradient_start: "#bcdd8d",
    canopy_gradient_end: "#6fa34a",
    cluster_fill: "#84b958",
    texture_color: "#4f7d35",
    outline_stroke: "#3e5f2a",
    outline_opacity: 0.85,
    canopy_opacity: 0.85,
    cluster_opacity: 0.8,
};

const DECIDUOUS_SUMMER: ColorPalette = ColorPalette {
    canopy_fill: "#4f8a3a",
    canopy_gradient_start: "#6fa655",
    canopy_gradient_end: "#2f6126",
    cluster_fill: "#3f7a30",
    texture_color: "#2a4f1f",
    outline_stroke: "#223f19",
    outline_opacity: 0.9,
    canopy_opacity: 0.9,
    cluster_opacity: 0.85,
};

const DECIDUOUS_AUTUMN: ColorPalette = ColorPalette {
    canopy_fill: "#c98a3a",
    canopy_gradient_start: "#e2ab50",
    canopy_gradient_end: "#9a4f24",
    cluster_fill: "#b8632b",
    texture_color: "#7a3b1a",
    outline_stroke: "#5c3a1e",
    outline_opacity: 0.85,
    canopy_opacity: 0.85,
    cluster_opacity: 0.8,
};

// Leaf drop: the canopy is all but gone, only the spread line stays clear.
const DECIDUOUS_WINTER: ColorPalette = ColorPalette {
    canopy_fill: "#8c7b68",
    canopy_gradient_start: "#a39584",
    canopy_gradient_end: "#6e5f4f",
    cluster_fill: "#7a6a58",
    texture_color: "#5a4a3a",
    outline_stroke: "#4a3f35",
    outline_opacity: 0.7,
    canopy_opacity: 0.06,
    cluster_opacity: 0.05,
};

const EVERGREEN_SPRING: ColorPalette = ColorPalette {
    canopy_fill: "#3f7a4a",
    canopy_gradient_start: "#5c9465",
    canopy_gradient_end: "#285a34",
    cluster_fill: "#356d40",
    texture_color: "#1f4428",
    outline_stroke: "#1a3a22",
    outline_opacity: 0.9,
    canopy_opacity: 0.9,
    cluster_opacity: 0.85,
};

const EVERGREEN_SUMMER: ColorPalette = ColorPalette {
    canopy_fill: "#376f42",
    canopy_gradient_start: "#548c5d",
    canopy_gradient_end: "#22512d",
    cluster_fill: "#2f6339",
    texture_color: "#1b3e24",
    outline_stroke: "#17351f",
    outline_opacity: 0.9,
    canopy_opacity: 0.9,
    cluster_opacity: 0.85,
};

const EVERGREEN_AUTUMN: ColorPalette = ColorPalette {
    canopy_fill: "#33663e",
    canopy_gradient_start: "#4e8157",
    canopy_gradient_end: "#1f4a29",
    cluster_fill: "#2c5c35",
    texture_color: "#193a21",
    outline_stroke: "#15311c",
    outline_opacity: 0.9,
    canopy_opacity: 0.9,
    cluster_opacity: 0.85,
};

const EVERGREEN_WINTER: ColorPalette = ColorPalette {
    canopy_fill: "#2c5a3a",
    canopy_gradient_start: "#456f50",
    canopy_gradient_end: "#1a3f26",
    cluster_fill: "#26502f",
    texture_color: "#15331c",
    outline_stroke: "#122c18",
    outline_opacity: 0.9,
    canopy_opacity: 0.88,
    cluster_opacity: 0.82,
};

const SEMI_EVERGREEN_SPRING: ColorPalette = ColorPalette {
    canopy_fill: "#6ea25a",
    canopy_gradient_start: "#8dba74",
    canopy_gradient_end: "#497c3c",
    cluster_fill: "#5e9450",
    texture_color: "#3a622f",
    outline_stroke: "#2e4f26",
    outline_opacity: 0.88,
    canopy_opacity: 0.88,
    cluster_opacity: 0.82,
};

const SEMI_EVERGREEN_SUMMER: ColorPalette = ColorPalette {
    canopy_fill: "#437d3e",
    canopy_gradient_start: "#61995a",
    canopy_gradient_end: "#295929",
    cluster_fill: "#376e34",
    texture_color: "#234821",
    outline_stroke: "#1d3a1c",
    outline_opacity: 0.9,
    canopy_opacity: 0.9,
    cluster_opacity: 0.85,
};

const SEMI_EVERGREEN_AUTUMN: ColorPalette = ColorPalette {
    canopy_fill: "#7d7a3c",
    canopy_gradient_start: "#9b9556",
    canopy_gradient_end: "#55552a",
    cluster_fill: "#6c6a35",
    texture_color: "#464521",
    outline_stroke: "#3b3a1f",
    outline_opacity: 0.88,
    canopy_opacity: 0.85,
    cluster_opacity: 0.8,
};

// Partial canopy retained through winter.
const SEMI_EVERGREEN_WINTER: ColorPalette = ColorPalette {
    canopy_fill: "#586a45",
    canopy_gradient_start: "#72835d",
    canopy_gradient_end: "#3d4c30",
    cluster_fill: "#4e5f3d",
    texture_color: "#334027",
    outline_stroke: "#2d3823",
    outline_opacity: 0.8,
    canopy_opacity: 0.45,
    cluster_opacity: 0.4,
};

/// Total over every `(habit, season)` pair.
pub fn resolve(leaf_habit: LeafHabit, season: Season) -> ColorPalette {
    match (leaf_habit, season) {
        (LeafHabit::Deciduous, Season::Spring) => DECIDUOUS_SPRING,
        (LeafHabit::Deciduous, Season::Summer) => DECIDUOUS_SUMMER,
        (LeafHabit::Deciduous, Season::Autumn) => DECIDUOUS_AUTUMN,
        (LeafHabit::Deciduous, Season::Winter) => DECIDUOUS_WINTER,
        (LeafHabit::Evergreen, Season::Spring) => EVERGREEN_SPRING,
        (LeafHabit::Evergreen, Season::Summer) => EVERGREEN_SUMMER,
        (LeafHabit::Evergreen, Season::Autumn) => EVERGREEN_AUTUMN,
        (LeafHabit::Evergreen, Season::Winter) => EVERGREEN_WINTER,
        (LeafHabit::SemiEvergreen, Season::Spring) => SEMI_EVERGREEN_SPRING,
        (LeafHabit::SemiEvergreen, Season::Summer) => SEMI_EVERGREEN_SUMMER,
        (LeafHabit::SemiEvergreen, Season::Autumn) => SEMI_EVERGREEN_AUTUMN,
        (LeafHabit::SemiEvergreen, Season::Winter) => SEMI_EVERGREEN_WINTER,
    }
}

pub const WHITE_BARK: &str = "#eeeae0";
pub const RED_STEM: &str = "#9b2d20";
pub const RED_STEM_TEXTURE: &str = "#a8382a";
pub const BERRY_RED: &str = "#c0262d";
pub const WINTER_FLOWER: &str = "#f4ede6";

/// Overlay a winter feature onto a palette.
///
/// Outside winter the palette is returned untouched. Every branch sets
/// fixed values, so applying it twice gives the same palette as once.
pub fn apply_winter_interest(
    palette: ColorPalette,
    feature: Option<WinterInterest>,
    season: Season,
) -> ColorPalette {
    if season != Season::Winter {
        return palette;
    }
    let Some(feature) = feature else {
        return palette;
    };

    match feature {
        WinterInterest::WhiteBark => ColorPalette {
            outline_stroke: WHITE_BARK,
            outline_opacity: 0.95,
            ..palette
        },
        WinterInterest::RedStems => ColorPalette {
            outline_stroke: RED_STEM,
            texture_color: RED_STEM_TEXTURE,
            outline_opacity: palette.outline_opacity.max(0.9),
            ..palette
        },
        WinterInterest::Berries => ColorPalette {
            cluster_fill: BERRY_RED,
            ..palette
        },
        WinterInterest::Flowers => ColorPalette {
            cluster_fill: WINTER_FLOWER,
            ..palette
        },
        WinterInterest::Evergreen => palette,
    }
}
