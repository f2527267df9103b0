use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymbolError};
use crate::geometry::{Point, Scale};

/// Implements `ALL`, `as_str`, `Display` and `FromStr` over the serde names.
macro_rules! named_variants {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = SymbolError;

            fn from_str(s: &str) -> Result<Self> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(SymbolError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Seasonal foliage retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafHabit {
    Deciduous,
    Evergreen,
    SemiEvergreen,
}

named_variants!(LeafHabit, "leaf habit", {
    Deciduous => "deciduous",
    Evergreen => "evergreen",
    SemiEvergreen => "semi_evergreen",
});

/// Visual graininess of the crown as seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrownTexture {
    Fine,
    Medium,
    Coarse,
    Needle,
}

named_variants!(CrownTexture, "crown texture", {
    Fine => "fine",
    Medium => "medium",
    Coarse => "coarse",
    Needle => "needle",
});

/// Ornamental feature still visible in dormancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinterInterest {
    WhiteBark,
    RedStems,
    Berries,
    Flowers,
    Evergreen,
}

named_variants!(WinterInterest, "winter interest", {
    WhiteBark => "white_bark",
    RedStems => "red_stems",
    Berries => "berries",
    Flowers => "flowers",
    Evergreen => "evergreen",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

named_variants!(Season, "season", {
    Spring => "spring",
    Summer => "summer",
    Autumn => "autumn",
    Winter => "winter",
});

/// Drawing treatment of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStyle {
    Scientific,
    Watercolor,
    Marker,
    HandDrawn,
}

named_variants!(SymbolStyle, "style", {
    Scientific => "scientific",
    Watercolor => "watercolor",
    Marker => "marker",
    HandDrawn => "hand_drawn",
});

/// Physical parameters of one species' canopy.
///
/// Habit, texture, density and winter interest may be left out, in which
/// case they come from the species preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotanicalParams {
    pub spread_cm: f64,
    pub height_cm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_box_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_cm: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_habit: Option<LeafHabit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crown_texture: Option<CrownTexture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crown_density_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winter_interest: Option<WinterInterest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSymbolData {
    pub botanical_name: String,
    #[serde(default)]
    pub common_name: String,
    pub botanical_params: BotanicalParams,
    /// Surveyed canopy footprint in cm; empty means generate one.
    #[serde(default)]
    pub outline_cm: Vec<Point>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlantDocument {
    Many(Vec<PlantSymbolData>),
    One(Box<PlantSymbolData>),
}

impl PlantSymbolData {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| SymbolError::plant(format!("failed to parse plant JSON: {}", e)))
    }

    /// A document holding either one plant or an array of plants.
    pub fn many_from_json(content: &str) -> Result<Vec<Self>> {
        let doc: PlantDocument = serde_json::from_str(content)
            .map_err(|e| SymbolError::plant(format!("failed to parse plant JSON: {}", e)))?;
        Ok(match doc {
            PlantDocument::Many(plants) => plants,
            PlantDocument::One(plant) => vec![*plant],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub style: SymbolStyle,
    pub season: Season,
    pub scale: Scale,
    pub seed: u64,
    pub show_outline: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: SymbolStyle::Scientific,
            season: Season::Summer,
            scale: Scale::default(),
            seed: 0,
            show_outline: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLLY: &str = r#"{
        "botanical_name": "Ilex aquifolium",
        "common_name": "Holly",
        "botanical_params": {
            "spread_cm": 300,
            "height_cm": 600,
            "leaf_habit": "evergreen",
            "winter_interest": "berries"
        },
        "outline_cm": [[100, 100], {"x": 200, "y": 100}, [150, 200]]
    }"#;

    #[test]
    fn plant_json_parses_with_optional_fields() {
        let plant = PlantSymbolData::from_json(HOLLY).expect("valid plant");
        assert_eq!(plant.botanical_params.leaf_habit, Some(LeafHabit::Evergreen));
        assert_eq!(plant.botanical_params.crown_texture, None);
        assert_eq!(plant.outline_cm.len(), 3);
        assert_eq!(plant.outline_cm[1], Point::new(200.0, 100.0));
    }

    #[test]
    fn documents_hold_one_or_many_plants() {
        assert_eq!(PlantSymbolData::many_from_json(HOLLY).expect("one").len(), 1);
        let many = format!("[{HOLLY}, {HOLLY}]");
        assert_eq!(PlantSymbolData::many_from_json(&many).expect("many").len(), 2);
        assert!(PlantSymbolData::from_json("{}").is_err());
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for style in SymbolStyle::ALL {
            assert_eq!(style.as_str().parse::<SymbolStyle>().ok(), Some(*style));
        }
        assert_eq!("Hand-Drawn".parse::<SymbolStyle>().ok(), Some(SymbolStyle::HandDrawn));
        assert_eq!("semi-evergreen".parse::<LeafHabit>().ok(), Some(LeafHabit::SemiEvergreen));
        assert!(matches!(
            "pastel".parse::<SymbolStyle>(),
            Err(SymbolError::UnknownVariant { kind: "style", .. })
        ));
    }

    #[test]
    fn render_options_fill_defaults() {
        let opts: RenderOptions =
            serde_json::from_str(r#"{"style": "watercolor", "scale": "1:100"}"#).expect("options");
        assert_eq!(opts.style, SymbolStyle::Watercolor);
        assert_eq!(opts.season, Season::Summer);
        assert_eq!(opts.scale.ratio(), 100.0);
        assert!(opts.show_outline);
    }
}
