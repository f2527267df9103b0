use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use super::layers::compose_symbol;
use super::types::{PlantSymbolData, RenderOptions, Season, SymbolStyle};
use super::{SymbolGeometry, SymbolRenderer};
use crate::error::SymbolError;
use crate::geometry::Scale;
use crate::presets::PresetLookup;
use crate::random::seed_from_name;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackFailure {
    pub style: SymbolStyle,
    pub season: Season,
    pub error: String,
}

/// Every style and season of one plant, sharing one seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolPack {
    pub botanical_name: String,
    pub scale: Scale,
    pub seed: u64,
    pub symbols: BTreeMap<SymbolStyle, BTreeMap<Season, String>>,
    pub failures: Vec<PackFailure>,
}

impl SymbolPack {
    pub fn get(&self, style: SymbolStyle, season: Season) -> Option<&str> {
        self.symbols
            .get(&style)
            .and_then(|by_season| by_season.get(&season))
            .map(String::as_str)
    }

    /// Number of rendered symbols.
    pub fn len(&self) -> usize {
        self.symbols.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(file name, svg)` for every rendered symbol.
    pub fn files(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.symbols.iter().flat_map(move |(style, by_season)| {
            by_season.iter().map(move |(season, svg)| {
                (
                    symbol_file_name(&self.botanical_name, *style, *season, self.scale),
                    svg.as_str(),
                )
            })
        })
    }

    fn fail(&mut self, style: SymbolStyle, season: Season, error: &SymbolError) {
        warn!(
            botanical_name = %self.botanical_name,
            %style,
            %season,
            error = %error,
            "symbol failed to render"
        );
        self.failures.push(PackFailure {
            style,
            season,
            error: error.to_string(),
        });
    }
}

/// `{botanical_name}__{style}__{season}__{scale}.svg`
pub fn symbol_file_name(
    botanical_name: &str,
    style: SymbolStyle,
    season: Season,
    scale: Scale,
) -> String {
    let mut slug = String::with_capacity(botanical_name.len());
    for c in botanical_name.trim().chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '-' {
            Some(c)
        } else if c.is_whitespace() || c == '_' {
            Some('_')
        } else {
            None
        };
        if let Some(m) = mapped {
            if !(m == '_' && (slug.is_empty() || slug.ends_with('_'))) {
                slug.push(m);
            }
        }
    }
    let slug = slug.trim_end_matches('_');
    let slug = if slug.is_empty() { "plant" } else { slug };
    format!("{}__{}__{}__{}.svg", slug, style, season, scale.slug())
}

impl<P: PresetLookup> SymbolRenderer<P> {
    /// Render all 16 style and season combinations of one plant.
    ///
    /// Outline and clusters are computed once, so only colour and layer
    /// treatment vary across the pack. A failing combination is recorded
    /// in `failures` and the rest still render.
    pub fn generate_pack(&self, plant: &PlantSymbolData, scale: Scale, seed: u64) -> SymbolPack {
        let mut pack = SymbolPack {
            botanical_name: plant.botanical_name.clone(),
            scale,
            seed,
            symbols: BTreeMap::new(),
            failures: Vec::new(),
        };

        let preset = self.presets().get(&plant.botanical_name);
        let geometry = SymbolGeometry::prepare(plant, &preset, seed);

        for style in SymbolStyle::ALL {
            for season in Season::ALL {
                let options = RenderOptions {
                    style: *style,
                    season: *season,
                    scale,
                    seed,
                    show_outline: true,
                };
                let rendered = geometry
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(|g| compose_symbol(plant, g, &options));
                match rendered {
                    Ok(svg) => {
                        pack.symbols.entry(*style).or_default().insert(*season, svg);
                    }
                    Err(e) => pack.fail(*style, *season, &e),
                }
            }
        }

        pack
    }

    /// Packs for many plants in parallel on the current rayon pool.
    ///
    /// With no seed, each plant is seeded from its botanical name.
    pub fn generate_packs(
        &self,
        plants: &[PlantSymbolData],
        scale: Scale,
        seed: Option<u64>,
    ) -> Vec<SymbolPack> {
        plants
            .par_iter()
            .map(|plant| {
                let seed = seed.unwrap_or_else(|| seed_from_name(&plant.botanical_name));
                self.generate_pack(plant, scale, seed)
            })
            .collect()
    }
}
