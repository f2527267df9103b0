mod layers;
mod pack;
mod types;

use std::time::Instant;

use serde::Serialize;

use crate::error::{Result, SymbolError};
use crate::geometry::{
    BBox, ClusterPoint, Point, SamplingParams, clamp_dimension, dedup_ring, frame_for_plant,
    generate_outline, normalize_outline, polygon_area, sample_clusters, validate_outline,
};
use crate::presets::{PresetLookup, PresetRepository, RenderingPreset, default_repository};
use crate::random::{ChaChaRandom, RandomStream};

pub use layers::compose_symbol;
pub use pack::{PackFailure, SymbolPack, symbol_file_name};
pub use types::{
    BotanicalParams, CrownTexture, LeafHabit, PlantSymbolData, RenderOptions, Season,
    SymbolStyle, WinterInterest,
};

/// Plant record merged with its species preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolParams {
    pub leaf_habit: LeafHabit,
    pub crown_texture: CrownTexture,
    pub crown_density_value: f64,
    pub winter_interest: Option<WinterInterest>,
    pub cluster_size_modifier: f64,
    pub cluster_spacing_modifier: f64,
}

impl SymbolParams {
    /// Explicit plant values win; gaps are filled from the preset.
    pub fn resolve(params: &BotanicalParams, preset: &RenderingPreset) -> Result<Self> {
        let density = params
            .crown_density_value
            .unwrap_or(preset.crown_density_value);
        if !density.is_finite() {
            return Err(SymbolError::plant("crown density must be a number"));
        }
        Ok(Self {
            leaf_habit: params.leaf_habit.unwrap_or(preset.leaf_habit),
            crown_texture: params.crown_texture.unwrap_or(preset.crown_texture),
            crown_density_value: density.clamp(0.0, 1.0),
            winter_interest: params.winter_interest.or(preset.winter_interest),
            cluster_size_modifier: preset.cluster_size_modifier,
            cluster_spacing_modifier: preset.cluster_spacing_modifier,
        })
    }
}

/// Everything about a symbol that does not depend on style or season.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGeometry {
    pub params: SymbolParams,
    pub spread_cm: f64,
    pub height_cm: f64,
    pub scale_box_cm: f64,
    /// Canopy polygon in viewBox units.
    pub outline: Vec<Point>,
    pub sampling: SamplingParams,
    pub clusters: Vec<ClusterPoint>,
}

impl SymbolGeometry {
    pub fn prepare(plant: &PlantSymbolData, preset: &RenderingPreset, seed: u64) -> Result<Self> {
        let bp = &plant.botanical_params;
        let params = SymbolParams::resolve(bp, preset)?;

        for (field, value) in [("spread_cm", bp.spread_cm), ("height_cm", bp.height_cm)] {
            if !value.is_finite() {
                return Err(SymbolError::plant(format!("{} must be a number", field)));
            }
        }
        let spread_cm = clamp_dimension(bp.spread_cm);
        let height_cm = clamp_dimension(bp.height_cm);
        let scale_box_cm = match bp.scale_box_cm {
            Some(b) if !b.is_finite() || b <= 0.0 => {
                return Err(SymbolError::plant(format!(
                    "scale_box_cm must be positive, got {}",
                    b
                )));
            }
            Some(b) => clamp_dimension(b),
            None => frame_for_plant(height_cm, spread_cm),
        };

        let outline_cm = if plant.outline_cm.is_empty() {
            let center = bp
                .center_cm
                .unwrap_or(Point::new(scale_box_cm / 2.0, scale_box_cm / 2.0));
            if !center.is_finite() {
                return Err(SymbolError::plant("center_cm must be finite"));
            }
            let mut rng = ChaChaRandom::new(seed, RandomStream::Outline);
            generate_outline(spread_cm, center, &mut rng)
        } else {
            validate_outline(&plant.outline_cm)?;
            dedup_ring(&plant.outline_cm)
        };

        let outline = normalize_outline(&outline_cm, scale_box_cm)?;
        if polygon_area(&outline).abs() < f64::EPSILON {
            return Err(SymbolError::geometry("outline lies outside the scale box"));
        }

        let sampling = SamplingParams::for_texture(
            params.crown_texture,
            params.crown_density_value,
            params.cluster_size_modifier,
            params.cluster_spacing_modifier,
        );
        let mut rng = ChaChaRandom::new(seed, RandomStream::Clusters);
        let clusters = sample_clusters(&outline, &sampling, &mut rng);

        Ok(Self {
            params,
            spread_cm,
            height_cm,
            scale_box_cm,
            outline,
            sampling,
            clusters,
        })
    }

    pub fn bbox(&self) -> BBox {
        BBox::of(&self.outline).unwrap_or(BBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderMetadata {
    pub render_time_ms: f64,
    pub cluster_count: usize,
    pub width_mm: f64,
    pub height_mm: f64,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSymbol {
    pub svg: String,
    pub metadata: RenderMetadata,
}

/// Renders plant symbols against an injectable preset store.
pub struct SymbolRenderer<P: PresetLookup = PresetRepository> {
    presets: P,
}

impl SymbolRenderer<PresetRepository> {
    pub fn with_builtin_presets() -> Self {
        Self::new(default_repository())
    }
}

impl Default for SymbolRenderer<PresetRepository> {
    fn default() -> Self {
        Self::with_builtin_presets()
    }
}

impl<P: PresetLookup> SymbolRenderer<P> {
    pub fn new(presets: P) -> Self {
        Self { presets }
    }

    pub fn presets(&self) -> &P {
        &self.presets
    }

    pub fn render(&self, plant: &PlantSymbolData, options: &RenderOptions) -> Result<String> {
        let preset = self.presets.get(&plant.botanical_name);
        self.render_with_preset(plant, options, &preset)
    }

    /// Render with a caller-supplied preset instead of the store's.
    pub fn render_with_preset(
        &self,
        plant: &PlantSymbolData,
        options: &RenderOptions,
        preset: &RenderingPreset,
    ) -> Result<String> {
        preset.validate(&plant.botanical_name)?;
        let geometry = SymbolGeometry::prepare(plant, preset, options.seed)?;
        compose_symbol(plant, &geometry, options)
    }

    pub fn render_with_metadata(
        &self,
        plant: &PlantSymbolData,
        options: &RenderOptions,
    ) -> Result<RenderedSymbol> {
        let started = Instant::now();
        let preset = self.presets.get(&plant.botanical_name);
        let geometry = SymbolGeometry::prepare(plant, &preset, options.seed)?;
        let svg = compose_symbol(plant, &geometry, options)?;
        let width_mm = options.scale.physical_mm(geometry.spread_cm)?;

        Ok(RenderedSymbol {
            svg,
            metadata: RenderMetadata {
                render_time_ms: started.elapsed().as_secs_f64() * 1000.0,
                cluster_count: geometry.clusters.len(),
                width_mm,
                height_mm: width_mm,
                file_name: symbol_file_name(
                    &plant.botanical_name,
                    options.style,
                    options.season,
                    options.scale,
                ),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{VIEWBOX_SIZE, point_in_polygon};

    pub(crate) fn plant(name: &str, spread_cm: f64, height_cm: f64) -> PlantSymbolData {
        PlantSymbolData {
            botanical_name: name.to_string(),
            common_name: String::new(),
            botanical_params: BotanicalParams {
                spread_cm,
                height_cm,
                scale_box_cm: None,
                center_cm: None,
                leaf_habit: None,
                crown_texture: None,
                crown_density_value: None,
                winter_interest: None,
            },
            outline_cm: Vec::new(),
        }
    }

    #[test]
    fn plant_values_override_preset() {
        let mut p = plant("Betula pendula", 400.0, 900.0);
        p.botanical_params.crown_texture = Some(CrownTexture::Coarse);
        p.botanical_params.crown_density_value = Some(3.0);
        let preset = RenderingPreset {
            winter_interest: Some(WinterInterest::WhiteBark),
            cluster_size_modifier: 0.8,
            ..RenderingPreset::DEFAULT
        };
        let params = SymbolParams::resolve(&p.botanical_params, &preset).expect("valid");
        assert_eq!(params.crown_texture, CrownTexture::Coarse);
        assert_eq!(params.crown_density_value, 1.0);
        assert_eq!(params.winter_interest, Some(WinterInterest::WhiteBark));
        assert_eq!(params.cluster_size_modifier, 0.8);
    }

    #[test]
    fn generated_geometry_stays_in_viewbox() {
        let p = plant("Quercus robur", 2400.0, 2000.0);
        let g = SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 9).expect("valid plant");
        assert_eq!(g.scale_box_cm, 4000.0);
        assert_eq!(g.outline.len(), 48);
        for pt in &g.outline {
            assert!((0.0..=VIEWBOX_SIZE).contains(&pt.x) && (0.0..=VIEWBOX_SIZE).contains(&pt.y));
        }
        assert!(!g.clusters.is_empty());
        for c in &g.clusters {
            assert!(point_in_polygon(&c.center(), &g.outline));
        }
    }

    #[test]
    fn supplied_outline_is_validated() {
        let mut p = plant("Taxus baccata", 200.0, 300.0);
        p.outline_cm = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(matches!(
            SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 1),
            Err(SymbolError::InvalidGeometry { .. })
        ));
        p.outline_cm = vec![
            Point::new(-500.0, -500.0),
            Point::new(-400.0, -500.0),
            Point::new(-450.0, -400.0),
        ];
        assert!(SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 1).is_err());
    }

    #[test]
    fn non_finite_dimensions_are_rejected() {
        let p = plant("Acer campestre", f64::NAN, 300.0);
        assert!(matches!(
            SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 1),
            Err(SymbolError::InvalidPlantData { .. })
        ));
        let mut p = plant("Acer campestre", 300.0, 300.0);
        p.botanical_params.scale_box_cm = Some(-1.0);
        assert!(SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 1).is_err());
    }

    #[test]
    fn closed_survey_ring_renders() {
        let mut p = plant("Fagus sylvatica", 800.0, 1200.0);
        p.outline_cm = [
            (200.0, 300.0),
            (700.0, 250.0),
            (900.0, 700.0),
            (500.0, 950.0),
            (250.0, 1000.0),
            (200.0, 300.0),
        ]
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect();
        let g = SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 4).expect("closed ring");
        assert_eq!(g.outline.len(), 5);
        assert_eq!(g.scale_box_cm, 2500.0);
    }

    #[test]
    fn low_wide_plant_is_not_flattened() {
        let p = plant("Cotoneaster horizontalis", 600.0, 100.0);
        let g = SymbolGeometry::prepare(&p, &RenderingPreset::DEFAULT, 2).expect("valid plant");
        assert_eq!(g.scale_box_cm, 1000.0);
        for pt in &g.outline {
            assert!(pt.x > 0.0 && pt.x < VIEWBOX_SIZE && pt.y > 0.0 && pt.y < VIEWBOX_SIZE);
        }
    }

    #[test]
    fn extreme_spacing_fails_cleanly() {
        let renderer = SymbolRenderer::with_builtin_presets();
        let p = plant("Acer campestre", 500.0, 600.0);
        let preset = RenderingPreset {
            cluster_spacing_modifier: 1e-4,
            ..RenderingPreset::DEFAULT
        };
        assert!(matches!(
            renderer.render_with_preset(&p, &RenderOptions::default(), &preset),
            Err(SymbolError::PresetConfig { .. })
        ));
        // Unvalidated geometry still bounds the sampler.
        let g = SymbolGeometry::prepare(&p, &preset, 1).expect("valid plant");
        assert!(g.sampling.min_distance >= 40.0 * crate::presets::MODIFIER_RANGE.0);
        assert!(g.clusters.len() <= g.sampling.target_count);
    }

    #[test]
    fn metadata_reports_size_and_file_name() {
        let renderer = SymbolRenderer::with_builtin_presets();
        let mut p = plant("Betula pendula", 1000.0, 1500.0);
        p.botanical_params.scale_box_cm = Some(1000.0);
        let options = RenderOptions::default();
        let rendered = renderer.render_with_metadata(&p, &options).expect("renders");
        assert!((rendered.metadata.width_mm - 200.0).abs() < 0.01);
        assert_eq!(
            rendered.metadata.file_name,
            "Betula_pendula__scientific__summer__1-50.svg"
        );
        assert_eq!(rendered.svg, renderer.render(&p, &options).expect("renders"));
    }
}
