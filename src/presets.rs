use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SymbolError};
use crate::symbol::{CrownTexture, LeafHabit, WinterInterest};

const BUILTIN_PRESETS: &str = include_str!("../presets/uk_garden.toml");

/// Accepted bounds for the cluster size and spacing modifiers.
pub const MODIFIER_RANGE: (f64, f64) = (0.25, 4.0);

/// How a species is drawn when its plant record does not say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderingPreset {
    pub leaf_habit: LeafHabit,
    pub crown_texture: CrownTexture,
    pub crown_density_value: f64,
    pub winter_interest: Option<WinterInterest>,
    pub cluster_size_modifier: f64,
    pub cluster_spacing_modifier: f64,
}

impl RenderingPreset {
    /// Used for every species missing from the table.
    pub const DEFAULT: RenderingPreset = RenderingPreset {
        leaf_habit: LeafHabit::Deciduous,
        crown_texture: CrownTexture::Medium,
        crown_density_value: 0.65,
        winter_interest: None,
        cluster_size_modifier: 1.0,
        cluster_spacing_modifier: 1.0,
    };

    pub fn with_override(self, partial: &PresetOverride) -> Self {
        Self {
            leaf_habit: partial.leaf_habit.unwrap_or(self.leaf_habit),
            crown_texture: partial.crown_texture.unwrap_or(self.crown_texture),
            crown_density_value: partial
                .crown_density_value
                .unwrap_or(self.crown_density_value),
            winter_interest: partial.winter_interest.unwrap_or(self.winter_interest),
            cluster_size_modifier: partial
                .cluster_size_modifier
                .unwrap_or(self.cluster_size_modifier),
            cluster_spacing_modifier: partial
                .cluster_spacing_modifier
                .unwrap_or(self.cluster_spacing_modifier),
        }
    }

    pub fn validate(&self, botanical_name: &str) -> Result<()> {
        let bad = |field: &str, value: f64| SymbolError::PresetConfig {
            message: format!("{}: {} out of range ({})", botanical_name, field, value),
        };
        if !(0.0..=1.0).contains(&self.crown_density_value) {
            return Err(bad("crown_density_value", self.crown_density_value));
        }
        let (lo, hi) = MODIFIER_RANGE;
        if !(lo..=hi).contains(&self.cluster_size_modifier) {
            return Err(bad("cluster_size_modifier", self.cluster_size_modifier));
        }
        if !(lo..=hi).contains(&self.cluster_spacing_modifier) {
            return Err(bad("cluster_spacing_modifier", self.cluster_spacing_modifier));
        }
        Ok(())
    }
}

impl Default for RenderingPreset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A partial preset from the review workflow or a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_habit: Option<LeafHabit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crown_texture: Option<CrownTexture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crown_density_value: Option<f64>,
    /// `Some(None)` clears the feature; `None` leaves it alone.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub winter_interest: Option<Option<WinterInterest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_size_modifier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_spacing_modifier: Option<f64>,
}

fn present_value<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct PresetEntry {
    botanical_name: String,
    #[serde(flatten)]
    fields: PresetOverride,
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default, rename = "preset")]
    presets: Vec<PresetEntry>,
}

/// Read side of a species preset store.
pub trait PresetLookup: Send + Sync {
    fn lookup(&self, botanical_name: &str) -> Option<RenderingPreset>;

    /// Never fails: unknown species get [`RenderingPreset::DEFAULT`].
    fn get(&self, botanical_name: &str) -> RenderingPreset {
        self.lookup(botanical_name).unwrap_or_else(|| {
            debug!(botanical_name, "no preset for species, using default");
            RenderingPreset::DEFAULT
        })
    }
}

type PresetTable = HashMap<String, RenderingPreset>;

/// Immutable view of the table at one point in time.
#[derive(Debug, Clone, Default)]
pub struct PresetSnapshot(Arc<PresetTable>);

impl PresetSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PresetLookup for PresetSnapshot {
    fn lookup(&self, botanical_name: &str) -> Option<RenderingPreset> {
        self.0.get(botanical_name).copied()
    }
}

/// Shared species preset table, keyed by exact botanical name.
///
/// Writers build a new table and swap it in under the lock, so a reader
/// holding an older snapshot keeps seeing every record exactly as it was.
#[derive(Debug, Default)]
pub struct PresetRepository {
    table: RwLock<Arc<PresetTable>>,
}

impl PresetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated UK garden table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_PRESETS)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let repo = Self::new();
        repo.apply_file(parse_toml(content)?)?;
        Ok(repo)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let repo = Self::new();
        repo.apply_file(parse_yaml(content)?)?;
        Ok(repo)
    }

    /// Layer a TOML or YAML preset file over the current table.
    ///
    /// Returns the number of species touched.
    pub fn load_overrides(&self, content: &str) -> Result<usize> {
        let file = match parse_toml(content) {
            Ok(file) => file,
            Err(toml_err) => parse_yaml(content).map_err(|yaml_err| SymbolError::PresetConfig {
                message: format!(
                    "not a TOML or YAML preset file ({}; {})",
                    toml_err, yaml_err
                ),
            })?,
        };
        self.apply_file(file)
    }

    fn apply_file(&self, file: PresetFile) -> Result<usize> {
        let mut guard = self.table.write();
        let mut next: PresetTable = (**guard).clone();
        for entry in &file.presets {
            let base = next
                .get(&entry.botanical_name)
                .copied()
                .unwrap_or(RenderingPreset::DEFAULT);
            let preset = base.with_override(&entry.fields);
            preset.validate(&entry.botanical_name)?;
            next.insert(entry.botanical_name.clone(), preset);
        }
        *guard = Arc::new(next);
        debug!(count = file.presets.len(), "loaded species presets");
        Ok(file.presets.len())
    }

    /// Apply a reviewed partial update and return the resulting preset.
    pub fn update(
        &self,
        botanical_name: &str,
        partial: &PresetOverride,
    ) -> Result<RenderingPreset> {
        let mut guard = self.table.write();
        let base = guard
            .get(botanical_name)
            .copied()
            .unwrap_or(RenderingPreset::DEFAULT);
        let preset = base.with_override(partial);
        preset.validate(botanical_name)?;
        let mut next: PresetTable = (**guard).clone();
        next.insert(botanical_name.to_string(), preset);
        *guard = Arc::new(next);
        Ok(preset)
    }

    pub fn snapshot(&self) -> PresetSnapshot {
        PresetSnapshot(Arc::clone(&self.table.read()))
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl PresetLookup for PresetRepository {
    fn lookup(&self, botanical_name: &str) -> Option<RenderingPreset> {
        self.table.read().get(botanical_name).copied()
    }
}

/// Built-in table, or an empty one if it somehow fails to load.
pub fn default_repository() -> PresetRepository {
    PresetRepository::builtin().unwrap_or_else(|e| {
        warn!(error = %e, "built-in presets failed to load");
        PresetRepository::new()
    })
}

/// Built-in table with an optional preset file layered on top.
pub fn load_repository(path: Option<&Path>) -> Result<PresetRepository> {
    let repo = default_repository();
    if let Some(path) = path {
        let content = std::fs::read_to_string(path).map_err(|e| SymbolError::PresetConfig {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let count = repo.load_overrides(&content)?;
        info!(count, path = %path.display(), "loaded preset overrides");
    }
    Ok(repo)
}

fn parse_toml(content: &str) -> Result<PresetFile> {
    toml::from_str(content).map_err(|e| SymbolError::PresetConfig {
        message: format!("failed to parse preset TOML: {}", e),
    })
}

fn parse_yaml(content: &str) -> Result<PresetFile> {
    serde_yaml::from_str(content).map_err(|e| SymbolError::PresetConfig {
        message: format!("failed to parse preset YAML: {}", e),
    })
}
