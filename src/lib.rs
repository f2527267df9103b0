//! Procedural plan-view canopy symbols for scale planting plans.
//!
//! A [`PlantSymbolData`] record plus [`RenderOptions`] becomes a standalone
//! SVG whose physical size matches the drawing scale. Rendering is pure and
//! deterministic: the same inputs always produce the same bytes.

pub mod error;
pub mod geometry;
pub mod palette;
pub mod presets;
pub mod random;
pub mod raster;
pub mod symbol;
pub mod xml;

pub use error::{Result, SymbolError};
pub use geometry::{Point, Scale, physical_mm};
pub use palette::ColorPalette;
pub use presets::{PresetLookup, PresetOverride, PresetRepository, RenderingPreset};
pub use random::{ChaChaRandom, SeededRandom, seed_from_name};
pub use symbol::{
    CrownTexture, LeafHabit, PlantSymbolData, RenderOptions, RenderedSymbol, Season,
    SymbolPack, SymbolRenderer, SymbolStyle, WinterInterest, symbol_file_name,
};
