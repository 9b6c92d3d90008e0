//! Color mapping for cells
//!
//! Height-banded colors are assigned right after the heightmap; the final
//! render color is the biome color when a cell has a biome and the height
//! color otherwise.

use crate::cell::Cell;
use crate::climate::Biome;
use crate::parallel;

/// RGBA color type
pub type TerrainColor = [f32; 4];

/// Trait for mapping values to colors
pub trait ColorMapper<T> {
    /// Map a value to an RGBA color
    fn map_color(&self, value: &T) -> TerrainColor;
}

/// Height-banded colors relative to a water level
#[derive(Debug, Clone, Copy)]
pub struct HeightBands {
    pub water_level: f32,
}

const DEEP_WATER: TerrainColor = [0.05, 0.15, 0.45, 1.0];
const SHALLOW_WATER: TerrainColor = [0.2, 0.45, 0.75, 1.0];
const SAND: TerrainColor = [0.87, 0.8, 0.55, 1.0];
const LOWLAND: TerrainColor = [0.3, 0.6, 0.25, 1.0];
const UPLAND: TerrainColor = [0.45, 0.55, 0.3, 1.0];
const MOUNTAIN: TerrainColor = [0.5, 0.45, 0.4, 1.0];
const SNOW: TerrainColor = [0.95, 0.95, 0.97, 1.0];

fn mix(a: TerrainColor, b: TerrainColor, t: f32) -> TerrainColor {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

impl ColorMapper<f32> for HeightBands {
    fn map_color(&self, height: &f32) -> TerrainColor {
        let h = *height;
        let level = self.water_level;
        if h <= level {
            // Shallow near the shore, deep toward 0
            return mix(DEEP_WATER, SHALLOW_WATER, h / level.max(f32::EPSILON));
        }

        match (h - level) / (1.0 - level).max(f32::EPSILON) {
            t if t < 0.05 => SAND,
            t if t < 0.35 => LOWLAND,
            t if t < 0.6 => UPLAND,
            t if t < 0.85 => MOUNTAIN,
            _ => SNOW,
        }
    }
}

/// Default biome colors
#[derive(Debug, Clone, Copy, Default)]
pub struct BiomePalette;

impl ColorMapper<Biome> for BiomePalette {
    fn map_color(&self, biome: &Biome) -> TerrainColor {
        match biome {
            Biome::HotDesert => [0.91, 0.78, 0.5, 1.0],
            Biome::ColdDesert => [0.75, 0.72, 0.62, 1.0],
            Biome::Savanna => [0.82, 0.77, 0.35, 1.0],
            Biome::Grassland => [0.55, 0.74, 0.3, 1.0],
            Biome::TropicalSeasonalForest => [0.4, 0.62, 0.2, 1.0],
            Biome::TemperateDeciduousForest => [0.25, 0.52, 0.2, 1.0],
            Biome::TropicalRainforest => [0.1, 0.45, 0.15, 1.0],
            Biome::TemperateRainforest => [0.15, 0.4, 0.25, 1.0],
            Biome::Taiga => [0.3, 0.42, 0.33, 1.0],
            Biome::Tundra => [0.6, 0.62, 0.55, 1.0],
            Biome::Glacier => [0.9, 0.95, 1.0, 1.0],
            Biome::Wetland => [0.3, 0.45, 0.38, 1.0],
        }
    }
}

/// Fill `height_color` from each cell's height
pub fn assign_height_colors(cells: &mut [Cell], water_level: f32, parallel: bool) {
    let bands = HeightBands { water_level };
    parallel::for_each_mut(parallel, cells, |_, cell| {
        cell.height_color = bands.map_color(&cell.height);
    });
}

/// Color for one cell: biome color when it has a valid biome, else height color
pub fn render_color<C: ColorMapper<Biome>>(cell: &Cell, palette: &C) -> TerrainColor {
    match Biome::from_id(cell.biome_id) {
        Some(biome) => palette.map_color(&biome),
        None => cell.height_color,
    }
}

/// Fill `render_color` for every cell
pub fn assign_render_colors<C>(cells: &mut [Cell], palette: &C, parallel: bool)
where
    C: ColorMapper<Biome> + Sync,
{
    parallel::for_each_mut(parallel, cells, |_, cell| {
        cell.render_color = render_color(cell, palette);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_height_bands() {
        let bands = HeightBands { water_level: 0.35 };

        let deep = bands.map_color(&0.0);
        let shallow = bands.map_color(&0.34);
        assert_eq!(deep, DEEP_WATER);
        assert!(shallow[2] > deep[2]);
        assert_eq!(bands.map_color(&0.36), SAND);
        assert_eq!(bands.map_color(&0.5), LOWLAND);
        assert_eq!(bands.map_color(&1.0), SNOW);
    }

    #[test]
    fn test_biome_palette_is_opaque() {
        for biome in Biome::ALL {
            assert_eq!(BiomePalette.map_color(&biome)[3], 1.0);
        }
    }

    #[test]
    fn test_render_color_fallback_is_exclusive() {
        let mut cells = vec![
            Cell::new(0, Vec2::ZERO, vec![], vec![]),
            Cell::new(1, Vec2::ZERO, vec![], vec![]),
            Cell::new(2, Vec2::ZERO, vec![], vec![]),
        ];
        cells[0].height = 0.2;
        cells[1].height = 0.6;
        cells[1].biome_id = Biome::Taiga.id();
        cells[2].height = 0.6;
        cells[2].biome_id = 200;

        assign_height_colors(&mut cells, 0.35, false);
        assign_render_colors(&mut cells, &BiomePalette, true);

        assert_eq!(cells[0].render_color, cells[0].height_color);
        assert_eq!(cells[1].render_color, BiomePalette.map_color(&Biome::Taiga));
        assert_ne!(cells[1].render_color, cells[1].height_color);
        // Unknown ids fall back to the height color
        assert_eq!(cells[2].render_color, cells[2].height_color);
    }

    struct Flat(TerrainColor);

    impl ColorMapper<Biome> for Flat {
        fn map_color(&self, _: &Biome) -> TerrainColor {
            self.0
        }
    }

    #[test]
    fn test_custom_palette() {
        let mut cell = Cell::new(0, Vec2::ZERO, vec![], vec![]);
        cell.biome_id = Biome::Savanna.id();
        assert_eq!(render_color(&cell, &Flat([1.0, 0.0, 1.0, 1.0])), [1.0, 0.0, 1.0, 1.0]);
    }
}
