//! Biome classification

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::parallel;

/// Land biomes
///
/// Discriminants are the `biome_id` stored on cells. Id 0 is reserved for
/// "no biome" (water and unclassified cells).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Biome {
    HotDesert = 1,
    ColdDesert = 2,
    Savanna = 3,
    Grassland = 4,
    TropicalSeasonalForest = 5,
    TemperateDeciduousForest = 6,
    TropicalRainforest = 7,
    TemperateRainforest = 8,
    Taiga = 9,
    Tundra = 10,
    Glacier = 11,
    Wetland = 12,
}

impl Biome {
    pub const ALL: [Biome; 12] = [
        Biome::HotDesert,
        Biome::ColdDesert,
        Biome::Savanna,
        Biome::Grassland,
        Biome::TropicalSeasonalForest,
        Biome::TemperateDeciduousForest,
        Biome::TropicalRainforest,
        Biome::TemperateRainforest,
        Biome::Taiga,
        Biome::Tundra,
        Biome::Glacier,
        Biome::Wetland,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a biome by id, `None` for 0 and unknown ids
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get((id as usize).wrapping_sub(1)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::HotDesert => "Hot desert",
            Biome::ColdDesert => "Cold desert",
            Biome::Savanna => "Savanna",
            Biome::Grassland => "Grassland",
            Biome::TropicalSeasonalForest => "Tropical seasonal forest",
            Biome::TemperateDeciduousForest => "Temperate deciduous forest",
            Biome::TropicalRainforest => "Tropical rainforest",
            Biome::TemperateRainforest => "Temperate rainforest",
            Biome::Taiga => "Taiga",
            Biome::Tundra => "Tundra",
            Biome::Glacier => "Glacier",
            Biome::Wetland => "Wetland",
        }
    }
}

/// Temperature lost between the water level and the highest peak
pub const ELEVATION_COOLING: f32 = 0.6;
/// Moisture added to cells near the coast
pub const COASTAL_MOISTURE: f32 = 0.1;
/// Coast distance at or below which the coastal bonus applies
pub const COASTAL_DISTANCE: i32 = 2;

const GLACIER_TEMPERATURE: f32 = 0.12;
const COLD_TEMPERATURE: f32 = 0.3;
const HOT_TEMPERATURE: f32 = 0.65;
const WETLAND_MOISTURE: f32 = 0.8;
const WETLAND_MAX_ELEVATION: f32 = 0.15;

/// Pick a biome from climate proxies
///
/// # Arguments
///
/// * `temperature` - 1 at the map's horizontal mid-line, lower toward the
///   top and bottom edges and with elevation
/// * `moisture` - Roughly `[0, 1]`
/// * `elevation` - Height above the water level as a fraction of the land
///   height range
pub fn classify_biome(temperature: f32, moisture: f32, elevation: f32) -> Biome {
    if temperature < GLACIER_TEMPERATURE {
        return Biome::Glacier;
    }
    if moisture > WETLAND_MOISTURE
        && temperature >= COLD_TEMPERATURE
        && elevation < WETLAND_MAX_ELEVATION
    {
        return Biome::Wetland;
    }

    if temperature < COLD_TEMPERATURE {
        match moisture {
            m if m < 0.25 => Biome::ColdDesert,
            m if m < 0.5 => Biome::Tundra,
            _ => Biome::Taiga,
        }
    } else if temperature < HOT_TEMPERATURE {
        match moisture {
            m if m < 0.2 => Biome::ColdDesert,
            m if m < 0.45 => Biome::Grassland,
            m if m < 0.75 => Biome::TemperateDeciduousForest,
            _ => Biome::TemperateRainforest,
        }
    } else {
        match moisture {
            m if m < 0.2 => Biome::HotDesert,
            m if m < 0.45 => Biome::Savanna,
            m if m < 0.7 => Biome::TropicalSeasonalForest,
            _ => Biome::TropicalRainforest,
        }
    }
}

/// Height above the water level, scaled to `[0, 1]` over the land range
#[inline]
pub fn elevation_ratio(height: f32, water_level: f32) -> f32 {
    ((height - water_level) / (1.0 - water_level)).clamp(0.0, 1.0)
}

/// Latitude-and-elevation temperature proxy
pub fn temperature_at(y: f32, map_height: f32, height: f32, water_level: f32) -> f32 {
    let half = (map_height * 0.5).max(f32::EPSILON);
    let latitude = 1.0 - ((y - half).abs() / half).min(1.0);
    latitude - ELEVATION_COOLING * elevation_ratio(height, water_level)
}

/// Biome id for every cell; water cells get 0
///
/// Reads height, land flag, precipitation and coast distance, writes nothing.
pub fn assign_biomes(cells: &[Cell], map_height: f32, water_level: f32, parallel: bool) -> Vec<u8> {
    parallel::map_indexed(parallel, cells.len(), |i| {
        let cell = &cells[i];
        if !cell.is_land {
            return 0;
        }

        let temperature = temperature_at(cell.position.y, map_height, cell.height, water_level);
        let mut moisture = cell.precipitation as f32 / 255.0;
        if cell.coast_distance <= COASTAL_DISTANCE {
            moisture += COASTAL_MOISTURE;
        }

        classify_biome(temperature, moisture, elevation_ratio(cell.height, water_level)).id()
    })
}
