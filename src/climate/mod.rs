//! Climate: precipitation and biomes

mod biome;
mod precipitation;

pub use biome::{
    assign_biomes, classify_biome, elevation_ratio, temperature_at, Biome, COASTAL_DISTANCE,
    COASTAL_MOISTURE, ELEVATION_COOLING,
};
pub use precipitation::{compute_precipitation, quantize};
