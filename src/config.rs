//! Map generation configuration and builder
//!
//! This module provides the validated input for a generation run. The same
//! configuration always produces the identical map.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapGenError, Result};
use crate::rng::Seed;
use crate::terrain::{HeightmapTemplate, PerlinConfig};

/// Smallest accepted map width or height in pixels
pub const MIN_MAP_SIZE: u32 = 128;
/// Largest accepted map width or height in pixels
pub const MAX_MAP_SIZE: u32 = 4096;
/// Largest accepted cell count
pub const MAX_CELL_COUNT: usize = 20_000;
/// Largest accepted number of Lloyd iterations
pub const MAX_LLOYD_ITERATIONS: usize = 20;
/// Accepted range for the boundary padding and step scales
///
/// The ring holds about `perimeter / (spacing * step)` points, so the lower
/// bound keeps it within a small multiple of the cell count.
pub const BOUNDARY_SCALE_RANGE: (f32, f32) = (0.1, 10.0);

/// Configuration for deterministic map generation
///
/// Only the configuration needs to be stored to reproduce a map: generation
/// is a pure function of these values.
///
/// # Example
///
/// ```rust
/// use voronoi_mapgen::*;
///
/// let config = MapConfigBuilder::new()
///     .seed("test-seed-1")
///     .cell_count(500)
///     .unwrap()
///     .size(512, 512)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.cell_count, 500);
/// assert!((config.water_level - 0.35).abs() < 1e-6);
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Seed for every random decision in the pipeline
    pub seed: Seed,

    /// Number of cells to generate
    ///
    /// Zero is accepted and produces an empty map.
    pub cell_count: usize,

    /// Map width in pixels
    pub width: u32,

    /// Map height in pixels
    pub height: u32,

    /// Heights above this threshold are land
    pub water_level: f32,

    /// Shape the heightmap with a template instead of freeform noise
    pub use_template: bool,

    /// Template used when `use_template` is set and `random_template` is not
    pub template: HeightmapTemplate,

    /// Draw the template from the seed instead of using `template`
    pub random_template: bool,

    /// Scales how many river sources survive
    ///
    /// - 0.0: no rivers at all
    /// - 1.0: default density
    /// - 2.85 and above: every candidate source becomes a river
    pub river_density: f32,

    /// Distance of the synthetic boundary ring from the map edge, in units
    /// of the cell spacing
    pub boundary_padding_scale: f32,

    /// Distance between synthetic boundary points, in units of the cell
    /// spacing
    pub boundary_step_scale: f32,

    /// Run the fork-join regions and per-cell passes on the rayon pool
    ///
    /// Output is identical either way.
    pub use_multithreading: bool,

    /// Number of Lloyd's relaxation iterations
    pub lloyd_iterations: usize,

    /// Early-exit threshold for Lloyd's relaxation, as a fraction of the
    /// cell spacing
    ///
    /// - 0.0: Disable early termination (run all iterations)
    /// - 0.01: stop once no point moves more than 1% of the spacing
    pub lloyd_convergence: f32,

    /// Fractal noise parameters for the freeform heightmap
    pub terrain_noise: PerlinConfig,

    /// Fractal noise parameters for the precipitation field
    pub precipitation_noise: PerlinConfig,
}

impl MapConfig {
    /// Average distance between neighboring generator points
    ///
    /// Returns 0.0 for an empty map.
    pub fn spacing(&self) -> f32 {
        if self.cell_count == 0 {
            return 0.0;
        }
        let area = self.width as f32 * self.height as f32;
        (area / self.cell_count as f32).sqrt()
    }

    /// Number of pixels in the flat heightmap
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check every field against its accepted range
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first field out of range
    pub fn validate(&self) -> Result<()> {
        validate_size(self.width, self.height)?;
        validate_cell_count(self.cell_count)?;
        validate_water_level(self.water_level)?;
        validate_river_density(self.river_density)?;
        validate_boundary_scale("boundary padding scale", self.boundary_padding_scale)?;
        validate_boundary_scale("boundary step scale", self.boundary_step_scale)?;
        validate_lloyd_iterations(self.lloyd_iterations)?;
        validate_lloyd_convergence(self.lloyd_convergence)?;
        validate_noise("terrain noise", &self.terrain_noise)?;
        validate_noise("precipitation noise", &self.precipitation_noise)?;
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().assemble()
    }
}

fn validate_size(width: u32, height: u32) -> Result<()> {
    for (name, value) in [("width", width), ("height", height)] {
        if !(MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&value) {
            return Err(MapGenError::InvalidConfig(format!(
                "map {} must be in [{}, {}] (got {})",
                name, MIN_MAP_SIZE, MAX_MAP_SIZE, value
            )));
        }
    }
    Ok(())
}

fn validate_cell_count(count: usize) -> Result<()> {
    if count > MAX_CELL_COUNT {
        return Err(MapGenError::InvalidConfig(format!(
            "cell count must be <= {} (got {})",
            MAX_CELL_COUNT, count
        )));
    }
    Ok(())
}

fn validate_water_level(level: f32) -> Result<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(MapGenError::InvalidConfig(format!(
            "water level must be in (0, 1) (got {})",
            level
        )));
    }
    Ok(())
}

fn validate_river_density(density: f32) -> Result<()> {
    if !density.is_finite() || density < 0.0 {
        return Err(MapGenError::InvalidConfig(format!(
            "river density must be finite and >= 0 (got {})",
            density
        )));
    }
    Ok(())
}

fn validate_boundary_scale(name: &str, scale: f32) -> Result<()> {
    let (min, max) = BOUNDARY_SCALE_RANGE;
    if !(min..=max).contains(&scale) {
        return Err(MapGenError::InvalidConfig(format!(
            "{} must be in [{}, {}] (got {})",
            name, min, max, scale
        )));
    }
    Ok(())
}

fn validate_lloyd_iterations(iterations: usize) -> Result<()> {
    if iterations > MAX_LLOYD_ITERATIONS {
        return Err(MapGenError::InvalidConfig(format!(
            "Lloyd iterations must be <= {} (got {})",
            MAX_LLOYD_ITERATIONS, iterations
        )));
    }
    Ok(())
}

fn validate_lloyd_convergence(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(MapGenError::InvalidConfig(format!(
            "Lloyd convergence threshold must be >= 0 (got {})",
            threshold
        )));
    }
    Ok(())
}

fn validate_noise(name: &str, noise: &PerlinConfig) -> Result<()> {
    if noise.octaves == 0 {
        return Err(MapGenError::InvalidConfig(format!(
            "{} needs at least one octave",
            name
        )));
    }
    if !noise.base_frequency.is_finite() || noise.base_frequency <= 0.0 {
        return Err(MapGenError::InvalidConfig(format!(
            "{} base frequency must be positive (got {})",
            name, noise.base_frequency
        )));
    }
    Ok(())
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_mapgen::*;
///
/// // Use defaults
/// let config = MapConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .seed(12345u64)
///     .cell_count(2_000)
///     .unwrap()
///     .template(HeightmapTemplate::Archipelago)
///     .river_density(1.5)
///     .unwrap()
///     .multithreading(false)
///     .build()
///     .unwrap();
/// assert!(config.use_template);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<Seed>,
    cell_count: usize,
    width: u32,
    height: u32,
    water_level: f32,
    use_template: bool,
    template: HeightmapTemplate,
    random_template: bool,
    river_density: f32,
    boundary_padding_scale: f32,
    boundary_step_scale: f32,
    use_multithreading: bool,
    lloyd_iterations: usize,
    lloyd_convergence: f32,
    terrain_noise: PerlinConfig,
    precipitation_noise: PerlinConfig,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - cell_count: 5,000
    /// - size: 1024 x 1024
    /// - water_level: 0.35
    /// - heightmap: freeform noise (template `HighIsland` when enabled)
    /// - river_density: 1.0
    /// - boundary scales: 1.0
    /// - multithreading: on
    /// - lloyd_iterations: 2, no early exit
    pub fn new() -> Self {
        Self {
            seed: None,
            cell_count: 5_000,
            width: 1024,
            height: 1024,
            water_level: 0.35,
            use_template: false,
            template: HeightmapTemplate::default(),
            random_template: false,
            river_density: 1.0,
            boundary_padding_scale: 1.0,
            boundary_step_scale: 1.0,
            use_multithreading: true,
            lloyd_iterations: 2,
            lloyd_convergence: 0.0,
            terrain_noise: PerlinConfig::terrain(),
            precipitation_noise: PerlinConfig::precipitation(),
        }
    }

    /// Set the seed
    ///
    /// Accepts integers and strings. Strings holding an unsigned integer are
    /// the same seed as that integer.
    pub fn seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Set the number of cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if count > 20,000
    pub fn cell_count(mut self, count: usize) -> Result<Self> {
        validate_cell_count(count)?;
        self.cell_count = count;
        Ok(self)
    }

    /// Set the map size in pixels
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either side is outside [128, 4096]
    pub fn size(mut self, width: u32, height: u32) -> Result<Self> {
        validate_size(width, height)?;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the water level
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the level is not strictly between 0 and 1
    pub fn water_level(mut self, level: f32) -> Result<Self> {
        validate_water_level(level)?;
        self.water_level = level;
        Ok(self)
    }

    /// Use a specific heightmap template
    ///
    /// Enables template mode.
    pub fn template(mut self, template: HeightmapTemplate) -> Self {
        self.template = template;
        self.use_template = true;
        self.random_template = false;
        self
    }

    /// Pick the heightmap template from the seed
    ///
    /// Enables template mode.
    pub fn random_template(mut self) -> Self {
        self.use_template = true;
        self.random_template = true;
        self
    }

    /// Switch between template mode and freeform noise
    pub fn use_template(mut self, enabled: bool) -> Self {
        self.use_template = enabled;
        self
    }

    /// Set the river density
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if density is negative or not finite
    pub fn river_density(mut self, density: f32) -> Result<Self> {
        validate_river_density(density)?;
        self.river_density = density;
        Ok(self)
    }

    /// Set the boundary ring offset, in units of cell spacing
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if scale is outside [0.1, 10]
    pub fn boundary_padding_scale(mut self, scale: f32) -> Result<Self> {
        validate_boundary_scale("boundary padding scale", scale)?;
        self.boundary_padding_scale = scale;
        Ok(self)
    }

    /// Set the boundary point spacing, in units of cell spacing
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if scale is outside [0.1, 10]
    pub fn boundary_step_scale(mut self, scale: f32) -> Result<Self> {
        validate_boundary_scale("boundary step scale", scale)?;
        self.boundary_step_scale = scale;
        Ok(self)
    }

    /// Toggle the rayon-backed parallel regions
    pub fn multithreading(mut self, enabled: bool) -> Self {
        self.use_multithreading = enabled;
        self
    }

    /// Set the number of Lloyd's Relaxation iterations
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20 (excessive and impractical)
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        validate_lloyd_iterations(iterations)?;
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Set the convergence threshold for Lloyd's relaxation
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if threshold is negative
    pub fn lloyd_convergence(mut self, threshold: f32) -> Result<Self> {
        validate_lloyd_convergence(threshold)?;
        self.lloyd_convergence = threshold;
        Ok(self)
    }

    /// Set the noise used by the freeform heightmap
    pub fn terrain_noise(mut self, noise: PerlinConfig) -> Self {
        self.terrain_noise = noise;
        self
    }

    /// Set the noise used by the precipitation field
    pub fn precipitation_noise(mut self, noise: PerlinConfig) -> Self {
        self.precipitation_noise = noise;
        self
    }

    fn assemble(self) -> MapConfig {
        let seed = self
            .seed
            .unwrap_or_else(|| Seed::Int(rand::random::<u32>() as u64));

        MapConfig {
            seed,
            cell_count: self.cell_count,
            width: self.width,
            height: self.height,
            water_level: self.water_level,
            use_template: self.use_template,
            template: self.template,
            random_template: self.random_template,
            river_density: self.river_density,
            boundary_padding_scale: self.boundary_padding_scale,
            boundary_step_scale: self.boundary_step_scale,
            use_multithreading: self.use_multithreading,
            lloyd_iterations: self.lloyd_iterations,
            lloyd_convergence: self.lloyd_convergence,
            terrain_noise: self.terrain_noise,
            precipitation_noise: self.precipitation_noise,
        }
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a noise configuration is unusable
    pub fn build(self) -> Result<MapConfig> {
        let config = self.assemble();
        config.validate()?;
        Ok(config)
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
