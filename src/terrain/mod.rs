//! Heightmap generation and land classification
//!
//! Heights come either from a [`HeightmapTemplate`] shaped directly on the
//! cell graph, or from a freeform fractal-noise raster sampled at every cell.

mod border;
mod perlin;
mod template;

pub use border::{enforce_border, touches_border, BORDER_LIFT, BORDER_MARGIN};
pub use perlin::{sample_perlin_2d, sample_perlin_fbm, PerlinConfig};
pub use template::HeightmapTemplate;

use glam::Vec2;
use rand::RngCore;

use crate::cell::Cell;
use crate::config::MapConfig;
use crate::parallel;
use crate::rng::{MapRng, Stage};
use crate::spatial::SpatialIndex;

/// Weight of the noise term in the freeform heightmap; the rest is radial falloff
const NOISE_WEIGHT: f32 = 0.6;

/// Result of the heightmap stage
#[derive(Debug, Clone, Default)]
pub struct Heightmap {
    /// One height per cell, in `[0, 1]`
    pub cell_heights: Vec<f32>,
    /// Row-major `width x height` raster, in `[0, 1]`
    pub raster: Vec<f32>,
    /// Template used, `None` in freeform mode
    pub template: Option<HeightmapTemplate>,
}

/// Build the heightmap for a set of cells
///
/// In template mode the template shapes cell heights and the raster is
/// rebuilt by nearest-cell lookup. In freeform mode the raster is generated
/// first and each cell samples it at its position.
pub fn build_heightmap(config: &MapConfig, cells: &[Cell]) -> Heightmap {
    let width = config.width as usize;
    let height = config.height as usize;
    let parallel = config.use_multithreading;
    let positions: Vec<Vec2> = cells.iter().map(|c| c.position).collect();

    if config.use_template {
        let mut rng = MapRng::for_stage(&config.seed, Stage::Template);
        let template = if config.random_template {
            HeightmapTemplate::random(&mut rng)
        } else {
            config.template
        };
        log::debug!("Shaping heightmap with template {}", template);

        let cell_heights = template.shape(&mut rng, cells, config.width as f32, config.height as f32);
        let index = SpatialIndex::new(&positions);
        let raster = rasterize_cells(&cell_heights, &index, width, height, parallel);

        Heightmap {
            cell_heights,
            raster,
            template: Some(template),
        }
    } else {
        let noise_seed = MapRng::for_stage(&config.seed, Stage::TerrainNoise).next_u32();
        let raster = generate_noise_raster(width, height, noise_seed, &config.terrain_noise, parallel);
        let cell_heights = sample_raster(&raster, width, height, &positions);

        Heightmap {
            cell_heights,
            raster,
            template: None,
        }
    }
}

/// Freeform raster: fBm blended with a radial falloff, normalized to `[0, 1]`
///
/// The falloff keeps the map edges low so the interior reads as land
/// surrounded by sea.
pub fn generate_noise_raster(
    width: usize,
    height: usize,
    seed: u32,
    noise: &PerlinConfig,
    parallel: bool,
) -> Vec<f32> {
    let scale = width.max(height).max(1) as f32;
    let half = Vec2::new(width as f32, height as f32) * 0.5;

    let mut raster = parallel::fill_raster(parallel, width, height, |x, y| {
        let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        let value = sample_perlin_2d(pixel / scale, seed, noise);

        // 1 at the center, 0 from the edge midpoints outward
        let offset = (pixel - half) / half.max(Vec2::ONE);
        let falloff = 1.0 - offset.length_squared().min(1.0);

        NOISE_WEIGHT * value + (1.0 - NOISE_WEIGHT) * falloff
    });

    normalize(&mut raster);
    raster
}

/// Sample a raster at each position (nearest pixel, clamped)
pub fn sample_raster(raster: &[f32], width: usize, height: usize, positions: &[Vec2]) -> Vec<f32> {
    if raster.is_empty() || width == 0 || height == 0 {
        return vec![0.0; positions.len()];
    }

    positions
        .iter()
        .map(|p| {
            let x = (p.x.max(0.0) as usize).min(width - 1);
            let y = (p.y.max(0.0) as usize).min(height - 1);
            raster[y * width + x]
        })
        .collect()
}

/// Rebuild a raster by giving every pixel the height of its nearest cell
pub fn rasterize_cells(
    cell_heights: &[f32],
    index: &SpatialIndex,
    width: usize,
    height: usize,
    parallel: bool,
) -> Vec<f32> {
    parallel::fill_raster(parallel, width, height, |x, y| {
        index
            .find_nearest(Vec2::new(x as f32 + 0.5, y as f32 + 0.5))
            .and_then(|id| cell_heights.get(id).copied())
            .unwrap_or(0.0)
    })
}

/// Min-max normalize in place
///
/// A flat input becomes 0.5 everywhere.
pub fn normalize(values: &mut [f32]) {
    let (min, max) = values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let range = max - min;
    if !(range > f32::EPSILON) {
        values.iter_mut().for_each(|v| *v = 0.5);
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min) / range;
    }
}

/// Write heights onto cells and derive `is_land`
pub fn apply_heights(cells: &mut [Cell], heights: &[f32], water_level: f32, parallel: bool) {
    parallel::for_each_mut(parallel, cells, |i, cell| {
        cell.height = heights.get(i).copied().unwrap_or(0.0);
        cell.is_land = cell.height > water_level;
    });
}
