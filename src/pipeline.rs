//! Generation pipeline
//!
//! Runs every stage in order on one cell array. Two fork-join regions run
//! independent stages side by side when multithreading is enabled:
//!
//! - precipitation alongside features, coast distance, lakes and depressions
//! - biomes alongside river polylines
//!
//! Concurrent stages write disjoint data and draw from separate PRNG
//! streams, so the output does not depend on `use_multithreading`.

use std::cell::Cell as ProgressCell;
use std::time::Instant;

use glam::Vec2;

use crate::cell::Cell;
use crate::climate::{assign_biomes, compute_precipitation};
use crate::color::{assign_height_colors, assign_render_colors, BiomePalette};
use crate::config::MapConfig;
use crate::error::{MapGenError, Result};
use crate::generation::{generate_geometry, Geometry};
use crate::hydrology::{build_river_paths, generate_rivers, run_hydrology, FeatureKind};
use crate::map::{MapData, MapParts};
use crate::parallel;
use crate::rng::{MapRng, Stage};
use crate::terrain::{apply_heights, build_heightmap, enforce_border};

/// Monotonic, clamped progress reporting
///
/// Values below 1.0 are capped just under it; only [`Progress::finish`]
/// reports 1.0.
struct Progress<'a> {
    callback: &'a dyn Fn(f32),
    last: ProgressCell<f32>,
}

impl<'a> Progress<'a> {
    const CAP: f32 = 0.99;

    fn new(callback: &'a dyn Fn(f32)) -> Self {
        Self {
            callback,
            last: ProgressCell::new(0.0),
        }
    }

    fn report(&self, fraction: f32) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, Self::CAP) };
        if fraction < self.last.get() {
            return;
        }
        self.last.set(fraction);
        (self.callback)(fraction);
    }

    fn finish(&self) {
        self.last.set(1.0);
        (self.callback)(1.0);
    }
}

/// Generate a complete map
///
/// # Errors
///
/// Returns `InvalidConfig` if the configuration fails validation.
///
/// # Example
///
/// ```
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
/// let map = generate(&config).unwrap();
/// assert_eq!(map.cell_count(), 500);
/// ```
pub fn generate(config: &MapConfig) -> Result<MapData> {
    generate_with_progress(config, &|_| {})
}

/// Generate a complete map, reporting progress in `[0, 1]`
///
/// The callback runs on the calling thread, never decreases, and sees 1.0
/// only once the map is complete.
pub fn generate_with_progress(config: &MapConfig, progress: &dyn Fn(f32)) -> Result<MapData> {
    run(config, progress, true)
}

/// Generate heights, border and colors only
///
/// Skips hydrology and climate: no features, rivers, precipitation or
/// biomes. Resolved heights equal the cell heights.
pub fn generate_simple(config: &MapConfig) -> Result<MapData> {
    generate_simple_with_progress(config, &|_| {})
}

/// [`generate_simple`] with progress reporting
pub fn generate_simple_with_progress(config: &MapConfig, progress: &dyn Fn(f32)) -> Result<MapData> {
    run(config, progress, false)
}

fn run(config: &MapConfig, callback: &dyn Fn(f32), full: bool) -> Result<MapData> {
    config.validate()?;

    let progress = Progress::new(callback);
    let total_start = Instant::now();
    let parallel = config.use_multithreading;
    let width = config.width as f32;
    let height = config.height as f32;
    let water_level = config.water_level;

    if config.cell_count == 0 {
        let map = MapData::assemble(
            config.clone(),
            MapParts {
                heightmap: vec![0.0; config.pixel_count()],
                ..Default::default()
            },
        )?;
        log::info!("Generated empty map for seed {}", config.seed);
        progress.finish();
        return Ok(map);
    }

    // Geometry
    let geometry_share = if full { 0.45 } else { 0.7 };
    let Geometry {
        points,
        boundary,
        cells: raw_cells,
        voronoi_triangles,
        triangles,
    } = generate_geometry(config, &|f| progress.report(f * geometry_share));

    let mut cells: Vec<Cell> = raw_cells
        .into_iter()
        .map(|raw| Cell::new(raw.id, raw.position, raw.neighbors, raw.vertices))
        .collect();

    // Heights and border
    let start = Instant::now();
    let heightmap = build_heightmap(config, &cells);
    apply_heights(&mut cells, &heightmap.cell_heights, water_level, parallel);
    let border_cells = enforce_border(&mut cells, width, height, water_level);
    assign_height_colors(&mut cells, water_level, parallel);
    log::debug!(
        "Heightmap ({}): {} land cells, {} border cells in {:?}",
        heightmap.template.map_or("freeform", |t| t.name()),
        cells.iter().filter(|c| c.is_land).count(),
        border_cells,
        start.elapsed()
    );
    progress.report(if full { 0.55 } else { 0.85 });

    if !full {
        let resolved_heights = cells.iter().map(|c| c.height).collect();
        assign_render_colors(&mut cells, &BiomePalette, parallel);

        let map = MapData::assemble(
            config.clone(),
            MapParts {
                points,
                boundary_points: boundary,
                cells,
                triangles,
                voronoi_triangles,
                heightmap: heightmap.raster,
                resolved_heights,
                template: heightmap.template,
                ..Default::default()
            },
        )?;
        log::info!(
            "Generated preview map: {} cells, {}x{} in {:?}",
            map.cell_count(),
            config.width,
            config.height,
            total_start.elapsed()
        );
        progress.finish();
        return Ok(map);
    }

    // Fork A: precipitation alongside hydrology
    let start = Instant::now();
    let positions: Vec<Vec2> = cells.iter().map(|c| c.position).collect();
    let (precipitation, hydrology) = parallel::join(
        parallel,
        || {
            compute_precipitation(
                &positions,
                width,
                height,
                &config.seed,
                &config.precipitation_noise,
                parallel,
            )
        },
        || run_hydrology(&mut cells),
    );
    let hydrology = hydrology?;
    if precipitation.len() != cells.len() {
        return Err(MapGenError::GenerationFailed(format!(
            "precipitation covers {} of {} cells",
            precipitation.len(),
            cells.len()
        )));
    }
    for (cell, value) in cells.iter_mut().zip(precipitation) {
        cell.precipitation = value;
    }
    log::debug!("Hydrology and precipitation in {:?}", start.elapsed());
    progress.report(0.75);

    // Rivers
    let start = Instant::now();
    let mut river_rng = MapRng::for_stage(&config.seed, Stage::Rivers);
    let mut rivers = generate_rivers(
        &cells,
        &hydrology.resolved_heights,
        water_level,
        config.river_density,
        &mut river_rng,
    );
    log::debug!("Rivers in {:?}", start.elapsed());
    progress.report(0.85);

    // Fork B: biomes alongside river polylines
    let start = Instant::now();
    let (biomes, paths) = parallel::join(
        parallel,
        || assign_biomes(&cells, height, water_level, parallel),
        || build_river_paths(&cells, &rivers, width, height, &config.seed),
    );
    if biomes.len() != cells.len() || paths.len() != rivers.len() {
        return Err(MapGenError::GenerationFailed(format!(
            "{} biomes for {} cells, {} paths for {} rivers",
            biomes.len(),
            cells.len(),
            paths.len(),
            rivers.len()
        )));
    }
    for (cell, biome) in cells.iter_mut().zip(biomes) {
        cell.biome_id = biome;
    }
    for (river, path) in rivers.iter_mut().zip(paths) {
        river.path = path;
    }
    log::debug!("Biomes and river paths in {:?}", start.elapsed());
    progress.report(0.95);

    assign_render_colors(&mut cells, &BiomePalette, parallel);

    let map = MapData::assemble(
        config.clone(),
        MapParts {
            points,
            boundary_points: boundary,
            cells,
            triangles,
            voronoi_triangles,
            heightmap: heightmap.raster,
            resolved_heights: hydrology.resolved_heights,
            features: hydrology.features,
            rivers,
            template: heightmap.template,
        },
    )?;

    log::info!(
        "Generated map: {} cells, {}x{}, {} features ({} oceans), {} rivers in {:?}",
        map.cell_count(),
        config.width,
        config.height,
        map.features().len(),
        map.features()
            .iter()
            .filter(|f| f.kind == FeatureKind::Ocean)
            .count(),
        map.rivers().len(),
        total_start.elapsed()
    );
    progress.finish();
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::Biome;
    use crate::color::{ColorMapper, HeightBands};
    use crate::config::MapConfigBuilder;
    use crate::hydrology::{steps_to_outlet, RiverMouth};
    use crate::terrain::{touches_border, HeightmapTemplate};

    fn config(seed: &str, cells: usize, size: u32) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .cell_count(cells)
            .unwrap()
            .size(size, size)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let config = config("test-seed-1", 500, 512);
        let first = generate(&config).unwrap();
        let second = generate(&config).unwrap();

        assert_eq!(first.cell_count(), 500);
        assert_eq!(first.points().len(), 500);
        assert!(first.features().iter().any(|f| f.kind == FeatureKind::Ocean));
        assert_eq!(first.cells()[0].height, second.cells()[0].height);
        assert_eq!(first.cells(), second.cells());
        assert_eq!(first.rivers(), second.rivers());
    }

    #[test]
    fn test_multithreading_does_not_change_output() {
        for template in [None, Some(HeightmapTemplate::Archipelago)] {
            let mut base = config("threads", 800, 384);
            if let Some(t) = template {
                base.use_template = true;
                base.template = t;
            }
            let mut sequential = base.clone();
            sequential.use_multithreading = false;
            let mut threaded = base;
            threaded.use_multithreading = true;

            let a = generate(&sequential).unwrap();
            let b = generate(&threaded).unwrap();
            assert_eq!(a.cells(), b.cells());
            assert_eq!(a.heightmap(), b.heightmap());
            assert_eq!(a.resolved_heights(), b.resolved_heights());
            assert_eq!(a.features(), b.features());
            assert_eq!(a.rivers(), b.rivers());
        }
    }

    #[test]
    fn test_empty_map() {
        let map = generate(&config("empty", 0, 256)).unwrap();
        assert_eq!(map.cell_count(), 0);
        assert!(map.points().is_empty());
        assert!(map.rivers().is_empty());
        assert!(map.features().is_empty());
        assert_eq!(map.heightmap().len(), 256 * 256);
        assert_eq!(map.find_cell_at(Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_zero_river_density() {
        for seed in ["a", "b", "c"] {
            let mut config = config(seed, 600, 256);
            config.river_density = 0.0;
            assert!(generate(&config).unwrap().rivers().is_empty());
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config("bad", 100, 256);
        config.width = 64;
        assert!(matches!(generate(&config), Err(MapGenError::InvalidConfig(_))));
        assert!(generate_simple(&config).is_err());
    }

    #[test]
    fn test_border_cells_are_land() {
        let map = generate(&config("border", 700, 320)).unwrap();
        let mut border = 0;
        for cell in map.cells() {
            assert_eq!(cell.is_border, touches_border(cell, 320.0, 320.0));
            if cell.is_border {
                assert!(cell.is_land, "Border cell {} is water", cell.id);
                assert!(cell.height > map.config().water_level);
                border += 1;
            }
        }
        assert!(border > 0);
    }

    #[test]
    fn test_every_land_cell_drains() {
        let map = generate(&config("drainage", 900, 400)).unwrap();
        let cells = map.cells();
        let resolved = map.resolved_heights();
        for cell in cells.iter().filter(|c| c.is_land) {
            let outlet = |id: usize| cells[id].is_water() || cells[id].is_border;
            assert!(
                steps_to_outlet(cells, resolved, cell.id, outlet).is_some(),
                "Cell {} cannot drain",
                cell.id
            );
        }
    }

    #[test]
    fn test_rivers_descend_and_terminate() {
        let mut config = config("rivers", 1500, 512);
        config.river_density = 2.0;
        let map = generate(&config).unwrap();
        let cells = map.cells();
        let resolved = map.resolved_heights();

        for river in map.rivers() {
            assert!(river.len() >= 3);
            assert!(!river.path.is_empty());
            for pair in river.cells.windows(2) {
                assert!(resolved[pair[1]] < resolved[pair[0]], "River {} climbs", river.id);
            }
            let last = river.cells[river.len() - 1];
            match river.mouth {
                RiverMouth::Water => assert!(cells[last].is_water()),
                RiverMouth::MapEdge => assert!(cells[last].is_border),
                RiverMouth::Confluence => {
                    let parent = river.parent.unwrap();
                    assert!(parent < river.id);
                    assert!(map.rivers()[parent].cells.contains(&last));
                }
            }
            for p in &river.path {
                assert!(p.x >= 0.0 && p.x <= 512.0 && p.y >= 0.0 && p.y <= 512.0);
            }
        }
    }

    #[test]
    fn test_render_color_matches_biome_or_height() {
        let map = generate(&config("colors", 600, 256)).unwrap();
        let bands = HeightBands {
            water_level: map.config().water_level,
        };
        for cell in map.cells() {
            assert_eq!(cell.height_color, bands.map_color(&cell.height));
            match Biome::from_id(cell.biome_id) {
                Some(biome) => {
                    assert!(cell.is_land);
                    assert_eq!(cell.render_color, BiomePalette.map_color(&biome));
                }
                None => {
                    assert_eq!(cell.biome_id, 0);
                    assert_eq!(cell.render_color, cell.height_color);
                }
            }
        }
    }

    #[test]
    fn test_generate_simple() {
        let config = config("preview", 500, 256);
        let map = generate_simple(&config).unwrap();

        assert_eq!(map.cell_count(), 500);
        assert!(map.features().is_empty());
        assert!(map.rivers().is_empty());
        for (cell, &resolved) in map.cells().iter().zip(map.resolved_heights()) {
            assert_eq!(cell.height, resolved);
            assert_eq!(cell.biome_id, 0);
            assert_eq!(cell.precipitation, 0);
            assert_eq!(cell.render_color, cell.height_color);
        }

        // Same heights as the full pipeline before hydrology flattens lakes
        let full = generate(&config).unwrap();
        assert_eq!(map.heightmap(), full.heightmap());
        assert_eq!(map.points(), full.points());
    }

    #[test]
    fn test_progress_is_monotonic_and_finishes() {
        for full in [true, false] {
            let reports = std::cell::RefCell::new(Vec::new());
            let record = |f: f32| reports.borrow_mut().push(f);
            let config = config("progress", 400, 256);
            if full {
                generate_with_progress(&config, &record).unwrap();
            } else {
                generate_simple_with_progress(&config, &record).unwrap();
            }

            let reports = reports.into_inner();
            assert!(reports.len() > 3);
            assert!(reports.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(reports.last(), Some(&1.0));
            assert_eq!(reports.iter().filter(|&&f| f == 1.0).count(), 1);
        }
    }

    #[test]
    fn test_progress_wrapper() {
        let seen = std::cell::RefCell::new(Vec::new());
        let record = |f: f32| seen.borrow_mut().push(f);
        let progress = Progress::new(&record);
        progress.report(0.3);
        progress.report(0.2);
        progress.report(f32::NAN);
        progress.report(1.5);
        progress.finish();
        assert_eq!(seen.into_inner(), vec![0.3, 0.99, 1.0]);
    }

    #[test]
    fn test_template_mode() {
        let config = MapConfigBuilder::new()
            .seed(9u64)
            .cell_count(700)
            .unwrap()
            .size(300, 300)
            .unwrap()
            .random_template()
            .build()
            .unwrap();
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert!(a.template().is_some());
        assert_eq!(a.template(), b.template());
        assert_eq!(a.cells(), b.cells());
    }
}
