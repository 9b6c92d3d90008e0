//! Planar Voronoi geometry generation
//!
//! Samples generator points, relaxes them with Lloyd's algorithm and builds
//! the Delaunay triangulation and clipped Voronoi cells.

mod boundary;
mod delaunay;
mod lloyd;
mod points;
mod voronoi;

pub use boundary::generate_boundary;
pub use delaunay::triangulate;
pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, relax_once, LloydOptions};
pub use points::{generate_points, grid_spacing};
pub use voronoi::{clip_to_rect, generate_cells, RawCell};

use glam::Vec2;
use std::time::Instant;

use crate::config::MapConfig;
use crate::rng::{MapRng, Stage};

/// Geometry of a map before any terrain is assigned
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Final generator points, one per cell
    pub points: Vec<Vec2>,
    /// Synthetic boundary ring appended after `points` when triangulating
    pub boundary: Vec<Vec2>,
    /// Raw cells, indexed like `points`
    pub cells: Vec<RawCell>,
    /// Triangulation of `points` followed by `boundary`
    pub voronoi_triangles: Vec<[usize; 3]>,
    /// Triangulation of `points` alone, for wireframe display
    pub triangles: Vec<[usize; 3]>,
}

/// Generate the cell geometry for a configuration
///
/// Progress is reported in [0, 1]: sampling and relaxation take the first
/// 75%, the padded triangulation and Voronoi build the rest.
pub fn generate_geometry(config: &MapConfig, progress: &dyn Fn(f32)) -> Geometry {
    let n = config.cell_count;
    if n == 0 {
        progress(1.0);
        return Geometry::default();
    }

    let width = config.width as f32;
    let height = config.height as f32;
    let spacing = grid_spacing(n, width, height);

    let start = Instant::now();
    let mut point_rng = MapRng::for_stage(&config.seed, Stage::Points);
    let points = generate_points(n, width, height, &mut point_rng);

    let mut boundary_rng = MapRng::for_stage(&config.seed, Stage::Boundary);
    let boundary = generate_boundary(
        width,
        height,
        spacing,
        config.boundary_padding_scale,
        config.boundary_step_scale,
        &mut boundary_rng,
    );
    progress(0.05);

    let options = LloydOptions {
        max_iterations: config.lloyd_iterations,
        convergence_threshold: config.lloyd_convergence,
    };
    let lloyd_progress = |f: f32| progress(0.05 + 0.7 * f);
    let points = lloyd_relaxation_with_options(
        points,
        &boundary,
        width,
        height,
        options,
        Some(&lloyd_progress),
    );
    progress(0.75);
    log::debug!(
        "Sampled {} points ({} boundary) in {:?}",
        points.len(),
        boundary.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let mut padded = Vec::with_capacity(points.len() + boundary.len());
    padded.extend_from_slice(&points);
    padded.extend_from_slice(&boundary);

    let triangulation_progress = |f: f32| progress(0.75 + 0.1 * f);
    let voronoi_triangles = triangulate(&padded, Some(&triangulation_progress));
    log::debug!(
        "Triangulated {} points into {} triangles in {:?}",
        padded.len(),
        voronoi_triangles.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let voronoi_progress = |f: f32| progress(0.85 + 0.1 * f);
    let cells = generate_cells(
        &padded,
        &voronoi_triangles,
        n,
        width,
        height,
        Some(&voronoi_progress),
    );
    let triangles = triangulate(&points, None);
    log::debug!("Built {} Voronoi cells in {:?}", cells.len(), start.elapsed());
    progress(1.0);

    Geometry {
        points,
        boundary,
        cells,
        voronoi_triangles,
        triangles,
    }
}
