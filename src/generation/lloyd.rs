//! Lloyd's Relaxation for uniform point distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of the point set
//! by moving each point to the centroid of its clipped Voronoi cell.

use glam::Vec2;
use std::time::Instant;

use super::delaunay::triangulate;
use super::points::clamp_to_bounds;
use super::voronoi::generate_cells;
use crate::cell::polygon_centroid;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold relative to the cell spacing. Stop when the
    /// largest displacement falls below `threshold * spacing`.
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f32,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            convergence_threshold: 0.0,
        }
    }
}

/// Apply Lloyd's Relaxation to improve point distribution uniformity
///
/// # Arguments
///
/// * `points` - Initial point distribution
/// * `boundary` - Padding ring (see [`super::boundary`]), kept fixed
/// * `width`, `height` - Map size
/// * `iterations` - Number of relaxation iterations
///
/// # Returns
///
/// Relaxed points, same count and order as the input
pub fn lloyd_relaxation(
    points: Vec<Vec2>,
    boundary: &[Vec2],
    width: f32,
    height: f32,
    iterations: usize,
) -> Vec<Vec2> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(points, boundary, width, height, options, None)
}

/// Apply Lloyd's Relaxation with custom options
///
/// Each iteration triangulates the points together with the boundary ring,
/// builds the clipped Voronoi cells and moves every point to its cell's
/// area-weighted centroid. A degenerate polygon falls back to the vertex
/// average; an empty one leaves the point where it was.
///
/// # Arguments
///
/// * `points` - Initial point distribution
/// * `boundary` - Padding ring, kept fixed
/// * `width`, `height` - Map size
/// * `options` - Relaxation options (max iterations, convergence threshold)
/// * `progress` - Optional callback receiving the completed fraction
///
/// # Returns
///
/// Relaxed points with improved uniformity
pub fn lloyd_relaxation_with_options(
    mut points: Vec<Vec2>,
    boundary: &[Vec2],
    width: f32,
    height: f32,
    options: LloydOptions,
    progress: Option<&dyn Fn(f32)>,
) -> Vec<Vec2> {
    let num_points = points.len();
    if num_points == 0 || options.max_iterations == 0 {
        return points;
    }

    let spacing = (width * height / num_points as f32).sqrt();
    let convergence_threshold = options.convergence_threshold * spacing;
    let total_start = Instant::now();

    log::debug!(
        "Lloyd: {} points, max {} iterations, threshold {:.4} (abs: {:.4})",
        num_points,
        options.max_iterations,
        options.convergence_threshold,
        convergence_threshold
    );

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let (new_points, max_displacement) = relax_once(&points, boundary, width, height);

        points = new_points;
        iterations_run = iteration + 1;

        log::debug!(
            "Lloyd iter {}: {:?}, max_disp={:.4}",
            iteration + 1,
            iter_start.elapsed(),
            max_displacement
        );

        if let Some(report) = progress {
            report(iterations_run as f32 / options.max_iterations as f32);
        }

        // Early exit if converged
        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            converged = true;
            log::debug!(
                "Lloyd converged at iteration {} (max_disp {:.4} < threshold {:.4})",
                iteration + 1,
                max_displacement,
                convergence_threshold
            );
            break;
        }
    }

    log::debug!(
        "Lloyd finished: {} iterations (of max {}), converged={}, total={:?}",
        iterations_run,
        options.max_iterations,
        converged,
        total_start.elapsed()
    );

    points
}

/// One relaxation step, returning the new points and the largest move
pub fn relax_once(points: &[Vec2], boundary: &[Vec2], width: f32, height: f32) -> (Vec<Vec2>, f32) {
    let mut padded = Vec::with_capacity(points.len() + boundary.len());
    padded.extend_from_slice(points);
    padded.extend_from_slice(boundary);

    let triangles = triangulate(&padded, None);
    let cells = generate_cells(&padded, &triangles, points.len(), width, height, None);

    let mut max_displacement: f32 = 0.0;
    let new_points: Vec<Vec2> = cells
        .iter()
        .map(|cell| {
            let old_pos = points[cell.id];
            let new_pos = match polygon_centroid(&cell.vertices) {
                Some(centroid) => clamp_to_bounds(centroid, width, height),
                None => {
                    log::trace!("Lloyd: cell {} has no polygon, keeping its point", cell.id);
                    old_pos
                }
            };
            max_displacement = max_displacement.max(old_pos.distance(new_pos));
            new_pos
        })
        .collect();

    (new_points, max_displacement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::boundary::generate_boundary;
    use crate::generation::points::{generate_points, grid_spacing};
    use crate::rng::{MapRng, Seed, Stage};

    fn setup(n: usize, width: f32, height: f32, seed: &str) -> (Vec<Vec2>, Vec<Vec2>) {
        let seed = Seed::from(seed);
        let points = generate_points(n, width, height, &mut MapRng::for_stage(&seed, Stage::Points));
        let boundary = generate_boundary(
            width,
            height,
            grid_spacing(n, width, height),
            1.0,
            1.0,
            &mut MapRng::for_stage(&seed, Stage::Boundary),
        );
        (points, boundary)
    }

    /// Smallest distance between any two points
    fn min_separation(points: &[Vec2]) -> f32 {
        let mut best = f32::MAX;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                best = best.min(a.distance(*b));
            }
        }
        best
    }

    #[test]
    fn test_lloyd_relaxation() {
        let (points, boundary) = setup(200, 400.0, 400.0, "lloyd");
        let before = min_separation(&points);
        let relaxed = lloyd_relaxation(points, &boundary, 400.0, 400.0, 2);

        assert_eq!(relaxed.len(), 200);
        for p in &relaxed {
            assert!(p.x >= 0.0 && p.x <= 400.0 && p.y >= 0.0 && p.y <= 400.0);
        }
        assert!(
            min_separation(&relaxed) > before,
            "Relaxation should spread clustered points apart"
        );
    }

    #[test]
    fn test_lloyd_relaxation_determinism() {
        let (points1, boundary1) = setup(150, 300.0, 300.0, "same");
        let (points2, boundary2) = setup(150, 300.0, 300.0, "same");

        let relaxed1 = lloyd_relaxation(points1, &boundary1, 300.0, 300.0, 2);
        let relaxed2 = lloyd_relaxation(points2, &boundary2, 300.0, 300.0, 2);

        assert_eq!(relaxed1, relaxed2);
    }

    #[test]
    fn test_uniform_grid_is_stable() {
        // A perfect grid is already centroidal; relaxation must leave it in place
        let (width, height, cols) = (160.0, 160.0, 10);
        let spacing = width / cols as f32;
        let mut points = Vec::new();
        for row in 0..cols {
            for col in 0..cols {
                points.push(Vec2::new(
                    (col as f32 + 0.5) * spacing,
                    (row as f32 + 0.5) * spacing,
                ));
            }
        }
        let boundary = generate_boundary(
            width,
            height,
            spacing,
            1.0,
            1.0,
            &mut MapRng::for_stage(&Seed::from(3u64), Stage::Boundary),
        );

        let relaxed = lloyd_relaxation(points.clone(), &boundary, width, height, 2);
        let (third, displacement) = relax_once(&relaxed, &boundary, width, height);

        assert!(displacement < 1e-3, "Third iteration moved a point by {}", displacement);
        for (original, settled) in points.iter().zip(&third) {
            assert!(original.distance(*settled) < 1e-3);
        }
    }

    #[test]
    fn test_lloyd_early_exit() {
        let (points, boundary) = setup(100, 200.0, 200.0, "converge");
        let options = LloydOptions {
            max_iterations: 20,
            convergence_threshold: 0.5,
        };
        let reports = std::cell::Cell::new(0usize);
        let count = |_: f32| reports.set(reports.get() + 1);
        let relaxed =
            lloyd_relaxation_with_options(points, &boundary, 200.0, 200.0, options, Some(&count));

        assert_eq!(relaxed.len(), 100);
        assert!(reports.get() < 20, "A loose threshold should stop early");
    }

    #[test]
    fn test_lloyd_options_default() {
        let options = LloydOptions::default();
        assert_eq!(options.max_iterations, 2);
        assert_eq!(options.convergence_threshold, 0.0);
    }

    #[test]
    fn test_zero_iterations_and_empty_input() {
        let (points, boundary) = setup(50, 200.0, 200.0, "noop");
        let unchanged = lloyd_relaxation(points.clone(), &boundary, 200.0, 200.0, 0);
        assert_eq!(unchanged, points);

        assert!(lloyd_relaxation(Vec::new(), &boundary, 200.0, 200.0, 2).is_empty());
    }
}
