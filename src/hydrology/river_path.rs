//! River polylines for rendering
//!
//! Turns a river's cell path into a meandering polyline: a jittered midpoint
//! between consecutive cell centers, then Chaikin corner cutting.

use glam::Vec2;

use crate::cell::Cell;
use crate::rng::{MapRng, Seed, Stage};

use super::rivers::River;

/// Largest lateral midpoint offset, as a fraction of the segment length
pub const MEANDER: f32 = 0.25;

/// Rounds of Chaikin smoothing
pub const SMOOTHING_ROUNDS: usize = 2;

/// Build the polyline for one cell path
pub fn build_river_path(
    cells: &[Cell],
    river_cells: &[usize],
    width: f32,
    height: f32,
    rng: &mut MapRng,
) -> Vec<Vec2> {
    let centers: Vec<Vec2> = river_cells.iter().map(|&id| cells[id].position).collect();
    if centers.len() < 2 {
        return centers;
    }

    let mut points = Vec::with_capacity(centers.len() * 2);
    points.push(centers[0]);
    for pair in centers.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let segment = b - a;
        let offset = segment.perp().normalize_or_zero()
            * segment.length()
            * rng.next_range(-MEANDER, MEANDER);
        points.push((a + b) * 0.5 + offset);
        points.push(b);
    }

    for _ in 0..SMOOTHING_ROUNDS {
        points = chaikin(&points);
    }

    let max = Vec2::new(width, height);
    points.iter().map(|p| p.clamp(Vec2::ZERO, max)).collect()
}

/// One round of Chaikin corner cutting, keeping both endpoints
pub fn chaikin(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut smoothed = Vec::with_capacity(points.len() * 2);
    smoothed.push(points[0]);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        smoothed.push(a.lerp(b, 0.25));
        smoothed.push(a.lerp(b, 0.75));
    }
    if let Some(&last) = points.last() {
        smoothed.push(last);
    }
    smoothed
}

/// Build polylines for every river, in river order, from one river-path stream
pub fn build_river_paths(
    cells: &[Cell],
    rivers: &[River],
    width: f32,
    height: f32,
    seed: &Seed,
) -> Vec<Vec<Vec2>> {
    let mut rng = MapRng::for_stage(seed, Stage::RiverPaths);
    rivers
        .iter()
        .map(|river| build_river_path(cells, &river.cells, width, height, &mut rng))
        .collect()
}
