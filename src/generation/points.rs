//! Jittered-grid point sampling
//!
//! Lays a square grid over the map, nudges every grid center by up to 45% of
//! the spacing, shuffles the result and trims or pads it to the exact count.
//!
//! # Algorithm
//!
//! 1. spacing = sqrt(width * height / n)
//! 2. one candidate per grid square, jittered by ±0.45 * spacing
//! 3. Fisher–Yates shuffle so truncation does not favor any grid region
//! 4. truncate to n, or pad with uniform random points
//!
//! Lloyd's relaxation runs afterwards (see [`super::lloyd`]).

use glam::Vec2;
use rand::seq::SliceRandom;

use crate::rng::MapRng;

/// Jitter strength as fraction of grid spacing
const JITTER_STRENGTH: f32 = 0.45;

/// Grid spacing for `n` points over a `width x height` map
///
/// Returns 0.0 when `n == 0`.
pub fn grid_spacing(n: usize, width: f32, height: f32) -> f32 {
    if n == 0 {
        return 0.0;
    }
    (width * height / n as f32).sqrt()
}

/// Generate exactly `n` points inside `[0, width] x [0, height]`
///
/// # Arguments
///
/// * `n` - Number of points to generate
/// * `width`, `height` - Map size
/// * `rng` - Points-stage generator
///
/// # Returns
///
/// Vector of exactly `n` points (empty when `n == 0`)
pub fn generate_points(n: usize, width: f32, height: f32, rng: &mut MapRng) -> Vec<Vec2> {
    if n == 0 {
        return Vec::new();
    }

    let spacing = grid_spacing(n, width, height);
    let cols = (width / spacing).ceil().max(1.0) as usize;
    let rows = (height / spacing).ceil().max(1.0) as usize;
    let jitter = spacing * JITTER_STRENGTH;

    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let center = Vec2::new((col as f32 + 0.5) * spacing, (row as f32 + 0.5) * spacing);
            if center.x > width || center.y > height {
                continue;
            }
            let offset = Vec2::new(
                rng.next_range(-jitter, jitter),
                rng.next_range(-jitter, jitter),
            );
            points.push(clamp_to_bounds(center + offset, width, height));
        }
    }

    points.shuffle(rng);
    points.truncate(n);

    while points.len() < n {
        points.push(Vec2::new(
            rng.next_range(0.0, width),
            rng.next_range(0.0, height),
        ));
    }

    points
}

/// Clamp a point to the map rectangle
#[inline]
pub fn clamp_to_bounds(point: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(point.x.clamp(0.0, width), point.y.clamp(0.0, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{Seed, Stage};

    fn rng(seed: &str) -> MapRng {
        MapRng::for_stage(&Seed::from(seed), Stage::Points)
    }

    #[test]
    fn test_exact_count() {
        for n in [1, 2, 7, 100, 500, 1234] {
            let points = generate_points(n, 512.0, 384.0, &mut rng("count"));
            assert_eq!(points.len(), n, "Expected exactly {} points", n);
        }
    }

    #[test]
    fn test_zero_points() {
        assert!(generate_points(0, 512.0, 512.0, &mut rng("zero")).is_empty());
        assert_eq!(grid_spacing(0, 512.0, 512.0), 0.0);
    }

    #[test]
    fn test_points_in_bounds() {
        let points = generate_points(800, 300.0, 200.0, &mut rng("bounds"));
        for p in &points {
            assert!(p.x >= 0.0 && p.x <= 300.0, "x out of bounds: {:?}", p);
            assert!(p.y >= 0.0 && p.y <= 200.0, "y out of bounds: {:?}", p);
        }
    }

    #[test]
    fn test_determinism() {
        let a = generate_points(300, 512.0, 512.0, &mut rng("same"));
        let b = generate_points(300, 512.0, 512.0, &mut rng("same"));
        assert_eq!(a, b);

        let c = generate_points(300, 512.0, 512.0, &mut rng("different"));
        assert_ne!(a, c);
    }

    #[test]
    fn test_jitter_stays_near_grid() {
        // With a square grid each point stays within 0.45 spacing of a center
        let n = 64;
        let spacing = grid_spacing(n, 256.0, 256.0);
        let points = generate_points(n, 256.0, 256.0, &mut rng("jitter"));
        for p in &points {
            let col = (p.x / spacing - 0.5).round();
            let row = (p.y / spacing - 0.5).round();
            let center = Vec2::new((col + 0.5) * spacing, (row + 0.5) * spacing);
            let d = (*p - center).abs();
            assert!(d.x <= spacing * JITTER_STRENGTH + 1e-3);
            assert!(d.y <= spacing * JITTER_STRENGTH + 1e-3);
        }
    }
}
