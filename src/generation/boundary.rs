//! Synthetic boundary padding
//!
//! A ring of extra points just outside the map rectangle. Triangulating the
//! real points together with the ring gives every real point a closed fan of
//! triangles, so edge cells get proper polygons before clipping instead of
//! long slivers reaching toward the convex hull.

use glam::Vec2;

use crate::rng::MapRng;

/// Maximum outward nudge of a ring point, as a fraction of the step
const RING_JITTER: f32 = 0.05;

/// Generate the boundary ring
///
/// The ring runs along the map rectangle inflated by `spacing * padding_scale`
/// on every side, with points roughly `spacing * step_scale` apart. Each
/// point is pushed outward by up to 5% of the step so ring points are never
/// exactly collinear.
///
/// # Arguments
///
/// * `width`, `height` - Map size
/// * `spacing` - Average distance between real points
/// * `padding_scale` - Ring offset in units of `spacing`
/// * `step_scale` - Ring point distance in units of `spacing`
/// * `rng` - Boundary-stage generator
///
/// # Returns
///
/// Ring points in clockwise order starting at the top-left corner, or an
/// empty vector when `spacing` is not positive
pub fn generate_boundary(
    width: f32,
    height: f32,
    spacing: f32,
    padding_scale: f32,
    step_scale: f32,
    rng: &mut MapRng,
) -> Vec<Vec2> {
    if !(spacing > 0.0) {
        return Vec::new();
    }

    let offset = spacing * padding_scale;
    let step = spacing * step_scale;
    let min = Vec2::new(-offset, -offset);
    let max = Vec2::new(width + offset, height + offset);

    // (start, end, outward normal) per side; each side excludes its end corner
    let sides = [
        (Vec2::new(min.x, min.y), Vec2::new(max.x, min.y), Vec2::NEG_Y),
        (Vec2::new(max.x, min.y), Vec2::new(max.x, max.y), Vec2::X),
        (Vec2::new(max.x, max.y), Vec2::new(min.x, max.y), Vec2::Y),
        (Vec2::new(min.x, max.y), Vec2::new(min.x, min.y), Vec2::NEG_X),
    ];

    let mut ring = Vec::new();
    for (start, end, normal) in sides {
        let length = start.distance(end);
        let count = (length / step).ceil().max(1.0) as usize;
        for i in 0..count {
            let t = i as f32 / count as f32;
            let nudge = rng.next_range(0.0, RING_JITTER * step);
            ring.push(start.lerp(end, t) + normal * nudge);
        }
    }

    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{Seed, Stage};

    fn rng() -> MapRng {
        MapRng::for_stage(&Seed::from(5u64), Stage::Boundary)
    }

    #[test]
    fn test_ring_lies_outside_map() {
        let ring = generate_boundary(200.0, 100.0, 10.0, 1.0, 1.0, &mut rng());
        assert!(!ring.is_empty());
        for p in &ring {
            let inside = p.x > 0.0 && p.x < 200.0 && p.y > 0.0 && p.y < 100.0;
            assert!(!inside, "Ring point {:?} lies inside the map", p);
            assert!(p.x <= -10.0 || p.x >= 210.0 || p.y <= -10.0 || p.y >= 110.0);
        }
    }

    #[test]
    fn test_ring_density_follows_step_scale() {
        let coarse = generate_boundary(200.0, 200.0, 10.0, 1.0, 2.0, &mut rng());
        let fine = generate_boundary(200.0, 200.0, 10.0, 1.0, 0.5, &mut rng());
        // Perimeter 880, so 44 points at step 20 and 176 at step 5
        assert_eq!(coarse.len(), 44);
        assert_eq!(fine.len(), 176);
    }

    #[test]
    fn test_ring_is_deterministic() {
        let a = generate_boundary(128.0, 128.0, 8.0, 1.0, 1.0, &mut rng());
        let b = generate_boundary(128.0, 128.0, 8.0, 1.0, 1.0, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_ring_without_spacing() {
        assert!(generate_boundary(128.0, 128.0, 0.0, 1.0, 1.0, &mut rng()).is_empty());
    }
}
