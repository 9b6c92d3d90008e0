//! Planar Delaunay triangulation
//!
//! Backed by `delaunator`. This module converts points to its f64 input,
//! normalizes the output triples to counter-clockwise order and drops
//! zero-area slivers, so every triangle has a circumcenter.

use delaunator::Point;
use glam::{DVec2, Vec2};

/// Circumcenter and squared radius of a triangle
///
/// Computed relative to `a` for precision. Returns `None` when the corners
/// are collinear.
pub(crate) fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> Option<(DVec2, f64)> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    if d == 0.0 {
        return None;
    }

    let ab_sq = ab.length_squared();
    let ac_sq = ac.length_squared();
    let offset = DVec2::new(
        (ac.y * ab_sq - ab.y * ac_sq) / d,
        (ab.x * ac_sq - ac.x * ab_sq) / d,
    );
    if !offset.is_finite() {
        return None;
    }

    Some((a + offset, offset.length_squared()))
}

/// Triangulate a point set
///
/// # Arguments
///
/// * `points` - Input points (real points followed by any boundary padding)
/// * `progress` - Optional callback receiving the completed fraction in [0, 1]
///
/// # Returns
///
/// Counter-clockwise index triples into `points`, covering the convex hull.
/// Fewer than three points, or an entirely collinear input, produce no
/// triangles.
pub fn triangulate(points: &[Vec2], progress: Option<&dyn Fn(f32)>) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        if let Some(report) = progress {
            report(1.0);
        }
        return Vec::new();
    }

    let coords: Vec<Point> = points
        .iter()
        .map(|p| Point {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    if let Some(report) = progress {
        report(0.1);
    }

    let triangulation = delaunator::triangulate(&coords);
    if let Some(report) = progress {
        report(0.9);
    }

    let triangles: Vec<[usize; 3]> = triangulation
        .triangles
        .chunks_exact(3)
        .filter_map(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]];
            let (pa, pb, pc) = (&coords[a], &coords[b], &coords[c]);
            let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
            if cross > 0.0 {
                Some([a, b, c])
            } else if cross < 0.0 {
                Some([a, c, b])
            } else {
                None
            }
        })
        .collect();

    if triangles.is_empty() {
        log::warn!("Triangulation of {} points produced no triangles", n);
    } else {
        log::trace!(
            "Triangulated {} points into {} triangles ({} hull points)",
            n,
            triangles.len(),
            triangulation.hull.len()
        );
    }
    if let Some(report) = progress {
        report(1.0);
    }

    triangles
}
