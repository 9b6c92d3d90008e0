//! Voronoi cell construction from Delaunay triangulation
//!
//! Constructs Voronoi cells by computing circumcenters of Delaunay triangles,
//! ordering them around each generator point and clipping the polygon to the
//! map rectangle.

use glam::Vec2;

use super::delaunay::circumcircle;

/// Vertices closer than this are merged when building a polygon
const VERTEX_MERGE_DISTANCE: f32 = 1e-3;

/// Vertex-triangle adjacency, indexed by point
type VertexTriangleMap = Vec<Vec<usize>>;

/// A Voronoi cell without terrain (geometry only)
///
/// This is an intermediate representation used during generation.
/// Terrain is added later to create the final [`Cell`](crate::Cell).
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    /// Unique cell identifier
    pub id: usize,
    /// Generator point
    pub position: Vec2,
    /// IDs of neighboring cells, sorted ascending
    pub neighbors: Vec<usize>,
    /// Vertices defining the cell boundary (counter-clockwise, clipped)
    pub vertices: Vec<Vec2>,
}

/// Generate Voronoi cells for the real points of a padded triangulation
///
/// # Arguments
///
/// * `points` - Real points followed by boundary padding points
/// * `triangles` - Triangulation of `points`
/// * `cell_count` - Number of real points at the front of `points`
/// * `width`, `height` - Clip rectangle
/// * `progress` - Optional callback receiving the built fraction in [0, 1]
///
/// # Returns
///
/// One raw cell per real point. Neighbors only reference real cells.
pub fn generate_cells(
    points: &[Vec2],
    triangles: &[[usize; 3]],
    cell_count: usize,
    width: f32,
    height: f32,
    progress: Option<&dyn Fn(f32)>,
) -> Vec<RawCell> {
    let cell_count = cell_count.min(points.len());
    let vertex_triangle_map = build_vertex_triangle_map(triangles, points.len());

    let circumcenters: Vec<Option<Vec2>> = triangles
        .iter()
        .map(|&[a, b, c]| {
            circumcircle(
                points[a].as_dvec2(),
                points[b].as_dvec2(),
                points[c].as_dvec2(),
            )
            .map(|(center, _)| center.as_vec2())
        })
        .collect();

    let report_every = (cell_count / 8).max(1);

    (0..cell_count)
        .map(|id| {
            let position = points[id];
            let adjacent_triangles = &vertex_triangle_map[id];

            let corners: Vec<Vec2> = adjacent_triangles
                .iter()
                .filter_map(|&tri_idx| circumcenters[tri_idx])
                .collect();

            let ordered = order_voronoi_vertices(corners, position);
            let mut vertices = clip_to_rect(&ordered, width, height);
            if vertices.len() < 3 {
                vertices.clear();
            }

            let neighbors = find_cell_neighbors(id, adjacent_triangles, triangles, cell_count);

            if let Some(report) = progress {
                if (id + 1) % report_every == 0 {
                    report((id + 1) as f32 / cell_count as f32);
                }
            }

            RawCell {
                id,
                position,
                neighbors,
                vertices,
            }
        })
        .collect()
}

/// Build map from vertex index to all triangles that include it
fn build_vertex_triangle_map(triangles: &[[usize; 3]], point_count: usize) -> VertexTriangleMap {
    let mut map: VertexTriangleMap = vec![Vec::new(); point_count];

    for (tri_idx, triangle) in triangles.iter().enumerate() {
        for &vertex_idx in triangle {
            map[vertex_idx].push(tri_idx);
        }
    }

    map
}

/// Order polygon corners counter-clockwise around the generator point and
/// merge near-duplicates
fn order_voronoi_vertices(corners: Vec<Vec2>, center: Vec2) -> Vec<Vec2> {
    let mut with_angles: Vec<(Vec2, f32)> = corners
        .into_iter()
        .map(|corner| {
            let to_corner = corner - center;
            (corner, to_corner.y.atan2(to_corner.x))
        })
        .collect();

    with_angles.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ordered: Vec<Vec2> = Vec::with_capacity(with_angles.len());
    for (corner, _) in with_angles {
        if ordered
            .last()
            .map_or(true, |last| last.distance(corner) > VERTEX_MERGE_DISTANCE)
        {
            ordered.push(corner);
        }
    }
    while ordered.len() > 1 {
        let first = ordered[0];
        match ordered.last() {
            Some(last) if last.distance(first) <= VERTEX_MERGE_DISTANCE => {
                ordered.pop();
            }
            _ => break,
        }
    }

    ordered
}

/// Sutherland–Hodgman clip of a convex polygon against `[0, w] x [0, h]`
pub fn clip_to_rect(polygon: &[Vec2], width: f32, height: f32) -> Vec<Vec2> {
    // (inside test, intersection with the clip edge)
    fn clip_edge(
        input: &[Vec2],
        inside: impl Fn(Vec2) -> bool,
        intersect: impl Fn(Vec2, Vec2) -> Vec2,
    ) -> Vec<Vec2> {
        let mut output = Vec::with_capacity(input.len() + 2);
        for (i, &current) in input.iter().enumerate() {
            let previous = input[(i + input.len() - 1) % input.len()];
            match (inside(previous), inside(current)) {
                (true, true) => output.push(current),
                (true, false) => output.push(intersect(previous, current)),
                (false, true) => {
                    output.push(intersect(previous, current));
                    output.push(current);
                }
                (false, false) => {}
            }
        }
        output
    }

    fn at_x(a: Vec2, b: Vec2, x: f32) -> Vec2 {
        let t = (x - a.x) / (b.x - a.x);
        Vec2::new(x, a.y + t * (b.y - a.y))
    }

    fn at_y(a: Vec2, b: Vec2, y: f32) -> Vec2 {
        let t = (y - a.y) / (b.y - a.y);
        Vec2::new(a.x + t * (b.x - a.x), y)
    }

    if polygon.len() < 3 {
        return Vec::new();
    }

    let mut clipped = polygon.to_vec();
    clipped = clip_edge(&clipped, |p| p.x >= 0.0, |a, b| at_x(a, b, 0.0));
    if clipped.is_empty() {
        return clipped;
    }
    clipped = clip_edge(&clipped, |p| p.x <= width, |a, b| at_x(a, b, width));
    if clipped.is_empty() {
        return clipped;
    }
    clipped = clip_edge(&clipped, |p| p.y >= 0.0, |a, b| at_y(a, b, 0.0));
    if clipped.is_empty() {
        return clipped;
    }
    clipped = clip_edge(&clipped, |p| p.y <= height, |a, b| at_y(a, b, height));

    // Clipping can produce repeated corners where the polygon touches the rectangle
    clipped.dedup_by(|a, b| a.distance(*b) <= VERTEX_MERGE_DISTANCE);
    if clipped.len() > 1 && clipped[0].distance(clipped[clipped.len() - 1]) <= VERTEX_MERGE_DISTANCE {
        clipped.pop();
    }
    clipped
}

/// Find neighbor cells through shared triangles
///
/// Every pair of corners of a triangle is a triangulation edge, so the
/// neighbors of a cell are the other corners of its triangles. Boundary
/// padding points are skipped.
fn find_cell_neighbors(
    cell_idx: usize,
    adjacent_triangles: &[usize],
    triangles: &[[usize; 3]],
    cell_count: usize,
) -> Vec<usize> {
    let mut neighbors: Vec<usize> = adjacent_triangles
        .iter()
        .flat_map(|&tri_idx| triangles[tri_idx])
        .filter(|&vertex| vertex != cell_idx && vertex < cell_count)
        .collect();

    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors
}
