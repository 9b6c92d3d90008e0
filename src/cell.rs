//! Map cell structure
//!
//! Represents one Voronoi cell of the map with geometry, neighbors, terrain,
//! hydrology, climate and render attributes.

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::TerrainColor;

/// A single Voronoi cell of the map
///
/// Cells live in one array owned by [`MapData`](crate::MapData) and refer to
/// each other only by index, so the whole graph can be shared read-only
/// across threads and serialized without cycles.
///
/// # Memory Usage
///
/// Approximate size per cell:
/// - scalar fields and colors: ~64 bytes
/// - neighbors: ~48 bytes (`Vec<usize>` with ~6 neighbors avg)
/// - vertices: ~48 bytes (`Vec<Vec2>` with ~6 vertices avg)
/// - **Total: ~160 bytes per cell**
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Index of this cell in the cell array (0 to cell_count-1)
    pub id: usize,

    /// Generator point of the cell
    pub position: Vec2,

    /// Boundary polygon, counter-clockwise and clipped to the map rectangle
    ///
    /// Holds at least 3 vertices, or none at all for a degenerate cell.
    pub vertices: Vec<Vec2>,

    /// IDs of adjacent cells, sorted ascending
    ///
    /// Two cells are neighbors when their generator points share a Delaunay
    /// edge.
    pub neighbors: Vec<usize>,

    /// Normalized elevation in `[0, 1]`
    pub height: f32,

    /// `height > water_level`, forced to true on the map border
    pub is_land: bool,

    /// Cell touches the map boundary and was raised by the border enforcer
    pub is_border: bool,

    /// Index into the map's feature list, once features are detected
    pub feature_id: Option<usize>,

    /// Signed hop distance to the coastline
    ///
    /// Land cells count up from 1 at the shore, water cells count down from
    /// -1. Zero until the distance field runs.
    pub coast_distance: i32,

    /// Biome classification, 0 means "use the height color"
    pub biome_id: u8,

    /// Moisture quantized to `[0, 255]`
    pub precipitation: u8,

    /// Height-banded fallback color
    pub height_color: TerrainColor,

    /// Final color, written once by the last pipeline stage
    pub render_color: TerrainColor,
}

impl Cell {
    /// Create a cell with geometry only
    ///
    /// This is typically called during generation, not by user code.
    pub fn new(id: usize, position: Vec2, neighbors: Vec<usize>, vertices: Vec<Vec2>) -> Self {
        Self {
            id,
            position,
            vertices,
            neighbors,
            height: 0.0,
            is_land: false,
            is_border: false,
            feature_id: None,
            coast_distance: 0,
            biome_id: 0,
            precipitation: 0,
            height_color: [0.0; 4],
            render_color: [0.0; 4],
        }
    }

    /// Get the number of neighboring cells
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this cell is a neighbor of another cell
    #[inline]
    pub fn is_neighbor_of(&self, other_cell_id: usize) -> bool {
        self.neighbors.binary_search(&other_cell_id).is_ok()
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// A cell whose polygon collapsed during clipping
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    #[inline]
    pub fn is_water(&self) -> bool {
        !self.is_land
    }

    /// Area of the boundary polygon
    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices).abs()
    }

    /// Area-weighted centroid of the boundary polygon
    pub fn centroid(&self) -> Option<Vec2> {
        polygon_centroid(&self.vertices)
    }

    /// Euclidean distance between generator points
    pub fn distance_to(&self, other: &Cell) -> f32 {
        self.position.distance(other.position)
    }
}

/// Signed shoelace area, positive for counter-clockwise polygons
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        twice_area += a.perp_dot(b);
    }
    twice_area * 0.5
}

/// Centroid of a polygon with the usual degenerate fallbacks
///
/// Uses the shoelace centroid when the polygon has at least 3 vertices and a
/// non-negligible area, otherwise the plain vertex average. Returns `None`
/// for an empty polygon.
pub fn polygon_centroid(vertices: &[Vec2]) -> Option<Vec2> {
    if vertices.is_empty() {
        return None;
    }

    let area = polygon_area(vertices);
    if vertices.len() >= 3 && area.abs() > 1e-6 {
        let mut sum = Vec2::ZERO;
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            sum += (*a + b) * a.perp_dot(b);
        }
        let centroid = sum / (6.0 * area);
        if centroid.is_finite() {
            return Some(centroid);
        }
    }

    let sum: Vec2 = vertices.iter().copied().sum();
    Some(sum / vertices.len() as f32)
}
