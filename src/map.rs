//! MapData, the immutable result of a generation run

use std::collections::HashSet;

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::cell::Cell;
use crate::config::MapConfig;
use crate::error::{MapGenError, Result};
use crate::hydrology::{Feature, River};
use crate::rng::Seed;
use crate::spatial::SpatialIndex;
use crate::terrain::HeightmapTemplate;

/// A generated map
///
/// Owns every product of the pipeline. Nothing mutates it after
/// construction; regenerating produces a new value.
///
/// # Examples
///
/// ```
/// use voronoi_mapgen::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42u64)
///     .cell_count(300)
///     .unwrap()
///     .size(256, 256)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = generate(&config).unwrap();
/// assert_eq!(map.cell_count(), 300);
///
/// let cell = map.cell(0).unwrap();
/// println!("Cell 0 at {:?} has {} neighbors", cell.position, cell.neighbor_count());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone)]
pub struct MapData {
    config: MapConfig,
    points: Vec<Vec2>,
    boundary_points: Vec<Vec2>,
    cells: Vec<Cell>,
    triangles: Vec<[usize; 3]>,
    voronoi_triangles: Vec<[usize; 3]>,
    heightmap: Vec<f32>,
    resolved_heights: Vec<f32>,
    features: Vec<Feature>,
    rivers: Vec<River>,
    template: Option<HeightmapTemplate>,
    #[cfg_attr(feature = "serde", serde(skip))]
    spatial_index: SpatialIndex,
}

/// Everything the pipeline hands over to build a [`MapData`]
#[derive(Debug, Default)]
pub(crate) struct MapParts {
    pub points: Vec<Vec2>,
    pub boundary_points: Vec<Vec2>,
    pub cells: Vec<Cell>,
    pub triangles: Vec<[usize; 3]>,
    pub voronoi_triangles: Vec<[usize; 3]>,
    pub heightmap: Vec<f32>,
    pub resolved_heights: Vec<f32>,
    pub features: Vec<Feature>,
    pub rivers: Vec<River>,
    pub template: Option<HeightmapTemplate>,
}

impl MapData {
    /// Assemble a map and build its spatial index
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailed` if the per-cell arrays disagree in length
    /// or the heightmap does not cover the map.
    pub(crate) fn assemble(config: MapConfig, parts: MapParts) -> Result<Self> {
        let n = parts.cells.len();
        if parts.points.len() != n || parts.resolved_heights.len() != n {
            return Err(MapGenError::GenerationFailed(format!(
                "{} cells, {} points and {} resolved heights",
                n,
                parts.points.len(),
                parts.resolved_heights.len()
            )));
        }
        if parts.heightmap.len() != config.pixel_count() {
            return Err(MapGenError::GenerationFailed(format!(
                "heightmap has {} pixels, expected {}",
                parts.heightmap.len(),
                config.pixel_count()
            )));
        }

        let spatial_index = SpatialIndex::new(&parts.points);

        Ok(Self {
            config,
            points: parts.points,
            boundary_points: parts.boundary_points,
            cells: parts.cells,
            triangles: parts.triangles,
            voronoi_triangles: parts.voronoi_triangles,
            heightmap: parts.heightmap,
            resolved_heights: parts.resolved_heights,
            features: parts.features,
            rivers: parts.rivers,
            template: parts.template,
            spatial_index,
        })
    }

    /// Configuration this map was generated from
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> &Seed {
        &self.config.seed
    }

    /// Map width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Map height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Generator points, indexed by cell id
    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Synthetic padding ring used while triangulating
    #[inline]
    pub fn boundary_points(&self) -> &[Vec2] {
        &self.boundary_points
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get a cell by ID
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` if the id is out of range.
    pub fn cell(&self, id: usize) -> Result<&Cell> {
        self.cells.get(id).ok_or(MapGenError::CellNotFound(id))
    }

    /// Triangulation of the generator points alone, for wireframe display
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Triangulation of the generator points followed by the boundary ring
    ///
    /// Indices at or above `cell_count()` refer to `boundary_points()`.
    #[inline]
    pub fn voronoi_triangles(&self) -> &[[usize; 3]] {
        &self.voronoi_triangles
    }

    /// Row-major `width x height` raster of heights in `[0, 1]`
    #[inline]
    pub fn heightmap(&self) -> &[f32] {
        &self.heightmap
    }

    /// Height at a pixel, `None` outside the map
    pub fn height_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.config.width || y >= self.config.height {
            return None;
        }
        self.heightmap
            .get(y as usize * self.config.width as usize + x as usize)
            .copied()
    }

    /// Depression-free heights used by hydrology, indexed by cell id
    #[inline]
    pub fn resolved_heights(&self) -> &[f32] {
        &self.resolved_heights
    }

    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[inline]
    pub fn rivers(&self) -> &[River] {
        &self.rivers
    }

    /// Template that shaped the heightmap, `None` in freeform mode
    #[inline]
    pub fn template(&self) -> Option<HeightmapTemplate> {
        self.template
    }

    /// Get neighbor IDs for a cell
    ///
    /// Returns an empty slice if the cell ID is invalid.
    pub fn neighbors(&self, cell_id: usize) -> &[usize] {
        self.cells
            .get(cell_id)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Find the cell whose generator point is nearest to `position`
    ///
    /// Returns `None` for an empty map.
    pub fn find_cell_at(&self, position: Vec2) -> Option<usize> {
        self.spatial_index.find_nearest(position)
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// Includes the center cell. Returns an empty vec if `center_id` is
    /// invalid. The result is sorted by id.
    pub fn find_cells_within_radius(&self, center_id: usize, hops: usize) -> Vec<usize> {
        if center_id >= self.cells.len() {
            return vec![];
        }

        let mut visited = HashSet::new();
        let mut current = vec![center_id];
        visited.insert(center_id);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell_id in &current {
                for &neighbor in self.neighbors(cell_id) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            current = next;
        }

        let mut found: Vec<usize> = visited.into_iter().collect();
        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigBuilder;
    use crate::pipeline::generate;

    fn map() -> MapData {
        let config = MapConfigBuilder::new()
            .seed("map-data")
            .cell_count(400)
            .unwrap()
            .size(256, 256)
            .unwrap()
            .build()
            .unwrap();
        generate(&config).unwrap()
    }

    #[test]
    fn test_accessors() {
        let map = map();
        assert_eq!(map.cell_count(), 400);
        assert_eq!(map.points().len(), 400);
        assert_eq!((map.width(), map.height()), (256, 256));
        assert_eq!(map.heightmap().len(), 256 * 256);
        assert_eq!(map.resolved_heights().len(), 400);
        assert_eq!(map.seed(), &Seed::from("map-data"));
        assert!(map.template().is_none());
        assert!(map.height_at(255, 255).is_some());
        assert!(map.height_at(256, 0).is_none());
    }

    #[test]
    fn test_cell_lookup() {
        let map = map();
        assert_eq!(map.cell(5).unwrap().id, 5);
        assert!(matches!(map.cell(400), Err(MapGenError::CellNotFound(400))));
        assert!(map.neighbors(999_999).is_empty());
    }

    #[test]
    fn test_find_cell_at() {
        let map = map();
        for id in [0, 17, 399] {
            let position = map.cell(id).unwrap().position;
            assert_eq!(map.find_cell_at(position), Some(id));
        }
    }

    #[test]
    fn test_find_cells_within_radius() {
        let map = map();

        let r0 = map.find_cells_within_radius(0, 0);
        assert_eq!(r0, vec![0]);

        let r1 = map.find_cells_within_radius(0, 1);
        assert_eq!(r1.len(), 1 + map.neighbors(0).len());

        let r2 = map.find_cells_within_radius(0, 2);
        assert!(r2.len() > r1.len());

        assert!(map.find_cells_within_radius(999_999, 5).is_empty());
    }

    #[test]
    fn test_assemble_rejects_mismatched_parts() {
        let config = MapConfigBuilder::new()
            .cell_count(0)
            .unwrap()
            .size(128, 128)
            .unwrap()
            .build()
            .unwrap();
        let parts = MapParts {
            points: vec![Vec2::ZERO],
            ..Default::default()
        };
        assert!(matches!(
            MapData::assemble(config, parts),
            Err(MapGenError::GenerationFailed(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_map_serializes() {
        let json = serde_json::to_string(&map()).unwrap();
        assert!(json.contains("\"cells\""));
        assert!(json.contains("\"rivers\""));
        assert!(!json.contains("spatial_index"));
    }
}
