//! Spatial indexing for fast position-to-cell lookups
//!
//! With the `spatial-index` feature the lookup is backed by a kiddo KD-tree.
//! Without it, the same API falls back to a linear scan.

use glam::Vec2;

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

/// Nearest-generator lookup over cell positions
///
/// Provides O(log n) nearest-neighbor lookups to convert map positions into
/// cell IDs. Used to rebuild the raster heightmap from template heights and
/// by [`MapData::find_cell_at`](crate::MapData::find_cell_at).
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n) with the `spatial-index` feature, O(n) without
/// - Memory: ~16 bytes per cell
#[derive(Clone)]
pub struct SpatialIndex {
    #[cfg(feature = "spatial-index")]
    tree: Option<ImmutableKdTree<f32, usize, 2, 32>>,
    #[cfg(not(feature = "spatial-index"))]
    points: Vec<Vec2>,
}

impl SpatialIndex {
    /// Build spatial index from cell positions
    ///
    /// # Arguments
    ///
    /// * `positions` - Slice of generator points, indexed by cell ID
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_mapgen::*;
    /// use glam::Vec2;
    ///
    /// let positions = vec![
    ///     Vec2::new(10.0, 10.0),
    ///     Vec2::new(90.0, 10.0),
    ///     Vec2::new(50.0, 80.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&positions);
    /// assert_eq!(index.find_nearest(Vec2::new(85.0, 20.0)), Some(1));
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn new(positions: &[Vec2]) -> Self {
        if positions.is_empty() {
            return Self { tree: None };
        }

        let points: Vec<[f32; 2]> = positions.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&points)),
        }
    }

    #[cfg(not(feature = "spatial-index"))]
    pub fn new(positions: &[Vec2]) -> Self {
        Self {
            points: positions.to_vec(),
        }
    }

    /// Find the cell whose generator point is closest to a position
    ///
    /// # Returns
    ///
    /// Cell ID of the nearest cell, or `None` for an empty index
    #[cfg(feature = "spatial-index")]
    pub fn find_nearest(&self, position: Vec2) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let query = [position.x, position.y];
        let result = tree.nearest_one::<SquaredEuclidean>(&query);
        Some(result.item)
    }

    #[cfg(not(feature = "spatial-index"))]
    pub fn find_nearest(&self, position: Vec2) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (id, point) in self.points.iter().enumerate() {
            let d = point.distance_squared(position);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").finish_non_exhaustive()
    }
}
