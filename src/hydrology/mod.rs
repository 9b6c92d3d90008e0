//! Hydrology: water bodies, coast distances, drainage and rivers
//!
//! Stages run in a fixed order on the cell array:
//! features, coast distance, lakes, then depression filling. Rivers and
//! their polylines are built afterwards from the resolved heights.

mod depressions;
mod distance;
mod features;
mod lakes;
mod river_path;
mod rivers;

pub use depressions::{resolve_depressions, steps_to_outlet, DEPRESSION_EPSILON};
pub use distance::{compute_coast_distance, is_coastline};
pub use features::{detect_features, Feature, FeatureKind};
pub use lakes::{process_lakes, LAKE_TO_OCEAN_SHARE, MIN_OCEAN_CELLS};
pub use river_path::{build_river_path, build_river_paths, chaikin};
pub use rivers::{generate_rivers, river_sources, river_width, River, RiverMouth};

use std::time::Instant;

use crate::cell::Cell;
use crate::error::{MapGenError, Result};

/// Output of the hydrology stages that precede river generation
#[derive(Debug, Clone, Default)]
pub struct Hydrology {
    pub features: Vec<Feature>,
    /// Depression-free heights, one per cell
    pub resolved_heights: Vec<f32>,
}

/// Run feature detection, coast distances, lake processing and depression
/// filling
///
/// Writes `feature_id` and `coast_distance` on every cell and flattens lake
/// heights.
///
/// # Errors
///
/// Returns `GenerationFailed` if the resolved heights do not cover every cell.
pub fn run_hydrology(cells: &mut [Cell]) -> Result<Hydrology> {
    let start = Instant::now();
    let mut features = detect_features(cells);
    compute_coast_distance(cells);
    let lakes = process_lakes(cells, &mut features);
    let resolved_heights = resolve_depressions(cells);

    if resolved_heights.len() != cells.len() {
        return Err(MapGenError::GenerationFailed(format!(
            "resolved {} heights for {} cells",
            resolved_heights.len(),
            cells.len()
        )));
    }

    log::debug!(
        "Hydrology: {} features ({} oceans, {} lakes) in {:?}",
        features.len(),
        features.iter().filter(|f| f.kind == FeatureKind::Ocean).count(),
        lakes,
        start.elapsed()
    );

    Ok(Hydrology {
        features,
        resolved_heights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::features::tests::grid;

    #[test]
    fn test_run_hydrology() {
        let mut cells = grid(
            6,
            6,
            "BBBBBB
             B..##B
             B####B
             B##.#B
             B####B
             BBBBBB",
            &[],
        );
        let hydrology = run_hydrology(&mut cells).unwrap();

        assert_eq!(hydrology.resolved_heights.len(), cells.len());
        assert!(cells.iter().all(|c| c.feature_id.is_some()));
        assert!(cells.iter().all(|c| c.coast_distance != 0));
        assert!(hydrology
            .features
            .iter()
            .any(|f| f.kind == FeatureKind::Ocean));
        assert!(hydrology.features.iter().any(|f| f.kind == FeatureKind::Lake));
    }
}
