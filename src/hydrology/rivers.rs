//! River tracing over resolved heights
//!
//! Sources are visited from the highest resolved height down. Each surviving
//! source follows the steepest strictly-descending neighbor until it reaches
//! water, the map border, or an earlier river.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

use crate::cell::Cell;
use crate::rng::MapRng;

/// Minimum height above the water level for a river source
pub const SOURCE_MIN_ELEVATION: f32 = 0.1;
/// Minimum coast distance for a river source
pub const SOURCE_MIN_COAST_DISTANCE: i32 = 2;
/// Survival probability of a source at `river_density == 1`
pub const SOURCE_SURVIVAL: f32 = 0.35;
/// Shorter traces are discarded
pub const MIN_RIVER_CELLS: usize = 3;

const BASE_WIDTH: f32 = 1.0;
const WIDTH_PER_SQRT_FLUX: f32 = 0.5;

/// Where a river ends
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiverMouth {
    /// Flows into an ocean or lake cell (the last cell of the path)
    Water,
    /// Leaves the map through a border cell (the last cell of the path)
    MapEdge,
    /// Joins an earlier river at the last cell of the path
    Confluence,
}

/// A traced river
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct River {
    /// Index into the river list
    pub id: usize,
    /// Cell path from source to mouth
    pub cells: Vec<usize>,
    /// Smoothed polyline for rendering, filled by the river path builder
    pub path: Vec<Vec2>,
    pub mouth: RiverMouth,
    /// River this one flows into, for confluences
    pub parent: Option<usize>,
    /// Cells drained, including every tributary
    pub flux: f32,
    pub width: f32,
}

impl River {
    #[inline]
    pub fn source(&self) -> Option<usize> {
        self.cells.first().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// River width for an accumulated flux
pub fn river_width(flux: f32) -> f32 {
    BASE_WIDTH + WIDTH_PER_SQRT_FLUX * flux.max(0.0).sqrt()
}

/// Candidate river sources, highest resolved height first (ties by id)
pub fn river_sources(cells: &[Cell], resolved: &[f32], water_level: f32) -> Vec<usize> {
    let mut sources: Vec<usize> = cells
        .iter()
        .filter(|c| {
            c.is_land
                && !c.is_border
                && c.coast_distance >= SOURCE_MIN_COAST_DISTANCE
                && resolved[c.id] >= water_level + SOURCE_MIN_ELEVATION
        })
        .map(|c| c.id)
        .collect();

    sources.sort_by(|&a, &b| resolved[b].total_cmp(&resolved[a]).then(a.cmp(&b)));
    sources
}

enum Trace {
    Reached(Vec<usize>, RiverMouth, Option<usize>),
    DeadEnd,
}

/// Walk downhill from `source`
///
/// Each step goes to the lowest strictly lower neighbor, so the path is
/// acyclic and at most `cells.len()` long.
fn trace(cells: &[Cell], resolved: &[f32], owner: &[Option<usize>], source: usize) -> Trace {
    // Strict descent never revisits a cell, so no visited set is needed
    let mut path = vec![source];
    let mut current = source;

    loop {
        let next = cells[current]
            .neighbors
            .iter()
            .copied()
            .filter(|&n| resolved[n] < resolved[current])
            .min_by(|&a, &b| resolved[a].total_cmp(&resolved[b]).then(a.cmp(&b)));

        let Some(next) = next else {
            return Trace::DeadEnd;
        };
        path.push(next);
        current = next;

        if cells[next].is_water() {
            return Trace::Reached(path, RiverMouth::Water, None);
        }
        if let Some(parent) = owner[next] {
            return Trace::Reached(path, RiverMouth::Confluence, Some(parent));
        }
        if cells[next].is_border {
            return Trace::Reached(path, RiverMouth::MapEdge, None);
        }
    }
}

/// Generate rivers
///
/// # Arguments
///
/// * `cells` - Cells with land, border and coast distance finalized
/// * `resolved` - Resolved heights from the depression resolver
/// * `water_level` - Land threshold
/// * `density` - Source survival multiplier, 0 disables rivers
/// * `rng` - Rivers-stage generator
pub fn generate_rivers(
    cells: &[Cell],
    resolved: &[f32],
    water_level: f32,
    density: f32,
    rng: &mut MapRng,
) -> Vec<River> {
    if density <= 0.0 || cells.is_empty() {
        return Vec::new();
    }

    let survival = (SOURCE_SURVIVAL * density).min(1.0);
    let mut owner: Vec<Option<usize>> = vec![None; cells.len()];
    let mut rivers: Vec<River> = Vec::new();
    let mut dead_ends = 0usize;

    for source in river_sources(cells, resolved, water_level) {
        if owner[source].is_some() {
            continue;
        }
        if !rng.chance(survival) {
            continue;
        }

        let (path, mouth, parent) = match trace(cells, resolved, &owner, source) {
            Trace::Reached(path, mouth, parent) => (path, mouth, parent),
            Trace::DeadEnd => {
                dead_ends += 1;
                log::trace!("River from cell {} dead-ends, discarded", source);
                continue;
            }
        };
        if path.len() < MIN_RIVER_CELLS {
            continue;
        }

        let id = rivers.len();
        for &cell in &path[..path.len() - 1] {
            owner[cell] = Some(id);
        }

        // Drained cells flow through every downstream river
        let flux = (path.len() - 1) as f32;
        let mut downstream = parent;
        while let Some(p) = downstream {
            rivers[p].flux += flux;
            downstream = rivers[p].parent;
        }

        rivers.push(River {
            id,
            cells: path,
            path: Vec::new(),
            mouth,
            parent,
            flux,
            width: 0.0,
        });
    }

    for river in &mut rivers {
        river.width = river_width(river.flux);
    }

    log::debug!(
        "Traced {} rivers ({} confluences, {} dead ends discarded)",
        rivers.len(),
        rivers.iter().filter(|r| r.mouth == RiverMouth::Confluence).count(),
        dead_ends
    );
    rivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::depressions::resolve_depressions;
    use crate::hydrology::distance::compute_coast_distance;
    use crate::hydrology::features::tests::grid;
    use crate::rng::{Seed, Stage};

    fn rng() -> MapRng {
        MapRng::for_stage(&Seed::from("rivers"), Stage::Rivers)
    }

    /// A 7x7 island sloping down to a water column on the left
    fn slope() -> Vec<Cell> {
        let mut heights = vec![0.0; 49];
        for row in 0..7 {
            for col in 0..7 {
                heights[row * 7 + col] = 0.3 + col as f32 * 0.1;
            }
        }
        let mut cells = grid(
            7,
            7,
            "BBBBBBB
             B.####B
             B.####B
             B.####B
             B.####B
             B.####B
             BBBBBBB",
            &heights,
        );
        for cell in &mut cells {
            if cell.is_water() {
                cell.height = 0.2;
            }
        }
        compute_coast_distance(&mut cells);
        cells
    }

    #[test]
    fn test_rivers_flow_downhill_to_water() {
        let cells = slope();
        let resolved = resolve_depressions(&cells);
        let rivers = generate_rivers(&cells, &resolved, 0.35, 100.0, &mut rng());

        assert!(!rivers.is_empty());
        for river in &rivers {
            assert!(river.len() >= MIN_RIVER_CELLS);
            for pair in river.cells.windows(2) {
                assert!(cells[pair[0]].is_neighbor_of(pair[1]));
                assert!(resolved[pair[1]] < resolved[pair[0]]);
            }
            let last = river.cells[river.len() - 1];
            match river.mouth {
                RiverMouth::Water => assert!(cells[last].is_water()),
                RiverMouth::MapEdge => assert!(cells[last].is_border),
                RiverMouth::Confluence => {
                    let parent = &rivers[river.parent.unwrap()];
                    assert!(parent.cells.contains(&last));
                }
            }
        }
    }

    #[test]
    fn test_zero_density_disables_rivers() {
        let cells = slope();
        let resolved = resolve_depressions(&cells);
        assert!(generate_rivers(&cells, &resolved, 0.35, 0.0, &mut rng()).is_empty());
    }

    #[test]
    fn test_sources_are_sorted_and_interior() {
        let cells = slope();
        let resolved = resolve_depressions(&cells);
        let sources = river_sources(&cells, &resolved, 0.35);

        assert!(!sources.is_empty());
        for pair in sources.windows(2) {
            assert!(resolved[pair[0]] >= resolved[pair[1]]);
        }
        for &id in &sources {
            assert!(!cells[id].is_border);
            assert!(cells[id].coast_distance >= SOURCE_MIN_COAST_DISTANCE);
        }
    }

    #[test]
    fn test_sources_use_resolved_heights() {
        let cells = slope();
        let mut resolved = resolve_depressions(&cells);
        // Row 3: col 3 is high on the original surface, col 4 is low
        let (high, low) = (3 * 7 + 3, 3 * 7 + 4);
        let before = river_sources(&cells, &resolved, 0.35);
        assert!(before.contains(&high));

        resolved[high] = 0.4;
        let mut cells = cells;
        cells[low].height = 0.36;
        resolved[low] = 0.95;

        let after = river_sources(&cells, &resolved, 0.35);
        assert!(!after.contains(&high));
        assert!(after.contains(&low));
        assert_eq!(after[0], low);
    }

    #[test]
    fn test_trace_never_revisits_a_cell() {
        let cells = slope();
        let resolved = resolve_depressions(&cells);
        let owner = vec![None; cells.len()];
        for source in river_sources(&cells, &resolved, 0.35) {
            if let Trace::Reached(path, _, _) = trace(&cells, &resolved, &owner, source) {
                let mut seen = path.clone();
                seen.sort_unstable();
                seen.dedup();
                assert_eq!(seen.len(), path.len());
                assert!(path.len() <= cells.len());
            }
        }
    }

    #[test]
    fn test_confluence_adds_flux_downstream() {
        // Two sources on a ridge draining into a shared valley
        //   col: 0 1 2 3 4
        // row 0: B B B B B
        // row 1: B # # # B
        // row 2: B # # # B
        // row 3: B # # # B
        // row 4: B B . B B
        let heights = [
            0.9, 0.9, 0.9, 0.9, 0.9, //
            0.9, 0.8, 0.7, 0.8, 0.9, //
            0.9, 0.75, 0.6, 0.74, 0.9, //
            0.9, 0.55, 0.5, 0.7, 0.9, //
            0.9, 0.9, 0.1, 0.9, 0.9,
        ];
        let mut cells = grid(
            5,
            5,
            "BBBBB
             B###B
             B###B
             B###B
             BB.BB",
            &heights,
        );
        compute_coast_distance(&mut cells);
        let resolved = resolve_depressions(&cells);

        let mut owner = vec![None; cells.len()];
        let Trace::Reached(main, mouth, _) = trace(&cells, &resolved, &owner, 7) else {
            panic!("main river should reach water");
        };
        assert_eq!(main, vec![7, 12, 17, 22]);
        assert_eq!(mouth, RiverMouth::Water);

        for &c in &main[..3] {
            owner[c] = Some(0);
        }
        let Trace::Reached(tributary, mouth, parent) = trace(&cells, &resolved, &owner, 11) else {
            panic!("tributary should join the main river");
        };
        assert_eq!(tributary, vec![11, 16, 17]);
        assert_eq!(mouth, RiverMouth::Confluence);
        assert_eq!(parent, Some(0));
    }

    #[test]
    fn test_width_grows_with_flux() {
        assert_eq!(river_width(0.0), BASE_WIDTH);
        assert!(river_width(16.0) > river_width(4.0));
        assert!((river_width(16.0) - (BASE_WIDTH + 4.0 * WIDTH_PER_SQRT_FLUX)).abs() < 1e-6);
    }

    #[test]
    fn test_rivers_are_deterministic() {
        let cells = slope();
        let resolved = resolve_depressions(&cells);
        let a = generate_rivers(&cells, &resolved, 0.35, 1.5, &mut rng());
        let b = generate_rivers(&cells, &resolved, 0.35, 1.5, &mut rng());
        assert_eq!(a, b);
    }
}
