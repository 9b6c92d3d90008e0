//! Priority-Flood depression filling on the cell graph
//!
//! Produces a separate resolved-height array in which every land cell has a
//! strictly descending path to water or to the map border. Original cell
//! heights are left untouched.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::cell::Cell;

/// Minimum rise per step away from an outlet
pub const DEPRESSION_EPSILON: f32 = 1e-5;

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    height: f32,
    id: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Min-heap by height, then by id, via reversed ordering
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .height
            .total_cmp(&self.height)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Compute resolved heights with epsilon Priority-Flood
///
/// Water cells and border cells are outlets and keep their height. Every
/// other cell is raised to at least `resolved(parent) + epsilon`, where the
/// parent is the neighbor it was reached from. Regions with no outlet at all
/// drain through their lowest cell.
pub fn resolve_depressions(cells: &[Cell]) -> Vec<f32> {
    let count = cells.len();
    let mut resolved: Vec<f32> = cells.iter().map(|c| c.height).collect();
    let mut visited = vec![false; count];
    let mut heap = BinaryHeap::with_capacity(count);

    for cell in cells {
        if cell.is_water() || cell.is_border {
            visited[cell.id] = true;
            heap.push(HeapItem {
                height: resolved[cell.id],
                id: cell.id,
            });
        }
    }

    let mut raised = 0usize;
    loop {
        while let Some(HeapItem { id, .. }) = heap.pop() {
            let floor = resolved[id] + DEPRESSION_EPSILON;
            for &neighbor in &cells[id].neighbors {
                if visited[neighbor] {
                    continue;
                }
                visited[neighbor] = true;
                if resolved[neighbor] < floor {
                    resolved[neighbor] = floor;
                    raised += 1;
                }
                heap.push(HeapItem {
                    height: resolved[neighbor],
                    id: neighbor,
                });
            }
        }

        // Components without water or border cells drain through their lowest cell
        let lowest = (0..count)
            .filter(|&id| !visited[id])
            .min_by(|&a, &b| resolved[a].total_cmp(&resolved[b]).then(a.cmp(&b)));
        match lowest {
            Some(id) => {
                log::trace!("Seeding isolated region from cell {}", id);
                visited[id] = true;
                heap.push(HeapItem {
                    height: resolved[id],
                    id,
                });
            }
            None => break,
        }
    }

    log::debug!("Depression filling raised {} of {} cells", raised, count);
    resolved
}

/// Follow the steepest strictly-descending neighbor from `start`
///
/// Returns the number of steps taken to reach a cell for which `is_outlet`
/// holds, or `None` if the walk gets stuck.
pub fn steps_to_outlet(
    cells: &[Cell],
    resolved: &[f32],
    start: usize,
    is_outlet: impl Fn(usize) -> bool,
) -> Option<usize> {
    let mut current = start;
    for steps in 0..=cells.len() {
        if is_outlet(current) {
            return Some(steps);
        }
        current = cells[current]
            .neighbors
            .iter()
            .copied()
            .filter(|&n| resolved[n] < resolved[current])
            .min_by(|&a, &b| resolved[a].total_cmp(&resolved[b]).then(a.cmp(&b)))?;
    }
    None
}
