//! Signed distance to the coastline
//!
//! Multi-source breadth-first search from every coastline cell. Land cells
//! count up from 1 at the shore, water cells count down from -1.

use std::collections::VecDeque;

use crate::cell::Cell;

/// A land cell with a water neighbor, or a water cell with a land neighbor
pub fn is_coastline(cells: &[Cell], id: usize) -> bool {
    let land = cells[id].is_land;
    cells[id].neighbors.iter().any(|&n| cells[n].is_land != land)
}

/// Fill `coast_distance` for every cell
///
/// Cells with no path to a coastline (a map that is all land or all water)
/// get `cells.len() + 1`, negated for water.
pub fn compute_coast_distance(cells: &mut [Cell]) {
    let count = cells.len();
    let mut steps = vec![u32::MAX; count];
    let mut queue = VecDeque::new();

    for id in 0..count {
        if is_coastline(cells, id) {
            steps[id] = 0;
            queue.push_back(id);
        }
    }

    while let Some(current) = queue.pop_front() {
        let next = steps[current] + 1;
        for &neighbor in &cells[current].neighbors {
            if steps[neighbor] == u32::MAX {
                steps[neighbor] = next;
                queue.push_back(neighbor);
            }
        }
    }

    let unreachable = count as i32 + 1;
    for (cell, step) in cells.iter_mut().zip(steps) {
        let magnitude = if step == u32::MAX {
            unreachable
        } else {
            step as i32 + 1
        };
        cell.coast_distance = if cell.is_land { magnitude } else { -magnitude };
    }
}
