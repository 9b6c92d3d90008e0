//! Border enforcement
//!
//! Forces every cell touching the map rectangle to be land so water never
//! runs off the canvas.

use glam::Vec2;

use crate::cell::Cell;

/// Distance from an edge within which a point counts as touching it
pub const BORDER_MARGIN: f32 = 0.5;

/// How far above the water level border cells are raised
pub const BORDER_LIFT: f32 = 0.01;

fn near_edge(point: Vec2, width: f32, height: f32) -> bool {
    point.x <= BORDER_MARGIN
        || point.y <= BORDER_MARGIN
        || point.x >= width - BORDER_MARGIN
        || point.y >= height - BORDER_MARGIN
}

/// Whether a cell's generator point or any polygon vertex lies on the edge
pub fn touches_border(cell: &Cell, width: f32, height: f32) -> bool {
    near_edge(cell.position, width, height)
        || cell.vertices.iter().any(|&v| near_edge(v, width, height))
}

/// Raise border cells above the water level and mark them as land
///
/// Returns the number of border cells.
pub fn enforce_border(cells: &mut [Cell], width: f32, height: f32, water_level: f32) -> usize {
    let floor = (water_level + BORDER_LIFT).min(1.0);
    let mut count = 0;

    for cell in cells.iter_mut() {
        if !touches_border(cell, width, height) {
            continue;
        }
        cell.height = cell.height.max(floor);
        cell.is_land = true;
        cell.is_border = true;
        count += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ]
    }

    #[test]
    fn test_edge_cells_become_land() {
        let mut cells = vec![
            Cell::new(0, Vec2::new(5.0, 5.0), vec![1], square(0.0, 0.0, 10.0)),
            Cell::new(1, Vec2::new(50.0, 50.0), vec![0], square(45.0, 45.0, 10.0)),
            Cell::new(2, Vec2::new(95.0, 50.0), vec![], square(90.0, 45.0, 10.0)),
        ];
        for cell in &mut cells {
            cell.height = 0.1;
        }

        let count = enforce_border(&mut cells, 100.0, 100.0, 0.35);

        assert_eq!(count, 2);
        assert!(cells[0].is_land && cells[0].is_border);
        assert!((cells[0].height - 0.36).abs() < 1e-6);
        assert!(!cells[1].is_land && !cells[1].is_border);
        assert_eq!(cells[1].height, 0.1);
        assert!(cells[2].is_border);
    }

    #[test]
    fn test_high_border_cells_keep_their_height() {
        let mut cells = vec![Cell::new(0, Vec2::new(2.0, 2.0), vec![], square(0.0, 0.0, 4.0))];
        cells[0].height = 0.9;
        enforce_border(&mut cells, 100.0, 100.0, 0.35);
        assert_eq!(cells[0].height, 0.9);
    }

    #[test]
    fn test_degenerate_cell_uses_its_position() {
        let cell = Cell::new(0, Vec2::new(0.2, 40.0), vec![], vec![]);
        assert!(touches_border(&cell, 100.0, 100.0));
        let inner = Cell::new(1, Vec2::new(40.0, 40.0), vec![], vec![]);
        assert!(!touches_border(&inner, 100.0, 100.0));
    }
}
