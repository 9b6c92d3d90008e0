//! Heightmap templates
//!
//! A template is a fixed recipe of primitive shaping operations applied to
//! the cell graph. Coordinates in a recipe are fractions of the map size and
//! heights are in the normalized `[0, 1]` range.

use std::collections::VecDeque;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

use crate::cell::Cell;
use crate::rng::MapRng;
use crate::spatial::SpatialIndex;

/// Named heightmap archetypes
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeightmapTemplate {
    /// One tall central island with ridges
    #[default]
    HighIsland,
    /// A single gentle central island
    LowIsland,
    /// Two large landmasses split by a sea
    Continents,
    /// Many small islands
    Archipelago,
    /// A ring island around a lagoon
    Atoll,
    /// Land reaching in from the bottom edge
    Peninsula,
    /// One huge landmass
    Pangea,
    /// Land around a central inland sea
    Mediterranean,
}

/// A `[min, max]` range used by recipe steps
type Span = (f32, f32);

/// Primitive shaping operations
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Raise a blob: `count` times, peak `height`, centered in the x/y spans
    Hill {
        count: (i32, i32),
        height: Span,
        x: Span,
        y: Span,
    },
    /// Lower a blob
    Pit {
        count: (i32, i32),
        height: Span,
        x: Span,
        y: Span,
    },
    /// Raise a ridge between two random points
    Range {
        count: (i32, i32),
        height: Span,
        x: Span,
        y: Span,
    },
    /// Lower a valley between two random points
    Trough {
        count: (i32, i32),
        height: Span,
        x: Span,
        y: Span,
    },
    /// Add a constant everywhere
    Add(f32),
    /// Multiply every height
    Multiply(f32),
    /// Blend every height toward its neighborhood mean
    Smooth(f32),
    /// Fade heights toward the map edges
    Mask(f32),
}

use Step::*;

const CENTER: Span = (0.4, 0.6);
const WIDE: Span = (0.15, 0.85);
const FULL: Span = (0.05, 0.95);

const HIGH_ISLAND: &[Step] = &[
    Hill { count: (1, 1), height: (0.8, 0.9), x: CENTER, y: CENTER },
    Add(0.05),
    Range { count: (2, 3), height: (0.3, 0.4), x: (0.25, 0.75), y: (0.25, 0.75) },
    Hill { count: (3, 5), height: (0.2, 0.3), x: (0.2, 0.8), y: (0.2, 0.8) },
    Trough { count: (1, 2), height: (0.15, 0.25), x: (0.2, 0.8), y: (0.2, 0.8) },
    Smooth(0.5),
    Mask(0.8),
    Pit { count: (1, 2), height: (0.1, 0.2), x: (0.3, 0.7), y: (0.3, 0.7) },
];

const LOW_ISLAND: &[Step] = &[
    Hill { count: (1, 1), height: (0.6, 0.7), x: CENTER, y: CENTER },
    Hill { count: (4, 6), height: (0.1, 0.2), x: (0.3, 0.7), y: (0.3, 0.7) },
    Smooth(0.6),
    Mask(0.9),
    Multiply(0.85),
];

const CONTINENTS: &[Step] = &[
    Hill { count: (2, 2), height: (0.6, 0.7), x: (0.15, 0.35), y: (0.3, 0.7) },
    Hill { count: (2, 2), height: (0.6, 0.7), x: (0.65, 0.85), y: (0.3, 0.7) },
    Range { count: (3, 4), height: (0.3, 0.45), x: (0.1, 0.9), y: (0.2, 0.8) },
    Trough { count: (2, 3), height: (0.2, 0.3), x: (0.45, 0.55), y: (0.1, 0.9) },
    Hill { count: (5, 7), height: (0.1, 0.2), x: WIDE, y: WIDE },
    Smooth(0.5),
    Mask(0.6),
];

const ARCHIPELAGO: &[Step] = &[
    Add(0.1),
    Hill { count: (10, 14), height: (0.35, 0.5), x: (0.1, 0.9), y: (0.1, 0.9) },
    Trough { count: (4, 6), height: (0.15, 0.25), x: WIDE, y: WIDE },
    Pit { count: (3, 5), height: (0.1, 0.2), x: WIDE, y: WIDE },
    Smooth(0.4),
    Mask(0.5),
];

const ATOLL: &[Step] = &[
    Hill { count: (1, 1), height: (0.75, 0.8), x: (0.45, 0.55), y: (0.45, 0.55) },
    Pit { count: (1, 1), height: (0.5, 0.55), x: (0.48, 0.52), y: (0.48, 0.52) },
    Hill { count: (2, 4), height: (0.05, 0.1), x: (0.3, 0.7), y: (0.3, 0.7) },
    Smooth(0.4),
    Mask(0.9),
];

const PENINSULA: &[Step] = &[
    Hill { count: (1, 1), height: (0.7, 0.8), x: (0.3, 0.7), y: (0.75, 0.9) },
    Range { count: (2, 2), height: (0.3, 0.4), x: (0.4, 0.6), y: (0.3, 0.8) },
    Hill { count: (3, 5), height: (0.2, 0.3), x: (0.3, 0.7), y: (0.4, 0.9) },
    Smooth(0.5),
    Mask(0.3),
];

const PANGEA: &[Step] = &[
    Hill { count: (3, 3), height: (0.6, 0.75), x: (0.3, 0.7), y: (0.3, 0.7) },
    Add(0.05),
    Range { count: (4, 6), height: (0.3, 0.45), x: (0.2, 0.8), y: (0.2, 0.8) },
    Hill { count: (6, 10), height: (0.1, 0.2), x: (0.15, 0.85), y: (0.15, 0.85) },
    Smooth(0.5),
    Mask(0.5),
];

const MEDITERRANEAN: &[Step] = &[
    Add(0.55),
    Pit { count: (1, 1), height: (0.5, 0.6), x: CENTER, y: CENTER },
    Trough { count: (2, 3), height: (0.2, 0.3), x: (0.3, 0.7), y: (0.3, 0.7) },
    Hill { count: (4, 6), height: (0.1, 0.2), x: FULL, y: FULL },
    Range { count: (1, 2), height: (0.15, 0.25), x: FULL, y: FULL },
    Smooth(0.5),
];

/// Blob height below which spreading stops
const SPREAD_CUTOFF: f32 = 0.01;

impl HeightmapTemplate {
    /// All templates, in a fixed order
    pub const ALL: [HeightmapTemplate; 8] = [
        HeightmapTemplate::HighIsland,
        HeightmapTemplate::LowIsland,
        HeightmapTemplate::Continents,
        HeightmapTemplate::Archipelago,
        HeightmapTemplate::Atoll,
        HeightmapTemplate::Peninsula,
        HeightmapTemplate::Pangea,
        HeightmapTemplate::Mediterranean,
    ];

    /// Get a human-readable name for this template
    pub fn name(self) -> &'static str {
        match self {
            HeightmapTemplate::HighIsland => "High Island",
            HeightmapTemplate::LowIsland => "Low Island",
            HeightmapTemplate::Continents => "Continents",
            HeightmapTemplate::Archipelago => "Archipelago",
            HeightmapTemplate::Atoll => "Atoll",
            HeightmapTemplate::Peninsula => "Peninsula",
            HeightmapTemplate::Pangea => "Pangea",
            HeightmapTemplate::Mediterranean => "Mediterranean",
        }
    }

    /// Draw a template uniformly
    pub fn random(rng: &mut MapRng) -> Self {
        let last = Self::ALL.len() as i32 - 1;
        Self::ALL[rng.next_int(0, last) as usize]
    }

    fn recipe(self) -> &'static [Step] {
        match self {
            HeightmapTemplate::HighIsland => HIGH_ISLAND,
            HeightmapTemplate::LowIsland => LOW_ISLAND,
            HeightmapTemplate::Continents => CONTINENTS,
            HeightmapTemplate::Archipelago => ARCHIPELAGO,
            HeightmapTemplate::Atoll => ATOLL,
            HeightmapTemplate::Peninsula => PENINSULA,
            HeightmapTemplate::Pangea => PANGEA,
            HeightmapTemplate::Mediterranean => MEDITERRANEAN,
        }
    }

    /// Shape per-cell heights
    ///
    /// # Arguments
    ///
    /// * `rng` - Template-stage generator
    /// * `cells` - Cell graph (positions and neighbors are read)
    /// * `width`, `height` - Map size
    ///
    /// # Returns
    ///
    /// One height in `[0, 1]` per cell
    pub fn shape(self, rng: &mut MapRng, cells: &[Cell], width: f32, height: f32) -> Vec<f32> {
        let positions: Vec<Vec2> = cells.iter().map(|c| c.position).collect();
        let mut shaper = Shaper {
            cells,
            index: SpatialIndex::new(&positions),
            heights: vec![0.0; cells.len()],
            size: Vec2::new(width, height),
            blob_decay: blob_decay(cells.len()),
            line_decay: line_decay(cells.len()),
        };

        if cells.is_empty() {
            return shaper.heights;
        }

        for step in self.recipe() {
            shaper.apply(*step, rng);
        }

        shaper.heights
    }
}

impl fmt::Display for HeightmapTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-hop decay of hills and pits
///
/// A blob falls to 2% of its peak after roughly a quarter of the map's
/// width in hops.
fn blob_decay(cell_count: usize) -> f32 {
    let hops = 0.25 * (cell_count.max(1) as f32).sqrt();
    0.02f32.powf(1.0 / hops).clamp(0.3, 0.93)
}

/// Per-ring decay of ranges and troughs
fn line_decay(cell_count: usize) -> f32 {
    let hops = 0.1 * (cell_count.max(1) as f32).sqrt();
    0.02f32.powf(1.0 / hops).clamp(0.3, 0.9)
}

struct Shaper<'a> {
    cells: &'a [Cell],
    index: SpatialIndex,
    heights: Vec<f32>,
    size: Vec2,
    blob_decay: f32,
    line_decay: f32,
}

impl Shaper<'_> {
    fn apply(&mut self, step: Step, rng: &mut MapRng) {
        match step {
            Hill { count, height, x, y } => {
                for _ in 0..rng.next_int(count.0, count.1) {
                    self.blob(rng, height, x, y, 1.0);
                }
            }
            Pit { count, height, x, y } => {
                for _ in 0..rng.next_int(count.0, count.1) {
                    self.blob(rng, height, x, y, -1.0);
                }
            }
            Range { count, height, x, y } => {
                for _ in 0..rng.next_int(count.0, count.1) {
                    self.line(rng, height, x, y, 1.0);
                }
            }
            Trough { count, height, x, y } => {
                for _ in 0..rng.next_int(count.0, count.1) {
                    self.line(rng, height, x, y, -1.0);
                }
            }
            Add(value) => {
                for h in &mut self.heights {
                    *h = (*h + value).clamp(0.0, 1.0);
                }
            }
            Multiply(factor) => {
                for h in &mut self.heights {
                    *h = (*h * factor).clamp(0.0, 1.0);
                }
            }
            Smooth(strength) => self.smooth(strength),
            Mask(strength) => self.mask(strength),
        }
    }

    fn random_point(&self, rng: &mut MapRng, x: Span, y: Span) -> Vec2 {
        Vec2::new(
            rng.next_range(x.0, x.1) * self.size.x,
            rng.next_range(y.0, y.1) * self.size.y,
        )
    }

    fn nearest_cell(&self, point: Vec2) -> usize {
        self.index.find_nearest(point).unwrap_or(0)
    }

    /// Spread a hill (sign 1) or pit (sign -1) outward by breadth-first search
    fn blob(&mut self, rng: &mut MapRng, height: Span, x: Span, y: Span, sign: f32) {
        let peak = rng.next_range(height.0, height.1);
        let start = self.nearest_cell(self.random_point(rng, x, y));

        let mut change = vec![0.0f32; self.cells.len()];
        change[start] = peak;
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for &neighbor in &self.cells[current].neighbors {
                if change[neighbor] > 0.0 {
                    continue;
                }
                let value = change[current] * self.blob_decay * rng.next_range(0.9, 1.1);
                if value < SPREAD_CUTOFF {
                    continue;
                }
                change[neighbor] = value;
                queue.push_back(neighbor);
            }
        }

        for (h, delta) in self.heights.iter_mut().zip(&change) {
            *h = (*h + sign * delta).clamp(0.0, 1.0);
        }
    }

    /// Raise a ridge (sign 1) or cut a valley (sign -1) between two points
    fn line(&mut self, rng: &mut MapRng, height: Span, x: Span, y: Span, sign: f32) {
        let peak = rng.next_range(height.0, height.1);
        let from = self.random_point(rng, x, y);

        // Pick an end point far enough away to form a line
        let min_length = self.size.x.min(self.size.y) / 8.0;
        let mut to = self.random_point(rng, x, y);
        for _ in 0..10 {
            if from.distance(to) >= min_length {
                break;
            }
            to = self.random_point(rng, x, y);
        }

        let start = self.nearest_cell(from);
        let end = self.nearest_cell(to);
        let target = self.cells[end].position;

        // Greedy walk toward the end cell with occasional detours
        let mut used = vec![false; self.cells.len()];
        used[start] = true;
        let mut ridge = vec![start];
        let mut current = start;
        while current != end && ridge.len() < self.cells.len() {
            let mut best: Option<(usize, f32)> = None;
            for &neighbor in &self.cells[current].neighbors {
                if used[neighbor] {
                    continue;
                }
                let mut d = self.cells[neighbor].position.distance_squared(target);
                if rng.chance(0.15) {
                    d *= 0.5;
                }
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((neighbor, d));
                }
            }
            match best {
                Some((next, _)) => {
                    used[next] = true;
                    ridge.push(next);
                    current = next;
                }
                None => break,
            }
        }

        // Spread ring by ring away from the ridge
        let mut change = vec![0.0f32; self.cells.len()];
        for &cell in &ridge {
            change[cell] = peak * rng.next_range(0.85, 1.15);
        }
        let mut frontier = ridge;
        let mut level = peak;
        while !frontier.is_empty() {
            level *= self.line_decay;
            if level < SPREAD_CUTOFF {
                break;
            }
            let mut next = Vec::new();
            for &cell in &frontier {
                for &neighbor in &self.cells[cell].neighbors {
                    if used[neighbor] {
                        continue;
                    }
                    used[neighbor] = true;
                    change[neighbor] = level * rng.next_range(0.85, 1.15);
                    next.push(neighbor);
                }
            }
            frontier = next;
        }

        for (h, delta) in self.heights.iter_mut().zip(&change) {
            *h = (*h + sign * delta).clamp(0.0, 1.0);
        }
    }

    fn smooth(&mut self, strength: f32) {
        let snapshot = self.heights.clone();
        for (cell, h) in self.cells.iter().zip(self.heights.iter_mut()) {
            let sum: f32 = cell.neighbors.iter().map(|&n| snapshot[n]).sum::<f32>() + snapshot[cell.id];
            let mean = sum / (cell.neighbors.len() + 1) as f32;
            *h = (*h + (mean - *h) * strength).clamp(0.0, 1.0);
        }
    }

    /// Scale heights by `(1 - nx²)(1 - ny²)`, blended by `strength`
    fn mask(&mut self, strength: f32) {
        for (cell, h) in self.cells.iter().zip(self.heights.iter_mut()) {
            let n = cell.position / self.size * 2.0 - Vec2::ONE;
            let falloff = ((1.0 - n.x * n.x) * (1.0 - n.y * n.y)).clamp(0.0, 1.0);
            *h = (*h * (1.0 - strength + strength * falloff)).clamp(0.0, 1.0);
        }
    }
}
