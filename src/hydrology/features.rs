//! Connected region labeling
//!
//! Flood-fills the cell graph into maximal same-class components: land
//! components become landmasses, water components become oceans when they
//! reach the border ring and lakes otherwise.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Kind of a connected region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Ocean,
    Lake,
    Landmass,
}

impl FeatureKind {
    pub fn is_water(self) -> bool {
        !matches!(self, FeatureKind::Landmass)
    }
}

/// A maximal connected region of land or water cells
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Index into the feature list
    pub id: usize,
    pub kind: FeatureKind,
    /// Member cell ids, in flood-fill order
    pub cells: Vec<usize>,
    /// Land: contains a border cell. Water: adjacent to one.
    pub touches_border: bool,
    /// Flattened water surface, lakes only
    pub surface_height: Option<f32>,
}

impl Feature {
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_water(&self) -> bool {
        self.kind.is_water()
    }
}

/// Label every cell with a feature and return the features in discovery order
///
/// Components are discovered by scanning cell ids in ascending order, so the
/// result depends only on the graph and the land mask.
pub fn detect_features(cells: &mut [Cell]) -> Vec<Feature> {
    let mut label: Vec<Option<usize>> = vec![None; cells.len()];
    let mut features = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..cells.len() {
        if label[start].is_some() {
            continue;
        }

        let id = features.len();
        let land = cells[start].is_land;
        let mut members = Vec::new();
        let mut touches_border = false;

        label[start] = Some(id);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            members.push(current);
            let cell = &cells[current];
            if land && cell.is_border {
                touches_border = true;
            }

            for &neighbor in &cell.neighbors {
                let other = &cells[neighbor];
                if other.is_land != land {
                    if !land && other.is_border {
                        touches_border = true;
                    }
                    continue;
                }
                if label[neighbor].is_none() {
                    label[neighbor] = Some(id);
                    queue.push_back(neighbor);
                }
            }
        }

        let kind = match (land, touches_border) {
            (true, _) => FeatureKind::Landmass,
            (false, true) => FeatureKind::Ocean,
            (false, false) => FeatureKind::Lake,
        };

        features.push(Feature {
            id,
            kind,
            cells: members,
            touches_border,
            surface_height: None,
        });
    }

    for (cell, feature_id) in cells.iter_mut().zip(label) {
        cell.feature_id = feature_id;
    }

    features
}
