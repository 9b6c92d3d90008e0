//! Lake reclassification and flattening

use crate::cell::Cell;

use super::features::{Feature, FeatureKind};

/// A lake covering at least this share of all cells is treated as ocean
pub const LAKE_TO_OCEAN_SHARE: f32 = 0.05;

/// An ocean with fewer cells than this is treated as a lake
pub const MIN_OCEAN_CELLS: usize = 3;

/// Reclassify water features and flatten every lake
///
/// - Large enclosed water bodies become oceans, tiny border-reaching ones
///   become lakes.
/// - If water exists but no ocean survived, the largest water feature (lowest
///   id on ties) becomes the ocean.
/// - Every lake member is set to the lake's highest member height, which is
///   recorded as the lake's `surface_height`.
///
/// Returns the number of lakes.
pub fn process_lakes(cells: &mut [Cell], features: &mut [Feature]) -> usize {
    let total = cells.len();

    for feature in features.iter_mut() {
        match feature.kind {
            // Size overrides reachability: an inland sea cut off from the
            // border by land is still a sea, not a lake
            FeatureKind::Lake if feature.size() as f32 >= LAKE_TO_OCEAN_SHARE * total as f32 => {
                feature.kind = FeatureKind::Ocean;
            }
            FeatureKind::Ocean if feature.size() < MIN_OCEAN_CELLS => {
                feature.kind = FeatureKind::Lake;
            }
            _ => {}
        }
    }

    if !features.iter().any(|f| f.kind == FeatureKind::Ocean) {
        let largest = features
            .iter()
            .filter(|f| f.is_water())
            .fold(None::<&Feature>, |best, f| match best {
                Some(b) if b.size() >= f.size() => Some(b),
                _ => Some(f),
            })
            .map(|f| f.id);
        if let Some(id) = largest {
            log::debug!("No ocean found, promoting water feature {} to ocean", id);
            features[id].kind = FeatureKind::Ocean;
        }
    }

    let mut lakes = 0;
    for feature in features.iter_mut() {
        if feature.kind != FeatureKind::Lake {
            feature.surface_height = None;
            continue;
        }

        let surface = feature
            .cells
            .iter()
            .map(|&id| cells[id].height)
            .fold(f32::MIN, f32::max);
        for &id in &feature.cells {
            cells[id].height = surface;
        }
        feature.surface_height = Some(surface);
        lakes += 1;
    }

    lakes
}
