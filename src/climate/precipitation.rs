//! Precipitation field

use glam::Vec2;
use rand::RngCore;

use crate::parallel;
use crate::rng::{MapRng, Seed, Stage};
use crate::terrain::{normalize, sample_perlin_2d, PerlinConfig};

/// Quantized precipitation for every position
///
/// Samples fBm at each position (the longer map side spans `[0, 1]`),
/// min-max normalizes across all cells and quantizes to `[0, 255]`. A flat
/// field quantizes to 128.
pub fn compute_precipitation(
    positions: &[Vec2],
    width: f32,
    height: f32,
    seed: &Seed,
    noise: &PerlinConfig,
    parallel: bool,
) -> Vec<u8> {
    let noise_seed = MapRng::for_stage(seed, Stage::Precipitation).next_u32();
    let scale = width.max(height).max(1.0);

    let mut values = parallel::map_indexed(parallel, positions.len(), |i| {
        sample_perlin_2d(positions[i] / scale, noise_seed, noise)
    });
    normalize(&mut values);

    values.iter().map(|v| quantize(*v)).collect()
}

/// Map `[0, 1]` to `[0, 255]`
#[inline]
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> Vec<Vec2> {
        (0..400)
            .map(|i| Vec2::new((i % 20) as f32 * 25.0, (i / 20) as f32 * 25.0))
            .collect()
    }

    #[test]
    fn test_full_range() {
        let seed = Seed::from("rain");
        let values = compute_precipitation(&positions(), 500.0, 500.0, &seed, &PerlinConfig::precipitation(), false);
        assert_eq!(values.len(), 400);
        assert_eq!(values.iter().min(), Some(&0));
        assert_eq!(values.iter().max(), Some(&255));
    }

    #[test]
    fn test_deterministic_and_thread_independent() {
        let seed = Seed::from(77u64);
        let noise = PerlinConfig::precipitation();
        let a = compute_precipitation(&positions(), 500.0, 500.0, &seed, &noise, true);
        let b = compute_precipitation(&positions(), 500.0, 500.0, &seed, &noise, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_flat_field() {
        let single = [Vec2::new(10.0, 10.0)];
        let values = compute_precipitation(&single, 100.0, 100.0, &Seed::from(1u64), &PerlinConfig::precipitation(), false);
        assert_eq!(values, vec![128]);
        assert!(compute_precipitation(&[], 100.0, 100.0, &Seed::from(1u64), &PerlinConfig::precipitation(), false).is_empty());
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(0.5), 128);
        assert_eq!(quantize(2.0), 255);
    }
}
