//! Sequential/parallel execution helpers
//!
//! Every helper takes a `parallel` flag and produces the same result either
//! way: work is split over indices whose outputs never alias, so the rayon
//! schedule cannot change what gets written.

use rayon::prelude::*;

/// Compute `f(i)` for every index in `0..len`, in index order
pub fn map_indexed<T, F>(parallel: bool, len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}

/// Apply `f(i, &mut item)` to every element
pub fn for_each_mut<T, F>(parallel: bool, items: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    if parallel {
        items.par_iter_mut().enumerate().for_each(|(i, item)| f(i, item));
    } else {
        items.iter_mut().enumerate().for_each(|(i, item)| f(i, item));
    }
}

/// Fill a row-major `width x height` raster with `f(x, y)`
///
/// Rows are the unit of parallel work.
pub fn fill_raster<F>(parallel: bool, width: usize, height: usize, f: F) -> Vec<f32>
where
    F: Fn(usize, usize) -> f32 + Sync + Send,
{
    let mut raster = vec![0.0f32; width * height];
    if width == 0 {
        return raster;
    }

    let fill_row = |(y, row): (usize, &mut [f32])| {
        for (x, value) in row.iter_mut().enumerate() {
            *value = f(x, y);
        }
    };

    if parallel {
        raster.par_chunks_mut(width).enumerate().for_each(fill_row);
    } else {
        raster.chunks_mut(width).enumerate().for_each(fill_row);
    }
    raster
}

/// Run two closures, concurrently when `parallel` is set
///
/// Blocks until both finish and returns both results.
pub fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if parallel {
        rayon::join(a, b)
    } else {
        let ra = a();
        let rb = b();
        (ra, rb)
    }
}
