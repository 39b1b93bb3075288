//! Zero-mean normalized cross-correlation between equal-size windows.

use crate::raster::Window;

const VARIANCE_EPS: f64 = 1e-12;

/// ZNCC of `reference` against the equally sized sub-window of `patch`
/// whose top-left corner sits at `(x0, y0)` in patch coordinates. `None`
/// when either window is texture-free (no variance).
pub fn zncc(reference: &Window, patch: &Window, x0: usize, y0: usize) -> Option<f64> {
    let size = reference.size;
    debug_assert!(x0 + size <= patch.size && y0 + size <= patch.size);

    let n = (size * size) as f64;
    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for y in 0..size {
        for x in 0..size {
            sum_a += reference.get(x, y) as f64;
            sum_b += patch.get(x0 + x, y0 + y) as f64;
        }
    }
    let mean_a = sum_a / n;
    let mean_b = sum_b / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for y in 0..size {
        for x in 0..size {
            let da = reference.get(x, y) as f64 - mean_a;
            let db = patch.get(x0 + x, y0 + y) as f64 - mean_b;
            cov += da * db;
            var_a += da * da;
            var_b += db * db;
        }
    }
    if var_a <= VARIANCE_EPS || var_b <= VARIANCE_EPS {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}
