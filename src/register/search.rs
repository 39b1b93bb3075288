//! Integer correlation search and quadratic peak refinement.

use super::zncc::zncc;
use crate::raster::Window;

const CURVATURE_EPS: f64 = 1e-9;

/// Correlation scores over the integer offsets `[-radius, radius]²`.
/// Offsets where the score is undefined hold NaN.
pub(crate) struct CorrelationSurface {
    radius: i64,
    scores: Vec<f64>,
}

/// Correlate `reference` against every integer offset of the search patch.
/// The patch side must equal `reference.size + 2 * radius`. `None` when no
/// offset produced a defined score (texture-free input).
pub(crate) fn correlate(
    reference: &Window,
    patch: &Window,
    radius: usize,
) -> Option<CorrelationSurface> {
    debug_assert_eq!(patch.size, reference.size + 2 * radius);
    let span = 2 * radius + 1;
    let mut scores = vec![f64::NAN; span * span];
    let mut any = false;
    for dy in 0..span {
        for dx in 0..span {
            if let Some(score) = zncc(reference, patch, dx, dy) {
                scores[dy * span + dx] = score;
                any = true;
            }
        }
    }
    any.then_some(CorrelationSurface {
        radius: radius as i64,
        scores,
    })
}

impl CorrelationSurface {
    #[inline]
    fn idx(&self, dx: i64, dy: i64) -> usize {
        let span = 2 * self.radius + 1;
        ((dy + self.radius) * span + (dx + self.radius)) as usize
    }

    /// Score at an integer offset; NaN outside the search range.
    pub fn get(&self, dx: i64, dy: i64) -> f64 {
        if dx.abs() > self.radius || dy.abs() > self.radius {
            return f64::NAN;
        }
        self.scores[self.idx(dx, dy)]
    }

    /// Best-scoring integer offset, ignoring undefined entries.
    pub fn peak(&self) -> Option<(i64, i64, f64)> {
        let mut best: Option<(i64, i64, f64)> = None;
        for dy in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                let score = self.get(dx, dy);
                if score.is_nan() {
                    continue;
                }
                if best.map_or(true, |(_, _, b)| score > b) {
                    best = Some((dx, dy, score));
                }
            }
        }
        best
    }

    /// Per-axis 3-point quadratic interpolation around the integer peak.
    /// Returns the fractional shift, each component clamped to ±0.5; zero
    /// on degenerate curvature or missing neighbours.
    pub fn subpixel_peak(&self, dx: i64, dy: i64) -> (f64, f64) {
        (
            self.axis_shift(self.get(dx - 1, dy), self.get(dx, dy), self.get(dx + 1, dy)),
            self.axis_shift(self.get(dx, dy - 1), self.get(dx, dy), self.get(dx, dy + 1)),
        )
    }

    fn axis_shift(&self, f0: f64, f1: f64, f2: f64) -> f64 {
        if f0.is_nan() || f1.is_nan() || f2.is_nan() {
            return 0.0;
        }
        let curvature = f0 - 2.0 * f1 + f2;
        // A peak needs negative curvature.
        if curvature > -CURVATURE_EPS {
            return 0.0;
        }
        (0.5 * (f0 - f2) / curvature).clamp(-0.5, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smooth two-dimensional texture.
    fn texture(sample: f64, line: f64) -> f32 {
        let s = 0.31 * sample + 0.12 * line;
        let l = 0.23 * line - 0.08 * sample;
        (s.sin() + l.cos()) as f32
    }

    fn window_at(center_sample: f64, center_line: f64, size: usize) -> Window {
        let half = (size as i64 - 1) / 2;
        let origin_sample = center_sample.round() as i64 - half;
        let origin_line = center_line.round() as i64 - half;
        let mut win = Window::new(origin_sample, origin_line, size);
        for y in 0..size {
            for x in 0..size {
                let v = texture(
                    (origin_sample + x as i64) as f64,
                    (origin_line + y as i64) as f64,
                );
                win.set(x, y, v);
            }
        }
        win
    }

    #[test]
    fn peak_recovers_an_integer_shift() {
        let size = 15;
        let radius = 4;
        let reference = window_at(100.0, 100.0, size);
        // Patch centred 2 samples right and 1 line up of the true match.
        let patch = window_at(102.0, 99.0, size + 2 * radius);
        let surface = correlate(&reference, &patch, radius).unwrap();
        let (dx, dy, score) = surface.peak().unwrap();
        assert_eq!((dx, dy), (-2, 1));
        assert!(score > 0.99, "peak score {score:.4}");
    }

    #[test]
    fn subpixel_shift_is_zero_at_a_symmetric_peak() {
        let size = 15;
        let radius = 3;
        let reference = window_at(50.0, 50.0, size);
        let patch = window_at(50.0, 50.0, size + 2 * radius);
        let surface = correlate(&reference, &patch, radius).unwrap();
        let (dx, dy, _) = surface.peak().unwrap();
        assert_eq!((dx, dy), (0, 0));
        let (fx, fy) = surface.subpixel_peak(dx, dy);
        assert!(fx.abs() < 0.15 && fy.abs() < 0.15, "shift ({fx:.3}, {fy:.3})");
    }

    #[test]
    fn border_peak_yields_no_subpixel_shift_beyond_half_a_pixel() {
        let size = 11;
        let radius = 2;
        let reference = window_at(80.0, 80.0, size);
        let patch = window_at(84.0, 80.0, size + 2 * radius);
        let surface = correlate(&reference, &patch, radius).unwrap();
        let (dx, _dy, _) = surface.peak().unwrap();
        // The true offset (-4) lies outside the search range, so the peak
        // saturates at the border.
        assert_eq!(dx, -(radius as i64));
        let (fx, fy) = surface.subpixel_peak(dx, 0);
        assert!(fx.abs() <= 0.5 && fy.abs() <= 0.5);
    }
}
