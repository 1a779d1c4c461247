//! Chroma smoothing
//!
//! Three stages, in order: circular neighbor smoothing with a fixed 5-tap
//! kernel, peak sharpening, and a time-constant EMA across frames. The
//! kernel operates on pitch classes modulo 12, so it is shift-invariant
//! across keys: smoothing a transposed chroma equals transposing the
//! smoothed chroma, exactly.

use super::normalize_l2;

/// 5-tap circular kernel, centered on each pitch class (offsets -2..=2)
const KERNEL: [f32; 5] = [0.10, 0.12, 0.56, 0.12, 0.10];

/// Exponent applied after neighbor smoothing
const SHARPEN_POWER: f32 = 1.35;

/// Elapsed wall-clock time beyond this is treated as a gap, not a step
const MAX_DT_MS: f64 = 1000.0;

/// Temporal chroma smoother
///
/// Owns the EMA state; its L2 norm is always 0 or 1.
pub struct ChromaSmoother {
    tc_ms: f32,
    ema: [f32; 12],
    last_ts_ms: Option<f64>,
}

impl ChromaSmoother {
    /// Create a smoother with the given EMA time constant
    pub fn new(tc_ms: f32) -> Self {
        Self {
            tc_ms,
            ema: [0.0; 12],
            last_ts_ms: None,
        }
    }

    /// Smooth one chroma frame and return the updated EMA
    pub fn smooth(&mut self, chroma: &[f32; 12], wall_ms: f64) -> [f32; 12] {
        // Circular neighbor smoothing
        let mut v = [0.0f32; 12];
        for (k, out) in v.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (j, &w) in KERNEL.iter().enumerate() {
                acc += w * chroma[(k + 10 + j) % 12];
            }
            *out = acc;
        }

        // Peak sharpening
        for x in v.iter_mut() {
            *x = x.max(0.0).powf(SHARPEN_POWER);
        }
        normalize_l2(&mut v);

        // Temporal EMA
        let dt_ms = match self.last_ts_ms {
            Some(prev) => (wall_ms - prev).clamp(0.0, MAX_DT_MS),
            None => 0.0,
        };
        self.last_ts_ms = Some(wall_ms);
        let tau = f64::from(self.tc_ms.max(10.0));
        let alpha = (1.0 - (-dt_ms / tau).exp()) as f32;
        for (e, &x) in self.ema.iter_mut().zip(v.iter()) {
            *e = (1.0 - alpha) * *e + alpha * x;
        }
        normalize_l2(&mut self.ema);
        self.ema
    }

    /// Clear the EMA and timestamp
    pub fn reset(&mut self) {
        self.ema = [0.0; 12];
        self.last_ts_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(v: &[f32; 12], by: usize) -> [f32; 12] {
        let mut out = [0.0f32; 12];
        for (k, &x) in v.iter().enumerate() {
            out[(k + by) % 12] = x;
        }
        out
    }

    fn run(frames: &[[f32; 12]]) -> [f32; 12] {
        let mut smoother = ChromaSmoother::new(220.0);
        let mut out = [0.0f32; 12];
        for (tick, frame) in frames.iter().enumerate() {
            out = smoother.smooth(frame, tick as f64 * 50.0);
        }
        out
    }

    #[test]
    fn test_kernel_is_shift_invariant() {
        let base = [0.9f32, 0.0, 0.1, 0.0, 0.5, 0.2, 0.0, 0.6, 0.0, 0.0, 0.3, 0.0];
        for shift in 1..12 {
            let rotated = rotate(&base, shift);
            // Two fresh smoothers on the same tick schedule
            let a = run(&[base, base, base]);
            let b = run(&[rotated, rotated, rotated]);
            let a_rotated = rotate(&a, shift);
            for k in 0..12 {
                assert!(
                    (a_rotated[k] - b[k]).abs() < 1e-6,
                    "shift {} broke invariance at pc {}: {} vs {}",
                    shift,
                    k,
                    a_rotated[k],
                    b[k]
                );
            }
        }
    }

    #[test]
    fn test_output_norm_is_zero_or_one() {
        let mut smoother = ChromaSmoother::new(220.0);
        let zero = [0.0f32; 12];
        let out = smoother.smooth(&zero, 0.0);
        let norm: f32 = out.iter().map(|&x| x * x).sum::<f32>().sqrt();
        assert_eq!(norm, 0.0);

        let mut tone = [0.0f32; 12];
        tone[0] = 1.0;
        smoother.smooth(&tone, 50.0);
        let out = smoother.smooth(&tone, 100.0);
        let norm: f32 = out.iter().map(|&x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sharpening_raises_contrast_over_the_kernel() {
        let mut frame = [0.08f32; 12];
        frame[5] = 0.9;
        // Peak-to-neighbor contrast after the kernel alone
        let kernel_peak = 0.56 * 0.9 + (0.12 + 0.12 + 0.10 + 0.10) * 0.08;
        let kernel_neighbor = 0.56 * 0.08 + 0.12 * (0.9 + 0.08) + (0.10 + 0.10) * 0.08;
        let kernel_ratio = kernel_peak / kernel_neighbor;

        let out = run(&[frame, frame, frame, frame]);
        let out_ratio = out[5] / out[4];
        assert!(
            out_ratio > kernel_ratio,
            "sharpening should raise peak contrast: kernel {} vs output {}",
            kernel_ratio,
            out_ratio
        );
    }

    #[test]
    fn test_ema_converges_to_steady_input() {
        let mut smoother = ChromaSmoother::new(220.0);
        let mut triad = [0.0f32; 12];
        triad[0] = 0.6;
        triad[4] = 0.6;
        triad[7] = 0.6;
        let mut last = [0.0f32; 12];
        for tick in 0..40 {
            last = smoother.smooth(&triad, tick as f64 * 50.0);
        }
        let direct = {
            let mut s = ChromaSmoother::new(220.0);
            s.smooth(&triad, 0.0);
            s.smooth(&triad, 50.0)
        };
        // Steady state and a freshly-blended frame agree in direction
        let dot: f32 = last.iter().zip(direct.iter()).map(|(a, b)| a * b).sum();
        assert!(dot > 0.999, "EMA should converge to the frame direction, dot={}", dot);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut smoother = ChromaSmoother::new(220.0);
        let mut tone = [0.0f32; 12];
        tone[3] = 1.0;
        smoother.smooth(&tone, 0.0);
        smoother.smooth(&tone, 50.0);
        smoother.reset();
        let out = smoother.smooth(&[0.0; 12], 100.0);
        assert!(out.iter().all(|&x| x == 0.0));
    }
}
