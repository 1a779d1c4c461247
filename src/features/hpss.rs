//! Harmonic/percussive soft masking
//!
//! Keeps a per-bin EMA of the whitened spectrum as the harmonic estimate;
//! the positive residual is the percussive part. The emitted weight
//! `(H / (H + p + eps))^gamma` is close to 1 for stationary bins and close
//! to 0 for transient spikes. Fresh state deliberately starts dark: the
//! mask is small on the first frame and rises as the EMA accumulates.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation Using Median
//! Filtering. *Proceedings of the International Conference on Digital
//! Audio Effects (DAFx)*. The streaming EMA form here trades the median
//! filter for per-bin recursive averaging so the mask is causal.

/// Numerical stability epsilon
const EPSILON: f32 = 1e-6;

/// Elapsed wall-clock time is clamped to this; larger gaps are treated as
/// a pause, not a step, so stale frames nudge rather than replace state.
const MAX_DT_MS: f64 = 1000.0;

/// Per-bin harmonic EMA and soft-mask generator
pub struct HarmonicMask {
    tc_ms: f32,
    gamma: f32,
    h: Vec<f32>,
    last_ts_ms: Option<f64>,
}

impl HarmonicMask {
    /// Create a mask stage with the given EMA time constant and exponent
    pub fn new(tc_ms: f32, gamma: f32) -> Self {
        Self {
            tc_ms,
            gamma,
            h: Vec::new(),
            last_ts_ms: None,
        }
    }

    /// Update the harmonic estimate from `spec` and write the soft mask
    ///
    /// The EMA is advanced exactly once per call with
    /// `alpha = 1 - exp(-dt / tau)`, `tau = max(20, tc_ms)`. Every mask
    /// value lies in [0, 1].
    pub fn apply(&mut self, spec: &[f32], wall_ms: f64, mask_out: &mut Vec<f32>) {
        let n = spec.len();
        if self.h.len() != n {
            self.h.clear();
            self.h.resize(n, 0.0);
        }
        mask_out.clear();
        mask_out.resize(n, 0.0);

        let dt_ms = match self.last_ts_ms {
            Some(prev) => (wall_ms - prev).clamp(0.0, MAX_DT_MS),
            None => 0.0,
        };
        self.last_ts_ms = Some(wall_ms);

        let tau = f64::from(self.tc_ms.max(20.0));
        let alpha = (1.0 - (-dt_ms / tau).exp()) as f32;

        for (i, &x) in spec.iter().enumerate() {
            let h = (1.0 - alpha) * self.h[i] + alpha * x;
            let p = (x - h).max(0.0);
            self.h[i] = h;
            mask_out[i] = (h / (h + p + EPSILON)).powf(self.gamma);
        }
    }

    /// Clear the EMA and timestamp
    pub fn reset(&mut self) {
        self.h.clear();
        self.last_ts_ms = None;
    }
}
