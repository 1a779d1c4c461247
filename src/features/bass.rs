//! Bass pitch tracking
//!
//! Computes a harmonic product spectrum over the low band of the whitened
//! bass spectrum and reduces the winning bin to a pitch class, then runs a
//! stability window: a candidate pitch class must persist for the dwell
//! time before it becomes current, and the current pitch class is released
//! after a stretch without a confirming detection.
//!
//! # Reference
//!
//! Noll, A. M. (1969). Pitch Determination of Human Speech by the Harmonic
//! Product Spectrum, the Harmonic Sum Spectrum, and a Maximum Likelihood
//! Estimate. *Proceedings of the Symposium on Computer Processing in
//! Communications*.

use crate::config::EngineConfig;
use crate::features::chroma::mapper::pitch_class_of;

/// Floor applied to harmonic factors so one empty bin cannot zero the product
const HPS_FLOOR: f32 = 1e-3;

/// Harmonic-product-spectrum bass tracker with a stability window
pub struct BassTracker {
    fft_size: usize,
    min_hz: f32,
    max_hz: f32,
    harmonics: usize,
    min_gap_bins: usize,
    peak_gate: f32,
    stable_ms: f32,
    release_ms: f32,
    current: Option<u8>,
    candidate: Option<u8>,
    candidate_since_ms: f64,
    hps: Vec<f32>,
}

impl BassTracker {
    /// Create a tracker from the engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            fft_size: config.fft_size,
            min_hz: config.bass_min_hz,
            max_hz: config.bass_max_hz,
            harmonics: config.hps_harmonics,
            min_gap_bins: config.bass_min_gap_bins,
            peak_gate: config.bass_peak_gate,
            stable_ms: config.bass_stable_ms,
            release_ms: config.bass_release_ms,
            current: None,
            candidate: None,
            candidate_since_ms: 0.0,
            hps: Vec::new(),
        }
    }

    /// Process one whitened bass spectrum and return the stable pitch class
    pub fn track(&mut self, spec: &[f32], sample_rate: f32, wall_ms: f64) -> Option<u8> {
        let detected = self.detect(spec, sample_rate);
        self.advance(detected, wall_ms)
    }

    /// The stable bass pitch class, if any
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Clear detection state; the HPS scratch keeps its capacity
    pub fn reset(&mut self) {
        self.current = None;
        self.candidate = None;
        self.candidate_since_ms = 0.0;
    }

    /// Raw per-tick detection: HPS argmax over the clamped bass band
    fn detect(&mut self, spec: &[f32], sample_rate: f32) -> Option<u8> {
        if spec.len() < 2 || sample_rate <= 0.0 {
            return None;
        }
        let hz_per_bin = sample_rate / self.fft_size as f32;
        let bin_min = ((self.min_hz / hz_per_bin).floor() as usize).max(1);
        let bin_max = ((self.max_hz / hz_per_bin).floor() as usize).min(spec.len() - 1);
        if bin_max <= bin_min + self.min_gap_bins {
            return None;
        }

        if self.hps.len() < bin_max + 1 {
            self.hps.resize(bin_max + 1, 0.0);
        }
        self.hps[..=bin_max].copy_from_slice(&spec[..=bin_max]);
        for h in 2..=self.harmonics {
            for i in bin_min..=bin_max / h {
                self.hps[i] *= spec[i * h].max(HPS_FLOOR);
            }
        }

        let mut best_i = 0usize;
        let mut best_v = 0.0f32;
        for i in bin_min..=bin_max {
            if self.hps[i] > best_v {
                best_v = self.hps[i];
                best_i = i;
            }
        }
        if best_i == 0 || best_v < self.peak_gate {
            return None;
        }
        Some(pitch_class_of(best_i as f32 * hz_per_bin))
    }

    /// Stability window over raw detections
    fn advance(&mut self, detected: Option<u8>, wall_ms: f64) -> Option<u8> {
        match detected {
            None => {
                if self.current.is_some()
                    && wall_ms - self.candidate_since_ms > f64::from(self.release_ms)
                {
                    log::debug!("bass released after missing detections");
                    self.current = None;
                }
            }
            Some(pc) => {
                if Some(pc) == self.current {
                    self.candidate_since_ms = wall_ms;
                } else if Some(pc) != self.candidate {
                    self.candidate = Some(pc);
                    self.candidate_since_ms = wall_ms;
                } else if wall_ms - self.candidate_since_ms >= f64::from(self.stable_ms) {
                    log::debug!("bass promoted to pc {}", pc);
                    self.current = self.candidate;
                }
            }
        }
        self.current
    }
}
