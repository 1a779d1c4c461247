//! Configuration parameters for the realtime analysis engine

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine configuration parameters
///
/// Immutable after construction; `Engine::new` validates every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // Spectral geometry
    /// FFT size used for bin-to-frequency math (default: 4096)
    ///
    /// The engine never computes a transform itself; this only anchors the
    /// frequency of bin `i` at `i * sample_rate / fft_size`.
    pub fft_size: usize,

    /// Bin radius of the whitening envelope box filter (default: 25)
    pub whiten_half_window: usize,

    /// Denominator guard for envelope normalization (default: 1e-6)
    pub whiten_eps: f32,

    // Chroma band
    /// Lowest frequency folded into chroma, in Hz (default: 55.0)
    pub f_min: f32,

    /// Highest frequency folded into chroma, in Hz (default: 5500.0)
    pub f_max: f32,

    /// Masked magnitudes below this are ignored by the chroma fold (default: 0.02)
    pub chroma_mag_gate: f32,

    // Bass band
    /// Lower edge of the bass search band, in Hz (default: 30.0)
    pub bass_min_hz: f32,

    /// Upper edge of the bass search band, in Hz (default: 280.0)
    pub bass_max_hz: f32,

    /// Number of harmonics folded into the harmonic product spectrum (default: 4)
    pub hps_harmonics: usize,

    /// Minimum usable width of the bass band in bins (default: 8)
    ///
    /// If the clamped band is narrower than this the tick reports no bass.
    pub bass_min_gap_bins: usize,

    /// HPS peaks below this value are ignored (default: 0.02)
    pub bass_peak_gate: f32,

    // Time constants and dwell windows (wall-clock driven)
    /// Temporal EMA time constant for chroma smoothing, in ms (default: 220.0)
    pub chroma_tc_ms: f32,

    /// EMA time constant of the harmonic spectrum estimate, in ms (default: 110.0)
    pub harmonic_tc_ms: f32,

    /// Exponent of the harmonic/percussive soft mask (default: 1.8)
    pub hpss_gamma: f32,

    /// Dwell time before a new chord label is promoted, in ms (default: 320.0)
    pub chord_stable_ms: f32,

    /// Dwell time before a new bass pitch class is promoted, in ms (default: 280.0)
    pub bass_stable_ms: f32,

    /// Time without a confirming detection before the bass is released, in ms (default: 900.0)
    pub bass_release_ms: f32,

    // Tempo estimation (media-clock driven)
    /// Minimum gap between onsets, in seconds (default: 0.12)
    pub onset_refractory_s: f32,

    /// Lower edge of the reported BPM range (default: 70.0)
    pub bpm_min: f32,

    /// Upper edge of the reported BPM range (default: 180.0)
    pub bpm_max: f32,

    /// Length of the frame-energy history ring (default: 90)
    pub energy_history_len: usize,

    /// Onset threshold is `mean + k * std` over the energy ring (default: 2.0)
    pub onset_std_k: f32,

    // Confidence mapping
    /// Template score mapped to confidence 0.0 (default: 0.20)
    pub conf_low: f32,

    /// Template score span mapped onto the confidence interval (default: 0.80)
    pub conf_span: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            whiten_half_window: 25,
            whiten_eps: 1e-6,
            f_min: 55.0,
            f_max: 5500.0,
            chroma_mag_gate: 0.02,
            bass_min_hz: 30.0,
            bass_max_hz: 280.0,
            hps_harmonics: 4,
            bass_min_gap_bins: 8,
            bass_peak_gate: 0.02,
            chroma_tc_ms: 220.0,
            harmonic_tc_ms: 110.0,
            hpss_gamma: 1.8,
            chord_stable_ms: 320.0,
            bass_stable_ms: 280.0,
            bass_release_ms: 900.0,
            onset_refractory_s: 0.12,
            bpm_min: 70.0,
            bpm_max: 180.0,
            energy_history_len: 90,
            onset_std_k: 2.0,
            conf_low: 0.20,
            conf_span: 0.80,
        }
    }
}

impl EngineConfig {
    /// Validate configuration ranges
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` naming the offending field if:
    /// - any float option is non-finite
    /// - `fft_size` is not a power of two >= 512
    /// - a dwell or time-constant field is negative
    /// - a frequency band is empty or starts at or below 0 Hz
    /// - a gate, guard, or span that divides or thresholds is not positive
    /// - the energy history cannot cover the onset warmup
    pub fn validate(&self) -> Result<(), EngineError> {
        let floats: [(&'static str, f32); 18] = [
            ("whiten_eps", self.whiten_eps),
            ("f_min", self.f_min),
            ("f_max", self.f_max),
            ("chroma_mag_gate", self.chroma_mag_gate),
            ("bass_min_hz", self.bass_min_hz),
            ("bass_max_hz", self.bass_max_hz),
            ("bass_peak_gate", self.bass_peak_gate),
            ("chroma_tc_ms", self.chroma_tc_ms),
            ("harmonic_tc_ms", self.harmonic_tc_ms),
            ("hpss_gamma", self.hpss_gamma),
            ("chord_stable_ms", self.chord_stable_ms),
            ("bass_stable_ms", self.bass_stable_ms),
            ("bass_release_ms", self.bass_release_ms),
            ("onset_refractory_s", self.onset_refractory_s),
            ("bpm_min", self.bpm_min),
            ("bpm_max", self.bpm_max),
            ("onset_std_k", self.onset_std_k),
            ("conf_low", self.conf_low),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {}", value)));
            }
        }
        if !self.conf_span.is_finite() || self.conf_span <= 0.0 {
            return Err(invalid(
                "conf_span",
                format!("must be a positive finite span, got {}", self.conf_span),
            ));
        }

        if self.fft_size < 512 || !self.fft_size.is_power_of_two() {
            return Err(invalid(
                "fft_size",
                format!("must be a power of two >= 512, got {}", self.fft_size),
            ));
        }

        let dwell: [(&'static str, f32); 6] = [
            ("chroma_tc_ms", self.chroma_tc_ms),
            ("harmonic_tc_ms", self.harmonic_tc_ms),
            ("chord_stable_ms", self.chord_stable_ms),
            ("bass_stable_ms", self.bass_stable_ms),
            ("bass_release_ms", self.bass_release_ms),
            ("onset_refractory_s", self.onset_refractory_s),
        ];
        for (field, value) in dwell {
            if value < 0.0 {
                return Err(invalid(field, format!("must be >= 0, got {}", value)));
            }
        }

        if self.whiten_eps <= 0.0 {
            return Err(invalid(
                "whiten_eps",
                format!("must be > 0, got {}", self.whiten_eps),
            ));
        }
        if self.hpss_gamma <= 0.0 {
            return Err(invalid(
                "hpss_gamma",
                format!("must be > 0, got {}", self.hpss_gamma),
            ));
        }
        if self.f_min <= 0.0 || self.f_min >= self.f_max {
            return Err(invalid(
                "f_min",
                format!(
                    "chroma band must satisfy 0 < f_min < f_max, got {}..{}",
                    self.f_min, self.f_max
                ),
            ));
        }
        if self.bass_min_hz <= 0.0 || self.bass_min_hz >= self.bass_max_hz {
            return Err(invalid(
                "bass_min_hz",
                format!(
                    "bass band must satisfy 0 < bass_min_hz < bass_max_hz, got {}..{}",
                    self.bass_min_hz, self.bass_max_hz
                ),
            ));
        }
        if self.bpm_min <= 0.0 || self.bpm_min > self.bpm_max {
            return Err(invalid(
                "bpm_min",
                format!(
                    "BPM range must satisfy 0 < bpm_min <= bpm_max, got {}..{}",
                    self.bpm_min, self.bpm_max
                ),
            ));
        }
        if self.hps_harmonics == 0 {
            return Err(invalid("hps_harmonics", "must be >= 1".to_string()));
        }
        if self.energy_history_len < 20 {
            return Err(invalid(
                "energy_history_len",
                format!(
                    "must be >= 20 to cover the onset warmup, got {}",
                    self.energy_history_len
                ),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> EngineError {
    EngineError::InvalidConfig { field, message }
}
