//! Tempo estimation from frame energy
//!
//! Algorithm, per tick:
//! 1. Compute mean-square energy of the time-domain buffer
//! 2. Push it into a bounded history ring; estimation waits until the ring
//!    has a minimum of samples to threshold against
//! 3. An onset fires when energy clears `mean + k * std` over the ring and
//!    the refractory gap since the previous onset has passed
//! 4. Tempo is 60 over the median inter-onset interval, with out-of-range
//!    intervals discarded and the result octave-folded into the configured
//!    BPM range
//!
//! Onset bookkeeping runs entirely on the media clock: it reflects position
//! within the track and stalls during pause, which is exactly when onsets
//! must not be minted.
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., &
//! Sandler, M. B. (2005). A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use std::collections::VecDeque;

use crate::config::EngineConfig;

/// Onsets older than this are dropped from the interval pool, in seconds
const ONSET_WINDOW_S: f64 = 8.0;

/// Minimum ring occupancy before the adaptive threshold is trusted
const MIN_HISTORY: usize = 20;

/// Minimum onsets needed for an estimate
const MIN_ONSETS: usize = 4;

/// Inter-onset intervals outside this range are discarded, in seconds
const IOI_MIN_S: f64 = 0.20;
const IOI_MAX_S: f64 = 2.0;

/// Minimum retained intervals needed for a median
const MIN_INTERVALS: usize = 3;

/// Bound on octave-folding iterations in each direction
const MAX_FOLDS: usize = 8;

/// Energy-based onset detector and inter-onset-interval tempo estimator
pub struct BpmEstimator {
    history_len: usize,
    std_k: f32,
    refractory_s: f32,
    bpm_min: f32,
    bpm_max: f32,
    energies: VecDeque<f32>,
    onsets: Vec<f64>,
    intervals: Vec<f64>,
    last_onset_s: f64,
}

impl BpmEstimator {
    /// Create an estimator from the engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            history_len: config.energy_history_len,
            std_k: config.onset_std_k,
            refractory_s: config.onset_refractory_s,
            bpm_min: config.bpm_min,
            bpm_max: config.bpm_max,
            energies: VecDeque::with_capacity(config.energy_history_len),
            onsets: Vec::new(),
            intervals: Vec::new(),
            last_onset_s: f64::NEG_INFINITY,
        }
    }

    /// Process one time-domain buffer and return the current BPM estimate
    ///
    /// While `is_playing` is false the energy history still advances but no
    /// onsets are recorded; a stalled media clock must not mint beats.
    pub fn process(&mut self, time: &[f32], media_time_s: f64, is_playing: bool) -> Option<u32> {
        let energy = if time.is_empty() {
            0.0
        } else {
            time.iter().map(|&x| x * x).sum::<f32>() / time.len() as f32
        };
        if self.energies.len() == self.history_len {
            self.energies.pop_front();
        }
        self.energies.push_back(energy);

        if self.energies.len() < MIN_HISTORY {
            return None;
        }

        let n = self.energies.len() as f32;
        let mean: f32 = self.energies.iter().sum::<f32>() / n;
        let mean_sq: f32 = self.energies.iter().map(|&e| e * e).sum::<f32>() / n;
        let std = (mean_sq - mean * mean).max(0.0).sqrt();
        let threshold = mean + self.std_k * std;

        if is_playing
            && energy > threshold
            && media_time_s - self.last_onset_s > f64::from(self.refractory_s)
        {
            self.last_onset_s = media_time_s;
            self.onsets.push(media_time_s);
            self.onsets.retain(|&t| media_time_s - t <= ONSET_WINDOW_S);
            log::debug!(
                "onset at {:.2} s ({} in window)",
                media_time_s,
                self.onsets.len()
            );
        }

        self.estimate()
    }

    /// Clear energy history and onset bookkeeping
    pub fn reset(&mut self) {
        self.energies.clear();
        self.onsets.clear();
        self.intervals.clear();
        self.last_onset_s = f64::NEG_INFINITY;
    }

    /// Median-interval tempo with octave folding
    fn estimate(&mut self) -> Option<u32> {
        if self.onsets.len() < MIN_ONSETS {
            return None;
        }
        self.intervals.clear();
        self.intervals.extend(
            self.onsets
                .windows(2)
                .map(|pair| pair[1] - pair[0])
                .filter(|&d| d > IOI_MIN_S && d < IOI_MAX_S),
        );
        if self.intervals.len() < MIN_INTERVALS {
            return None;
        }
        self.intervals
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = self.intervals.len() / 2;
        let median = if self.intervals.len() % 2 == 0 {
            (self.intervals[mid - 1] + self.intervals[mid]) * 0.5
        } else {
            self.intervals[mid]
        };

        let mut bpm = 60.0 / median;
        let mut folds = 0;
        while bpm < f64::from(self.bpm_min) && folds < MAX_FOLDS {
            bpm *= 2.0;
            folds += 1;
        }
        folds = 0;
        while bpm > f64::from(self.bpm_max) && folds < MAX_FOLDS {
            bpm /= 2.0;
            folds += 1;
        }
        if bpm < f64::from(self.bpm_min) || bpm > f64::from(self.bpm_max) {
            return None;
        }
        Some(bpm.round() as u32)
    }
}
