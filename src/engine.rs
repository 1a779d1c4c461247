//! Engine orchestration
//!
//! Owns every stage's persistent state and threads buffers through the
//! fixed per-tick dataflow: whiten the main and bass spectra, derive the
//! harmonic mask, fold and smooth chroma, track the bass pitch class,
//! classify and debounce the chord, and update the tempo estimate.
//!
//! Two clocks are kept distinct throughout. Wall-clock milliseconds drive
//! EMA time constants and dwell windows and must advance monotonically
//! regardless of playback. Media-time seconds drive onset bookkeeping and
//! timeline event stamps and may stall during pause. Components never
//! sample time themselves; both clocks arrive with the frame.
//!
//! A single engine is not safe for concurrent calls; analyze parallel
//! tracks with independent engines, which share nothing.

use crate::analysis::chord::chord_text;
use crate::analysis::result::{TickResult, TimelineEvent};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::features::bass::BassTracker;
use crate::features::chord::classifier::ChordClassifier;
use crate::features::chord::hysteresis::ChordHysteresis;
use crate::features::chroma::mapper::ChromaMapper;
use crate::features::chroma::smoothing::ChromaSmoother;
use crate::features::hpss::HarmonicMask;
use crate::features::tempo::BpmEstimator;
use crate::features::whitening::Whitener;

/// One tick of input, borrowed from the host
///
/// Magnitudes are byte-quantized FFT spectra from the host's transform
/// provider; the engine never computes a transform itself.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    /// Main magnitude spectrum, 0..255 per bin
    pub mag_main: &'a [u8],

    /// Low-frequency magnitude spectrum for bass tracking, 0..255 per bin
    pub mag_bass: &'a [u8],

    /// Time-domain samples, roughly in [-1, 1]
    pub time_domain: &'a [f32],

    /// Sample rate of the analyzed stream, in Hz
    pub sample_rate_hz: f32,

    /// Monotonic wall-clock timestamp, in milliseconds
    pub wall_ms: f64,

    /// Position within the track, in seconds
    pub media_time_s: f64,

    /// True while the track is actually playing
    pub is_playing: bool,
}

/// Realtime chord, bass, and tempo analysis engine
pub struct Engine {
    config: EngineConfig,
    whitener: Whitener,
    harmonic_mask: HarmonicMask,
    mapper: ChromaMapper,
    smoother: ChromaSmoother,
    bass: BassTracker,
    classifier: ChordClassifier,
    hysteresis: ChordHysteresis,
    tempo: BpmEstimator,
    // Reused per-tick buffers; steady-state ticks allocate nothing
    whitened_main: Vec<f32>,
    whitened_bass: Vec<f32>,
    mask: Vec<f32>,
    // Buffer lengths latched on the first tick; a change requires a reset
    expected_lens: Option<(usize, usize, usize)>,
    last_bpm: Option<u32>,
}

impl Engine {
    /// Create an engine with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` naming the offending field when
    /// a configuration value is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::debug!(
            "engine created: fft_size={}, chroma band {:.0}-{:.0} Hz, bass band {:.0}-{:.0} Hz",
            config.fft_size,
            config.f_min,
            config.f_max,
            config.bass_min_hz,
            config.bass_max_hz
        );
        Ok(Self {
            whitener: Whitener::new(config.whiten_half_window, config.whiten_eps),
            harmonic_mask: HarmonicMask::new(config.harmonic_tc_ms, config.hpss_gamma),
            mapper: ChromaMapper::new(
                config.fft_size,
                config.f_min,
                config.f_max,
                config.chroma_mag_gate,
            ),
            smoother: ChromaSmoother::new(config.chroma_tc_ms),
            bass: BassTracker::new(&config),
            classifier: ChordClassifier::new(&config),
            hysteresis: ChordHysteresis::new(config.chord_stable_ms),
            tempo: BpmEstimator::new(&config),
            whitened_main: Vec::new(),
            whitened_bass: Vec::new(),
            mask: Vec::new(),
            expected_lens: None,
            last_bpm: None,
            config,
        })
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one frame
    ///
    /// Runs the full stage pipeline in order; later stages observe outputs
    /// of earlier stages from the same tick. Degenerate inputs (silence,
    /// missing bass peak) are not errors: they surface as a zero chroma,
    /// chord `—`, confidence 0, and `bpm = None`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidFrame` when a buffer length changes
    /// between ticks without a reset, or when the sample rate is not a
    /// positive finite number.
    pub fn tick(&mut self, frame: &AudioFrame<'_>) -> Result<TickResult, EngineError> {
        self.validate_frame(frame)?;

        self.whitener.whiten(frame.mag_main, &mut self.whitened_main);
        self.whitener.whiten(frame.mag_bass, &mut self.whitened_bass);

        self.harmonic_mask
            .apply(&self.whitened_main, frame.wall_ms, &mut self.mask);

        let raw_chroma = self
            .mapper
            .map(&self.whitened_main, &self.mask, frame.sample_rate_hz);
        let chroma = self.smoother.smooth(&raw_chroma, frame.wall_ms);

        let bass_pc = self
            .bass
            .track(&self.whitened_bass, frame.sample_rate_hz, frame.wall_ms);

        let candidate = self.classifier.classify(&chroma, bass_pc);
        let confidence = candidate.map_or(0.0, |(_, conf)| conf);
        let stable = self.hysteresis.update(
            candidate.map(|(label, _)| label),
            frame.wall_ms,
            frame.media_time_s,
        );

        let bpm = self
            .tempo
            .process(frame.time_domain, frame.media_time_s, frame.is_playing);
        self.last_bpm = bpm;

        Ok(TickResult {
            chord: chord_text(stable),
            confidence,
            bpm,
            chroma,
        })
    }

    /// Immutable view of the confirmed-change timeline
    pub fn events(&self) -> &[TimelineEvent] {
        self.hysteresis.events()
    }

    /// Mark a timeline event as overridden and attach the user's text
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidEvent` when `index` is out of range.
    pub fn override_event(&mut self, index: usize, text: &str) -> Result<(), EngineError> {
        self.hysteresis.override_event(index, text)
    }

    /// The stable chord text, `"—"` until a chord has been confirmed
    pub fn current_chord(&self) -> String {
        chord_text(self.hysteresis.current())
    }

    /// The most recent tempo estimate
    pub fn current_bpm(&self) -> Option<u32> {
        self.last_bpm
    }

    /// Clear all playback-derived state
    ///
    /// Zeroes the EMAs, bass tracking, chord hysteresis, the event log, and
    /// tempo bookkeeping, and unlatches the expected buffer lengths.
    /// Configuration and scratch buffer capacity are preserved.
    pub fn reset_playback_state(&mut self) {
        log::debug!("playback state reset");
        self.harmonic_mask.reset();
        self.smoother.reset();
        self.bass.reset();
        self.hysteresis.reset();
        self.tempo.reset();
        self.expected_lens = None;
        self.last_bpm = None;
    }

    fn validate_frame(&mut self, frame: &AudioFrame<'_>) -> Result<(), EngineError> {
        if !frame.sample_rate_hz.is_finite() || frame.sample_rate_hz <= 0.0 {
            return Err(EngineError::InvalidFrame(format!(
                "sample rate must be positive, got {}",
                frame.sample_rate_hz
            )));
        }
        let lens = (
            frame.mag_main.len(),
            frame.mag_bass.len(),
            frame.time_domain.len(),
        );
        match self.expected_lens {
            None => self.expected_lens = Some(lens),
            Some(expected) if expected != lens => {
                return Err(EngineError::InvalidFrame(format!(
                    "buffer lengths changed from {:?} to {:?} without a reset",
                    expected, lens
                )));
            }
            Some(_) => {}
        }
        Ok(())
    }
}
