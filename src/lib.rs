//! # Chordal DSP
//!
//! A realtime music-analysis engine: given a continuous stream of FFT
//! magnitude frames from a playing track, it produces a live estimate of
//! the currently sounding chord (including slash-bass variants), a tempo
//! estimate in BPM, and a smoothed chroma vector for display.
//!
//! ## Features
//!
//! - **Chord detection**: spectral whitening, harmonic/percussive soft
//!   masking, key-invariant chroma smoothing, and template matching over
//!   72 root x quality chords with multi-stage temporal hysteresis
//! - **Slash bass**: harmonic-product-spectrum bass tracking with its own
//!   stability window
//! - **Tempo**: energy-based onset detection with inter-onset-interval
//!   medians and octave folding
//!
//! ## Quick start
//!
//! ```
//! use chordal_dsp::{AudioFrame, Engine, EngineConfig};
//!
//! let mut engine = Engine::new(EngineConfig::default())?;
//!
//! // Per tick: byte-quantized magnitude spectra and a time-domain buffer
//! let mag_main = vec![0u8; 2048];
//! let mag_bass = vec![0u8; 256];
//! let time_domain = vec![0.0f32; 1024];
//!
//! let result = engine.tick(&AudioFrame {
//!     mag_main: &mag_main,
//!     mag_bass: &mag_bass,
//!     time_domain: &time_domain,
//!     sample_rate_hz: 44_100.0,
//!     wall_ms: 0.0,
//!     media_time_s: 0.0,
//!     is_playing: true,
//! })?;
//!
//! assert_eq!(result.chord, "—"); // silence: no chord yet
//! # Ok::<(), chordal_dsp::EngineError>(())
//! ```
//!
//! ## Architecture
//!
//! Per tick the engine runs a fixed block-synchronous dataflow:
//!
//! ```text
//! mag spectra → Whitener → HarmonicMask → ChromaMapper → ChromaSmoother
//!                  ↘ BassTracker ↘
//!                     ChordClassifier → ChordHysteresis → stable chord
//! time domain → BpmEstimator → bpm
//! ```
//!
//! The FFT itself is external: the engine consumes pre-computed magnitude
//! spectra and never blocks, suspends, or performs I/O inside `tick`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;

// Re-export main types
pub use analysis::chord::{chord_text, ChordLabel, ChordQuality, NOTE_NAMES, NO_CHORD};
pub use analysis::result::{TickResult, TimelineEvent};
pub use config::EngineConfig;
pub use engine::{AudioFrame, Engine};
pub use error::EngineError;
