//! Per-tick results and timeline events

use serde::{Deserialize, Serialize};

/// Snapshot returned by `Engine::tick`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickResult {
    /// Stable chord text, `"—"` until a chord has been confirmed
    pub chord: String,

    /// Classifier confidence for the current candidate (0.0-1.0)
    pub confidence: f32,

    /// Tempo estimate in BPM, `None` until enough onsets agree
    pub bpm: Option<u32>,

    /// Smoothed chroma vector for display (zero vector during warmup)
    pub chroma: [f32; 12],
}

/// A confirmed chord change on the media timeline
///
/// Events are appended by chord hysteresis when a promoted label differs
/// from the last recorded one. The log is append-only; the only permitted
/// mutation is the user override, which marks the event and attaches text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Position within the track when the chord was confirmed, in seconds
    pub media_time_s: f64,

    /// Chord text at promotion time
    pub chord: String,

    /// Confidence recorded at promotion (0.0-1.0)
    pub confidence: f32,

    /// True once the user has overridden this event
    pub overridden: bool,

    /// Replacement text supplied by the override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,
}
