//! Chord labels and pitch-class naming

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pitch-class names, indexed from C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Sentinel rendered when no chord is known (em dash, U+2014)
pub const NO_CHORD: &str = "—";

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    /// Major triad (e.g., C-E-G)
    Major,
    /// Minor triad (e.g., C-Eb-G)
    Minor,
    /// Major seventh (e.g., C-E-G-B)
    Maj7,
    /// Minor seventh (e.g., C-Eb-G-Bb)
    Min7,
    /// Dominant seventh (e.g., C-E-G-Bb)
    Dom7,
    /// Diminished triad (e.g., C-Eb-Gb)
    Dim,
}

impl ChordQuality {
    /// Qualities in template iteration order
    ///
    /// Classification ties resolve to the earliest entry, so this order is
    /// part of the observable contract.
    pub const ALL: [ChordQuality; 6] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Maj7,
        ChordQuality::Min7,
        ChordQuality::Dom7,
        ChordQuality::Dim,
    ];

    /// Chord tones as semitone offsets from the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Maj7 => &[0, 4, 7, 11],
            ChordQuality::Min7 => &[0, 3, 7, 10],
            ChordQuality::Dom7 => &[0, 4, 7, 10],
            ChordQuality::Dim => &[0, 3, 6],
        }
    }

    /// Rendering suffix appended to the root name
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Maj7 => "maj7",
            ChordQuality::Min7 => "m7",
            ChordQuality::Dom7 => "7",
            ChordQuality::Dim => "dim",
        }
    }
}

/// A chord label: root pitch class, quality, optional slash bass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordLabel {
    /// Root pitch class (0 = C, ..., 11 = B)
    pub root: u8,

    /// Chord quality
    pub quality: ChordQuality,

    /// Slash bass pitch class, present only when it differs from the root
    pub bass: Option<u8>,
}

impl ChordLabel {
    /// Create a label without a slash bass
    pub fn new(root: u8, quality: ChordQuality) -> Self {
        Self { root, quality, bass: None }
    }

    /// Create a label, attaching `bass` only when it differs from the root
    pub fn with_bass(root: u8, quality: ChordQuality, bass: Option<u8>) -> Self {
        Self {
            root,
            quality,
            bass: bass.filter(|&pc| pc != root),
        }
    }
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            NOTE_NAMES[self.root as usize % 12],
            self.quality.suffix()
        )?;
        if let Some(bass) = self.bass {
            write!(f, "/{}", NOTE_NAMES[bass as usize % 12])?;
        }
        Ok(())
    }
}

/// Render an optional label, falling back to the no-chord sentinel
pub fn chord_text(label: Option<ChordLabel>) -> String {
    match label {
        Some(label) => label.to_string(),
        None => NO_CHORD.to_string(),
    }
}
