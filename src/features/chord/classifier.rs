//! Template-based chord classification
//!
//! Scores the smoothed chroma against every template by dot product (both
//! sides are unit vectors, so this is cosine similarity) and attaches the
//! tracked bass pitch class as a slash bass when it differs from the
//! winning root. Confidence is an affine remap of the best score, clamped
//! to [0, 1].

use crate::analysis::chord::ChordLabel;
use crate::config::EngineConfig;
use crate::features::chroma::EPSILON;

use super::templates::ChordTemplates;

/// Chroma-to-label classifier over the constant template table
pub struct ChordClassifier {
    templates: ChordTemplates,
    conf_low: f32,
    conf_span: f32,
}

impl ChordClassifier {
    /// Create a classifier from the engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            templates: ChordTemplates::new(),
            conf_low: config.conf_low,
            conf_span: config.conf_span,
        }
    }

    /// Classify one smoothed chroma frame
    ///
    /// Returns `None` on a zero chroma vector: silence has no candidate.
    /// Ties on equal scores resolve to the earliest template in root-major
    /// order.
    pub fn classify(&self, chroma: &[f32; 12], bass_pc: Option<u8>) -> Option<(ChordLabel, f32)> {
        let energy: f32 = chroma.iter().map(|&x| x * x).sum();
        if energy <= EPSILON {
            return None;
        }

        let mut best_idx = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for idx in 0..self.templates.len() {
            let score = self.templates.score(idx, chroma);
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        let (root, quality) = self.templates.label(best_idx);
        let confidence = ((best_score - self.conf_low) / self.conf_span).clamp(0.0, 1.0);
        Some((ChordLabel::with_bass(root, quality, bass_pc), confidence))
    }
}
