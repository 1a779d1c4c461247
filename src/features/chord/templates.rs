//! Chord template table
//!
//! 72 templates (12 roots x 6 qualities), each a 12-element vector with
//! unit weight on the chord tones, L2-normalized. The table is constant
//! after construction and stored as one contiguous block so scoring is a
//! tight run of 12-element dot products.

use crate::analysis::chord::ChordQuality;
use crate::features::chroma::normalize_l2;

/// Number of templates in the table
pub const NUM_TEMPLATES: usize = 12 * ChordQuality::ALL.len();

/// Constant root x quality template table
pub struct ChordTemplates {
    /// Row-major weights, `NUM_TEMPLATES * 12`, root-major order
    weights: Vec<f32>,
    labels: Vec<(u8, ChordQuality)>,
}

impl ChordTemplates {
    /// Build the table in root-major order with qualities in
    /// `ChordQuality::ALL` order; scoring ties resolve to the earliest row
    pub fn new() -> Self {
        let mut weights = Vec::with_capacity(NUM_TEMPLATES * 12);
        let mut labels = Vec::with_capacity(NUM_TEMPLATES);
        for root in 0..12u8 {
            for quality in ChordQuality::ALL {
                let mut row = [0.0f32; 12];
                for &interval in quality.intervals() {
                    row[usize::from((root + interval) % 12)] = 1.0;
                }
                normalize_l2(&mut row);
                weights.extend_from_slice(&row);
                labels.push((root, quality));
            }
        }
        Self { weights, labels }
    }

    /// Dot product of `chroma` against template `idx`
    #[inline]
    pub fn score(&self, idx: usize, chroma: &[f32; 12]) -> f32 {
        let row = &self.weights[idx * 12..idx * 12 + 12];
        row.iter().zip(chroma.iter()).map(|(w, c)| w * c).sum()
    }

    /// Root and quality of template `idx`
    pub fn label(&self, idx: usize) -> (u8, ChordQuality) {
        self.labels[idx]
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the table is empty (never, after construction)
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ChordTemplates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_72_templates() {
        let templates = ChordTemplates::new();
        assert_eq!(templates.len(), 72);
        assert_eq!(NUM_TEMPLATES, 72);
    }

    #[test]
    fn test_rows_are_unit_norm() {
        let templates = ChordTemplates::new();
        for idx in 0..templates.len() {
            let mut norm_sq = 0.0f32;
            for pc in 0..12 {
                let mut probe = [0.0f32; 12];
                probe[pc] = 1.0;
                let w = templates.score(idx, &probe);
                norm_sq += w * w;
            }
            assert!(
                (norm_sq - 1.0).abs() < 1e-5,
                "template {} is not unit norm: {}",
                idx,
                norm_sq
            );
        }
    }

    #[test]
    fn test_iteration_order_is_root_major() {
        let templates = ChordTemplates::new();
        assert_eq!(templates.label(0), (0, ChordQuality::Major));
        assert_eq!(templates.label(1), (0, ChordQuality::Minor));
        assert_eq!(templates.label(5), (0, ChordQuality::Dim));
        assert_eq!(templates.label(6), (1, ChordQuality::Major));
        assert_eq!(templates.label(71), (11, ChordQuality::Dim));
    }

    #[test]
    fn test_c_major_template_tones() {
        let templates = ChordTemplates::new();
        let expected = 1.0 / 3.0f32.sqrt();
        for pc in [0usize, 4, 7] {
            let mut probe = [0.0f32; 12];
            probe[pc] = 1.0;
            assert!((templates.score(0, &probe) - expected).abs() < 1e-6);
        }
        let mut probe = [0.0f32; 12];
        probe[1] = 1.0; // C# is not a chord tone of C major
        assert_eq!(templates.score(0, &probe), 0.0);
    }

    #[test]
    fn test_templates_are_rotations() {
        let templates = ChordTemplates::new();
        // Score of C major against C-E-G must equal D major against D-F#-A
        let mut c_triad = [0.0f32; 12];
        for pc in [0usize, 4, 7] {
            c_triad[pc] = 1.0;
        }
        let mut d_triad = [0.0f32; 12];
        for pc in [2usize, 6, 9] {
            d_triad[pc] = 1.0;
        }
        let c_score = templates.score(0, &c_triad);
        let d_score = templates.score(2 * 6, &d_triad);
        assert!((c_score - d_score).abs() < 1e-6);
    }
}
