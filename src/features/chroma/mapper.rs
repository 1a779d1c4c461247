//! Pitch-class folding
//!
//! Folds a whitened, mask-weighted magnitude spectrum into a 12-element
//! chroma vector: gate quiet bins, band-limit, map each bin frequency to
//! its nearest MIDI note, accumulate `mag^1.25` per pitch class, and
//! L2-normalize.
//!
//! # Reference
//!
//! Müller, M., & Ewert, S. (2010). Chroma Toolbox: MATLAB Implementations
//! for Extracting Variants of Chroma-Based Audio Features. *Proceedings of
//! the International Society for Music Information Retrieval Conference*.

use super::normalize_l2;

/// Reference frequency for MIDI note math (A4)
const A4_FREQ: f32 = 440.0;

/// Exponent applied to masked magnitudes before accumulation
const ACCUM_POWER: f32 = 1.25;

/// Map a frequency in Hz to its nearest pitch class, 0 = C
pub fn pitch_class_of(freq: f32) -> u8 {
    let midi = 69.0 + 12.0 * (freq / A4_FREQ).log2();
    let rounded = midi.round() as i32;
    (((rounded % 12) + 12) % 12) as u8
}

/// Spectrum-to-chroma folding stage
pub struct ChromaMapper {
    fft_size: usize,
    f_min: f32,
    f_max: f32,
    mag_gate: f32,
}

impl ChromaMapper {
    /// Create a mapper for the given bin geometry and chroma band
    pub fn new(fft_size: usize, f_min: f32, f_max: f32, mag_gate: f32) -> Self {
        Self {
            fft_size,
            f_min,
            f_max,
            mag_gate,
        }
    }

    /// Fold `whitened`, weighted bin-wise by `mask`, into a chroma vector
    ///
    /// The DC bin is skipped. Returns the zero vector when nothing in the
    /// band clears the magnitude gate.
    pub fn map(&self, whitened: &[f32], mask: &[f32], sample_rate: f32) -> [f32; 12] {
        let mut chroma = [0.0f32; 12];
        if sample_rate <= 0.0 {
            return chroma;
        }
        let n = whitened.len().min(mask.len());
        for i in 1..n {
            let mag = whitened[i] * mask[i];
            if mag < self.mag_gate {
                continue;
            }
            let freq = i as f32 * sample_rate / self.fft_size as f32;
            if freq < self.f_min || freq > self.f_max {
                continue;
            }
            chroma[pitch_class_of(freq) as usize] += mag.powf(ACCUM_POWER);
        }
        normalize_l2(&mut chroma);
        chroma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;
    const FFT_SIZE: usize = 4096;

    fn mapper() -> ChromaMapper {
        ChromaMapper::new(FFT_SIZE, 55.0, 5500.0, 0.02)
    }

    fn bin_of(freq: f32) -> usize {
        (freq * FFT_SIZE as f32 / SAMPLE_RATE).round() as usize
    }

    #[test]
    fn test_pitch_class_of_reference_notes() {
        assert_eq!(pitch_class_of(440.0), 9); // A4
        assert_eq!(pitch_class_of(261.63), 0); // C4
        assert_eq!(pitch_class_of(98.0), 7); // G2
        assert_eq!(pitch_class_of(329.63), 4); // E4
    }

    #[test]
    fn test_single_tone_maps_to_its_pitch_class() {
        let mut spec = vec![0.0f32; FFT_SIZE / 2];
        spec[bin_of(440.0)] = 1.0;
        let mask = vec![1.0f32; FFT_SIZE / 2];

        let chroma = mapper().map(&spec, &mask, SAMPLE_RATE);
        assert!(
            chroma[9] > 0.99,
            "A4 tone should land in pitch class A, got {:?}",
            chroma
        );
        let norm: f32 = chroma.iter().map(|&x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_magnitude_gate_drops_quiet_bins() {
        let mut spec = vec![0.0f32; FFT_SIZE / 2];
        spec[bin_of(440.0)] = 0.01; // below the 0.02 gate
        let mask = vec![1.0f32; FFT_SIZE / 2];

        let chroma = mapper().map(&spec, &mask, SAMPLE_RATE);
        assert!(chroma.iter().all(|&x| x == 0.0), "gated bin should not contribute");
    }

    #[test]
    fn test_out_of_band_bins_are_skipped() {
        let mut spec = vec![0.0f32; FFT_SIZE / 2];
        spec[bin_of(30.0)] = 1.0; // below f_min
        spec[bin_of(8000.0)] = 1.0; // above f_max
        let mask = vec![1.0f32; FFT_SIZE / 2];

        let chroma = mapper().map(&spec, &mask, SAMPLE_RATE);
        assert!(chroma.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_mask_weighting_applies() {
        let mut spec = vec![0.0f32; FFT_SIZE / 2];
        let a4 = bin_of(440.0);
        let c4 = bin_of(261.63);
        spec[a4] = 1.0;
        spec[c4] = 1.0;
        let mut mask = vec![1.0f32; FFT_SIZE / 2];
        mask[c4] = 0.0; // percussive bin fully suppressed

        let chroma = mapper().map(&spec, &mask, SAMPLE_RATE);
        assert!(chroma[9] > 0.99);
        assert_eq!(chroma[0], 0.0, "masked bin must not contribute");
    }

    #[test]
    fn test_zero_spectrum_yields_zero_vector() {
        let spec = vec![0.0f32; FFT_SIZE / 2];
        let mask = vec![1.0f32; FFT_SIZE / 2];
        let chroma = mapper().map(&spec, &mask, SAMPLE_RATE);
        assert!(chroma.iter().all(|&x| x == 0.0));
    }
}
