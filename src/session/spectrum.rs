//! Frequency analysis for the live visualizer.
//!
//! Samples the most recent capture window each frame, runs a 2048-point FFT,
//! and folds the speech band into per-column magnitudes for the bar renderer.

use rustfft::{num_complex::Complex, FftPlanner};

/// FFT window size. 2048 points keep ~20 Hz resolution at 44.1 kHz.
const FFT_SIZE: usize = 2048;

/// Analyzed band: fundamentals and low harmonics of the human voice.
const MIN_FREQ: f32 = 100.0;
const MAX_FREQ: f32 = 1500.0;

/// Stateful frequency analyzer with internal FFT planner.
///
/// Output is purely derived from the latest samples; nothing persists across
/// a session beyond display smoothing.
pub struct SpectrumAnalyzer {
    fft_planner: FftPlanner<f32>,
    bins: Vec<u64>,
    num_bins: usize,
}

impl SpectrumAnalyzer {
    /// Creates an analyzer producing `num_bins` display columns.
    pub fn new(num_bins: usize) -> Self {
        Self {
            fft_planner: FftPlanner::new(),
            bins: vec![0u64; num_bins],
            num_bins,
        }
    }

    /// Updates magnitudes from the newest samples, applying smoothing.
    pub fn update(&mut self, samples: &[i16], sample_rate: u32, reference_level_db: i8) {
        let fresh = magnitudes(
            samples,
            sample_rate,
            self.num_bins,
            reference_level_db,
            &mut self.fft_planner,
        );

        // Moving average against the previous frame to reduce visual jitter
        for (shown, new) in self.bins.iter_mut().zip(fresh.iter()) {
            *shown = (*shown + *new) / 2;
        }
    }

    /// Resizes the analyzer for a new terminal width.
    pub fn resize(&mut self, new_width: usize) {
        self.num_bins = new_width;
        self.bins = vec![0u64; new_width];
    }

    /// Clears all magnitudes, e.g. when the session stops.
    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0);
    }

    /// Returns current per-column magnitudes, each 0-100.
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }
}

/// Calculates per-column magnitudes from audio samples using an FFT.
///
/// Returns values normalized to 0-100 against the configured reference level,
/// restricted to the 100-1500 Hz speech band.
///
/// # Arguments
/// * `samples` - Audio samples (i16 PCM); only the newest window is analyzed
/// * `sample_rate` - Audio sample rate in Hz
/// * `num_bins` - Number of display columns to return
/// * `reference_level_db` - Reference level for 100% display
/// * `fft_planner` - Reusable FFT planner
pub fn magnitudes(
    samples: &[i16],
    sample_rate: u32,
    num_bins: usize,
    reference_level_db: i8,
    fft_planner: &mut FftPlanner<f32>,
) -> Vec<u64> {
    if samples.is_empty() || sample_rate == 0 || num_bins == 0 {
        return vec![0u64; num_bins];
    }

    let sample_count = samples.len().min(FFT_SIZE);
    let recent = &samples[samples.len() - sample_count..];

    // Hanning window to reduce spectral leakage
    let mut buffer: Vec<Complex<f32>> = recent
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let window = 0.5
                * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / sample_count as f32).cos());
            Complex::new(s as f32 * window / 32768.0, 0.0)
        })
        .collect();
    buffer.resize(FFT_SIZE, Complex::new(0.0, 0.0));

    let fft = fft_planner.plan_fft_forward(FFT_SIZE);
    fft.process(&mut buffer);

    let freq_resolution = sample_rate as f32 / FFT_SIZE as f32;
    let min_bin = (MIN_FREQ / freq_resolution) as usize;
    let max_bin = (MAX_FREQ / freq_resolution).min((FFT_SIZE / 2) as f32) as usize;
    if max_bin <= min_bin {
        return vec![0u64; num_bins];
    }

    let noise_gate_db = reference_level_db as f32 - 35.0;
    let useful_bins = max_bin - min_bin;
    let mut result = vec![0u64; num_bins];

    for (column, out) in result.iter_mut().enumerate() {
        let start_bin = min_bin + ((column * useful_bins) as f32 / num_bins as f32) as usize;
        let end_bin = (min_bin + (((column + 1) * useful_bins) as f32 / num_bins as f32) as usize)
            .min(max_bin)
            .max(start_bin + 1);

        if start_bin >= max_bin {
            break;
        }

        let mut sum = 0.0;
        let mut count = 0;
        for bin_idx in start_bin..end_bin {
            if bin_idx < buffer.len() / 2 {
                sum += buffer[bin_idx].norm();
                count += 1;
            }
        }
        if count == 0 {
            continue;
        }

        let avg_magnitude = sum / count as f32;
        let db = if avg_magnitude > 1e-10 {
            20.0 * avg_magnitude.log10()
        } else {
            -100.0
        };

        // Shift by 20 dB to align FFT energy concentration with RMS metering
        let adjusted_db = db - 20.0;

        if adjusted_db >= noise_gate_db {
            let db_range = reference_level_db as f32 - noise_gate_db;
            let normalized = ((adjusted_db - noise_gate_db) / db_range * 100.0).clamp(0.0, 100.0);
            *out = normalized as u64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (amplitude * (2.0 * std::f32::consts::PI * freq * t).sin() * i16::MAX as f32)
                    as i16
            })
            .collect()
    }

    #[test]
    fn test_empty_samples_yield_silence() {
        let mut planner = FftPlanner::new();
        let bins = magnitudes(&[], 16000, 32, -20, &mut planner);
        assert_eq!(bins, vec![0u64; 32]);
    }

    #[test]
    fn test_silence_is_gated_to_zero() {
        let mut planner = FftPlanner::new();
        let bins = magnitudes(&vec![0i16; 4096], 16000, 32, -20, &mut planner);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_voice_band_tone_registers() {
        let mut planner = FftPlanner::new();
        let samples = sine(440.0, 16000, 4096, 0.5);
        let bins = magnitudes(&samples, 16000, 64, -20, &mut planner);

        // The column holding 440 Hz carries energy; band position is
        // (440 - 100) / (1500 - 100) of the display width.
        let expected_column = (64.0 * (440.0 - 100.0) / 1400.0) as usize;
        assert!(bins[expected_column] > 0, "bins: {:?}", bins);

        // Columns far above the tone stay gated.
        assert_eq!(bins[60], 0);
    }

    #[test]
    fn test_update_smooths_between_frames() {
        let mut analyzer = SpectrumAnalyzer::new(16);
        let samples = sine(440.0, 16000, 4096, 0.5);
        analyzer.update(&samples, 16000, -20);
        let first: Vec<u64> = analyzer.bins().to_vec();

        analyzer.update(&vec![0i16; 4096], 16000, -20);
        let second: Vec<u64> = analyzer.bins().to_vec();

        // Decay, not an instant drop to zero
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(*b, *a / 2);
        }
    }

    #[test]
    fn test_reset_clears_bins() {
        let mut analyzer = SpectrumAnalyzer::new(8);
        let samples = sine(300.0, 16000, 4096, 0.8);
        analyzer.update(&samples, 16000, -20);
        analyzer.reset();
        assert!(analyzer.bins().iter().all(|&b| b == 0));
    }
}
