//! Finalized recording clips.
//!
//! A clip is the immutable result of stopping a recording session: the mono
//! i16 PCM samples plus a WAV encoding of them, held in memory until the clip
//! is replaced or submitted.

use anyhow::Result;
use hound::{WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Default file name used when exporting or submitting a clip.
pub const EXPORT_FILE_NAME: &str = "recording.wav";

/// An immutable, finalized audio recording.
#[derive(Debug, Clone)]
pub struct Clip {
    samples: Vec<i16>,
    sample_rate: u32,
    wav: Vec<u8>,
}

impl Clip {
    /// Finalizes raw mono samples into a clip, encoding the WAV bytes once.
    ///
    /// Zero-length sample buffers are allowed and produce a valid, empty WAV.
    ///
    /// # Errors
    /// - If WAV encoding fails
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Result<Self> {
        let wav = encode_wav(&samples, sample_rate)?;
        Ok(Self {
            samples,
            sample_rate,
            wav,
        })
    }

    /// Returns the recorded samples (mono i16 PCM).
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the sample rate the clip was recorded at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the in-memory WAV encoding of the clip.
    pub fn wav_bytes(&self) -> &[u8] {
        &self.wav
    }

    /// Returns the clip duration.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Returns true if the clip contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Writes the clip to disk as a WAV file.
    ///
    /// # Errors
    /// - If the file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.wav)?;
        tracing::info!(
            "Clip exported: {} ({} bytes, {:.2}s)",
            path.display(),
            self.wav.len(),
            self.duration().as_secs_f32()
        );
        Ok(())
    }
}

/// Encodes mono i16 samples as a 16-bit PCM WAV in memory.
fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let clip = Clip::from_samples(vec![0i16; 44100], 44100).unwrap();
        assert_eq!(clip.duration(), Duration::from_secs(1));

        let clip = Clip::from_samples(vec![0i16; 22050], 44100).unwrap();
        assert_eq!(clip.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_length_clip_is_valid() {
        let clip = Clip::from_samples(Vec::new(), 16000).unwrap();
        assert!(clip.is_empty());
        assert_eq!(clip.duration(), Duration::ZERO);
        // A valid WAV still carries the 44-byte RIFF/fmt/data header
        assert_eq!(clip.wav_bytes().len(), 44);
    }

    #[test]
    fn test_wav_bytes_layout() {
        let clip = Clip::from_samples(vec![1i16, -1, 2, -2], 16000).unwrap();
        let wav = clip.wav_bytes();
        // 44-byte header plus two bytes per sample
        assert_eq!(wav.len(), 44 + 4 * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
    }

    #[test]
    fn test_wav_roundtrip_preserves_samples() {
        let samples = vec![0i16, 100, -100, i16::MAX, i16::MIN];
        let clip = Clip::from_samples(samples.clone(), 44100).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(clip.wav_bytes())).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 44100);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_save_writes_wav_file() {
        let clip = Clip::from_samples(vec![0i16; 160], 16000).unwrap();
        let path = std::env::temp_dir().join(format!("rhythm_test_{}.wav", std::process::id()));

        clip.save(&path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, clip.wav_bytes());

        let _ = std::fs::remove_file(&path);
    }
}
