//! Clip playback with seek support.
//!
//! Drives a single output stream over a finalized clip. The UI polls the
//! displayed position once per second while playing; seeking maps a
//! normalized [0,1] fraction onto the clip timeline. Displayed values are
//! clamped to the same maximum duration used for recording.

use crate::session::Clip;
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interval between updates of the displayed playback position.
const POSITION_POLL_INTERVAL: Duration = Duration::from_secs(1);

struct PlaybackShared {
    /// Output frames consumed so far
    frames: AtomicU64,
    playing: AtomicBool,
}

/// Plays one clip on the default output device.
pub struct PlaybackController {
    /// Active output stream (kept alive while the controller exists)
    stream: Option<cpal::Stream>,
    shared: Arc<PlaybackShared>,
    out_rate: u32,
    total_out_frames: u64,
    duration: Duration,
    max_duration: Duration,
    /// Position poll; None while the poll is cancelled
    last_poll: Option<Instant>,
    displayed_position: Duration,
}

impl PlaybackController {
    /// Prepares playback of a clip on the default output device.
    ///
    /// The stream starts paused; call [`play`](Self::play) to begin.
    ///
    /// # Errors
    /// - If no output device is available
    /// - If the output stream cannot be configured
    pub fn new(clip: &Clip, max_duration: Duration) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No audio output device available"))?;
        let device_config = device.default_output_config()?;

        let out_rate = device_config.sample_rate().0;
        let channels = device_config.channels() as usize;
        let clip_rate = clip.sample_rate().max(1) as u64;
        let samples: Arc<Vec<i16>> = Arc::new(clip.samples().to_vec());
        let total_out_frames = samples.len() as u64 * out_rate as u64 / clip_rate;

        let shared = Arc::new(PlaybackShared {
            frames: AtomicU64::new(0),
            playing: AtomicBool::new(false),
        });

        let cb_shared = Arc::clone(&shared);
        let cb_samples = Arc::clone(&samples);
        let err_fn = |err: cpal::StreamError| {
            tracing::error!("Playback stream error: {}", err);
        };

        let stream = match device_config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &device_config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_output(data, channels, &cb_shared, &cb_samples, clip_rate, out_rate);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_output_stream(
                &device_config.into(),
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let mut buf = vec![0.0f32; data.len()];
                    fill_output(&mut buf, channels, &cb_shared, &cb_samples, clip_rate, out_rate);
                    for (out, s) in data.iter_mut().zip(buf.iter()) {
                        *out = (s * i16::MAX as f32) as i16;
                    }
                },
                err_fn,
                None,
            ),
            other => return Err(anyhow!("unsupported output sample format: {other:?}")),
        }?;

        stream.play()?;

        Ok(Self {
            stream: Some(stream),
            shared,
            out_rate,
            total_out_frames,
            duration: clip.duration(),
            max_duration,
            last_poll: None,
            displayed_position: Duration::ZERO,
        })
    }

    /// Starts (or resumes) playback and the once-per-second position poll.
    pub fn play(&mut self) {
        if self.finished() {
            self.shared.frames.store(0, Ordering::Relaxed);
        }
        self.shared.playing.store(true, Ordering::Relaxed);
        self.last_poll = Some(Instant::now());
        self.displayed_position = self.position();
        tracing::debug!("Playback started");
    }

    /// Pauses output without losing the position.
    pub fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::Relaxed);
        tracing::debug!("Playback paused");
    }

    /// Pauses output and cancels the position poll.
    pub fn stop(&mut self) {
        self.pause();
        self.last_poll = None;
    }

    /// Returns true while samples are being consumed.
    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }

    /// Returns true once the whole clip has been played.
    pub fn finished(&self) -> bool {
        self.shared.frames.load(Ordering::Relaxed) >= self.total_out_frames
    }

    /// Repositions playback at `fraction` of the clip, clamped into [0,1] and
    /// capped at the maximum allowed duration.
    pub fn seek(&mut self, fraction: f64) {
        let target = seek_target(fraction, self.duration, self.max_duration);
        let frames = (target.as_secs_f64() * self.out_rate as f64) as u64;
        self.shared
            .frames
            .store(frames.min(self.total_out_frames), Ordering::Relaxed);
        self.displayed_position = self.position();
        tracing::debug!("Seek to {:.2}s", target.as_secs_f64());
    }

    /// Current playback position, clamped to the maximum allowed duration.
    pub fn position(&self) -> Duration {
        let secs = self.shared.frames.load(Ordering::Relaxed) as f64 / self.out_rate as f64;
        Duration::from_secs_f64(secs).min(self.max_duration)
    }

    /// Clip duration as displayed, clamped to the maximum allowed duration.
    pub fn display_duration(&self) -> Duration {
        self.duration.min(self.max_duration)
    }

    /// Advances the displayed position if the poll interval has elapsed.
    ///
    /// Returns the position to display. While the poll is cancelled (stopped),
    /// the last displayed value is retained.
    pub fn poll_position(&mut self) -> Duration {
        if let Some(last) = self.last_poll {
            if last.elapsed() >= POSITION_POLL_INTERVAL {
                self.displayed_position = self.position();
                self.last_poll = Some(Instant::now());
            }
            if self.finished() {
                self.displayed_position = self.position();
                self.shared.playing.store(false, Ordering::Relaxed);
            }
        }
        self.displayed_position
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        // Dropping the stream releases the output device
        self.shared.playing.store(false, Ordering::Relaxed);
        self.stream = None;
    }
}

/// Fills an interleaved output buffer, resampling the mono clip by nearest
/// neighbor and duplicating it across all output channels.
fn fill_output(
    data: &mut [f32],
    channels: usize,
    shared: &PlaybackShared,
    samples: &[i16],
    clip_rate: u64,
    out_rate: u32,
) {
    for frame in data.chunks_mut(channels.max(1)) {
        let value = if shared.playing.load(Ordering::Relaxed) {
            let out_frame = shared.frames.load(Ordering::Relaxed);
            let clip_idx = (out_frame * clip_rate / out_rate as u64) as usize;
            if clip_idx < samples.len() {
                shared.frames.fetch_add(1, Ordering::Relaxed);
                samples[clip_idx] as f32 / 32768.0
            } else {
                shared.playing.store(false, Ordering::Relaxed);
                0.0
            }
        } else {
            0.0
        };
        for out in frame.iter_mut() {
            *out = value;
        }
    }
}

/// Maps a normalized [0,1] seek fraction to an absolute position.
///
/// The fraction is clamped into range; the result is capped at the maximum
/// allowed duration.
fn seek_target(fraction: f64, duration: Duration, max_duration: Duration) -> Duration {
    let clamped = fraction.clamp(0.0, 1.0);
    Duration::from_secs_f64(clamped * duration.as_secs_f64()).min(max_duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_half_is_midpoint() {
        let d = Duration::from_secs(10);
        let max = Duration::from_secs(120);
        assert_eq!(seek_target(0.5, d, max), Duration::from_secs(5));
    }

    #[test]
    fn test_seek_fraction_is_clamped() {
        let d = Duration::from_secs(10);
        let max = Duration::from_secs(120);
        assert_eq!(seek_target(1.7, d, max), Duration::from_secs(10));
        assert_eq!(seek_target(-0.3, d, max), Duration::ZERO);
    }

    #[test]
    fn test_seek_capped_at_max_duration() {
        // Clip longer than the allowed maximum: positions clamp to the max.
        let d = Duration::from_secs(200);
        let max = Duration::from_secs(120);
        assert_eq!(seek_target(1.0, d, max), Duration::from_secs(120));
        assert_eq!(seek_target(0.5, d, max), Duration::from_secs(100));
    }

    #[test]
    fn test_fill_output_advances_and_finishes() {
        let shared = PlaybackShared {
            frames: AtomicU64::new(0),
            playing: AtomicBool::new(true),
        };
        let samples: Vec<i16> = vec![i16::MAX; 4];
        let mut data = vec![0.0f32; 12]; // 6 stereo frames, clip has 4

        fill_output(&mut data, 2, &shared, &samples, 16000, 16000);

        // First four frames carry the sample on both channels, rest silence
        assert!((data[0] - samples[0] as f32 / 32768.0).abs() < 1e-6);
        assert_eq!(data[0], data[1]);
        assert_eq!(&data[8..], &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(shared.frames.load(Ordering::Relaxed), 4);
        assert!(!shared.playing.load(Ordering::Relaxed));
    }

    #[test]
    fn test_fill_output_silent_while_paused() {
        let shared = PlaybackShared {
            frames: AtomicU64::new(0),
            playing: AtomicBool::new(false),
        };
        let samples: Vec<i16> = vec![i16::MAX; 8];
        let mut data = vec![1.0f32; 8];

        fill_output(&mut data, 1, &shared, &samples, 16000, 16000);

        assert!(data.iter().all(|&s| s == 0.0));
        assert_eq!(shared.frames.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_fill_output_resamples_by_index() {
        let shared = PlaybackShared {
            frames: AtomicU64::new(0),
            playing: AtomicBool::new(true),
        };
        // Clip at half the output rate: each clip sample covers two frames
        let samples: Vec<i16> = vec![100, 200];
        let mut data = vec![0.0f32; 4];

        fill_output(&mut data, 1, &shared, &samples, 8000, 16000);

        assert!((data[0] - 100.0 / 32768.0).abs() < 1e-6);
        assert!((data[1] - 100.0 / 32768.0).abs() < 1e-6);
        assert!((data[2] - 200.0 / 32768.0).abs() < 1e-6);
        assert!((data[3] - 200.0 / 32768.0).abs() < 1e-6);
    }
}
