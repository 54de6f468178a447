//! Microphone capture for a recording session.
//!
//! A session owns the live input stream and the accumulating sample buffer.
//! Audio is captured from the configured input device, converted to mono, and
//! finalized into a [`Clip`] when the session ends. One session exists at a
//! time; all acquired audio resources are released on finish.

use crate::session::Clip;
use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Reasons a capture session can fail. All are terminal for the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The platform refused microphone access.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),
    /// No usable input device, or the device disappeared.
    #[error("audio input device unavailable: {0}")]
    DeviceUnavailable(String),
    /// The capture stream could not be configured or started.
    #[error("audio capture failed: {0}")]
    Stream(String),
}

/// Records audio from a specified or default input device.
///
/// Features:
/// - Captures from a specified input device or system default at its native sample rate
/// - Converts multi-channel audio to mono by averaging channels
/// - Accepts i16 and f32 device formats
/// - Auto-stop guard after a configured maximum duration
pub struct RecordingSession {
    /// Actual recording sample rate from device
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
    /// Device name or "default" to use the system default device
    device_name: String,
    /// Wall-clock limit after which the session auto-stops
    max_duration: Duration,
}

impl RecordingSession {
    /// Creates a new session with requested sample rate and device.
    ///
    /// Note: The actual recording sample rate may differ based on device
    /// capabilities. Call `sample_rate()` after `start()` to get the actual rate.
    pub fn new(requested_sample_rate: u32, device_name: String, max_duration: Duration) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            device_name,
            max_duration,
        }
    }

    /// Starts capture from the configured input device.
    ///
    /// # Errors
    /// - [`SessionError::PermissionDenied`] if the platform refuses access
    /// - [`SessionError::DeviceUnavailable`] if no matching device exists
    /// - [`SessionError::Stream`] if the stream cannot be configured or started
    pub fn start(&mut self) -> Result<(), SessionError> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device().ok_or_else(|| {
                    SessionError::DeviceUnavailable("no input device available".to_string())
                })
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device
            .default_input_config()
            .map_err(|e| classify_stream_error(&e.to_string()))?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;
        let sample_format = device_config.sample_format();

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            device_sample_rate,
            num_channels,
            sample_format
        );

        // Update to actual device parameters
        self.sample_rate = device_sample_rate;

        let samples_arc = Arc::clone(&self.samples);
        let err_fn = |err: cpal::StreamError| {
            tracing::error!("Audio stream error: {}", err);
        };

        let stream = match sample_format {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &device_config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    push_mono(&samples_arc, data, num_channels);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &device_config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    push_mono(&samples_arc, &converted, num_channels);
                },
                err_fn,
                None,
            ),
            other => {
                return Err(SessionError::Stream(format!(
                    "unsupported device sample format: {other:?}"
                )))
            }
        }
        .map_err(|e| classify_stream_error(&e.to_string()))?;

        stream
            .play()
            .map_err(|e| classify_stream_error(&e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Returns true while the capture stream is live.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns a clone of all samples captured so far.
    pub fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    /// Returns the number of captured samples.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Returns the actual sample rate of the capture.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the recorded duration, derived from the sample count.
    pub fn elapsed(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.sample_count() as f64 / self.sample_rate as f64)
    }

    /// Returns true once the recording has reached the configured maximum
    /// duration. The practice loop stops the session when this trips.
    pub fn limit_reached(&self) -> bool {
        self.elapsed() >= self.max_duration
    }

    /// Stops capture, releases the stream, and finalizes the samples into a
    /// clip. Always releases resources, even for zero-length recordings.
    ///
    /// # Errors
    /// - If WAV encoding of the captured samples fails
    pub fn finish(mut self) -> Result<Clip> {
        // Dropping the stream stops capture and releases the device
        self.stream = None;

        let samples = std::mem::take(&mut *self.samples.lock().unwrap());
        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );

        Clip::from_samples(samples, self.sample_rate)
    }
}

/// Appends incoming device frames to the sample buffer, folding multi-channel
/// audio to mono by averaging all channels.
fn push_mono(samples_arc: &Arc<Mutex<Vec<i16>>>, data: &[i16], num_channels: usize) {
    let mut samples = samples_arc.lock().unwrap();

    match num_channels {
        0 => {}
        1 => {
            samples.extend_from_slice(data);
        }
        2 => {
            for chunk in data.chunks_exact(2) {
                let left = chunk[0] as i32;
                let right = chunk[1] as i32;
                samples.push(((left + right) / 2) as i16);
            }
        }
        _ => {
            for chunk in data.chunks_exact(num_channels) {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                samples.push((sum / num_channels as i32) as i16);
            }
        }
    }
}

/// Maps a backend error description to the session error kinds.
///
/// cpal reports platform permission refusals as backend-specific errors, so
/// classification goes by message content.
fn classify_stream_error(description: &str) -> SessionError {
    let lower = description.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        SessionError::PermissionDenied(description.to_string())
    } else if lower.contains("device") && (lower.contains("available") || lower.contains("found")) {
        SessionError::DeviceUnavailable(description.to_string())
    } else {
        SessionError::Stream(description.to_string())
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - A device name, or a numeric index (0, 1, 2, etc.)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device, SessionError> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| SessionError::DeviceUnavailable(format!("device enumeration failed: {e}")))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(SessionError::DeviceUnavailable(format!(
                "device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            )));
        }
    }

    // Try to find by name
    let devices = host
        .input_devices()
        .map_err(|e| SessionError::DeviceUnavailable(format!("device enumeration failed: {e}")))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(SessionError::DeviceUnavailable(format!(
        "audio input device '{device_spec}' not found. Use 'rhythm list-devices' to see available devices."
    )))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T, SessionError>
where
    F: FnOnce() -> Result<T, SessionError>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| SessionError::Stream(format!("failed to open /dev/null: {e}")))?;

    let dev_null_fd = dev_null.as_raw_fd();

    // Save the current stderr file descriptor
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(SessionError::Stream("failed to duplicate stderr".to_string()));
    }

    // Redirect stderr to /dev/null
    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(SessionError::Stream("failed to redirect stderr".to_string()));
    }

    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T, SessionError>
where
    F: FnOnce() -> Result<T, SessionError>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_mono_folds_stereo() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        push_mono(&samples, &[100, 200, -50, 50], 2);
        assert_eq!(*samples.lock().unwrap(), vec![150, 0]);
    }

    #[test]
    fn test_push_mono_passthrough() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        push_mono(&samples, &[1, 2, 3], 1);
        assert_eq!(*samples.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_push_mono_averages_multichannel() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        push_mono(&samples, &[30, 60, 90, 0, 0, 3], 3);
        assert_eq!(*samples.lock().unwrap(), vec![60, 1]);
    }

    #[test]
    fn test_classify_stream_error() {
        assert!(matches!(
            classify_stream_error("Operation not permitted: permission denied"),
            SessionError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_stream_error("the requested device is no longer available"),
            SessionError::DeviceUnavailable(_)
        ));
        assert!(matches!(
            classify_stream_error("invalid argument"),
            SessionError::Stream(_)
        ));
    }

    #[test]
    fn test_limit_reached_uses_sample_count() {
        let session =
            RecordingSession::new(16000, "default".to_string(), Duration::from_secs(2));
        assert!(!session.limit_reached());

        session
            .samples
            .lock()
            .unwrap()
            .extend(std::iter::repeat(0i16).take(32000));
        assert!(session.limit_reached());
    }

    #[test]
    fn test_finish_without_start_yields_empty_clip() {
        // A session whose start failed (or never ran) must still finalize
        // cleanly into a zero-length clip with no resources held.
        let session =
            RecordingSession::new(16000, "default".to_string(), Duration::from_secs(120));
        assert!(!session.is_active());

        let clip = session.finish().unwrap();
        assert!(clip.is_empty());
        assert_eq!(clip.sample_rate(), 16000);
    }
}
