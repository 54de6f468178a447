//! Recording session feature for rhythm.
//!
//! Provides microphone capture, clip finalization, real-time frequency
//! analysis, and playback of finalized clips.

pub mod clip;
pub mod playback;
pub mod recorder;
pub mod spectrum;
pub mod takes;

pub use clip::Clip;
pub use playback::PlaybackController;
pub use recorder::{RecordingSession, SessionError};
pub use spectrum::SpectrumAnalyzer;
pub use takes::TakeArchive;
