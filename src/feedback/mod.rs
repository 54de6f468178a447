//! Submission of practice attempts to the feedback backend.
//!
//! Packages the script text and the recorded clip into a multipart request,
//! posts it to the inference backend, and surfaces the returned feedback.

pub mod client;

use crate::session::Clip;
use serde::Deserialize;
use thiserror::Error;

pub use client::submit;

/// Feedback returned by the backend for one practice attempt.
///
/// Fields are surfaced to the user verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    /// The backend's feedback on the delivery
    pub message: String,
    /// The script the feedback refers to
    pub script: String,
}

/// Ways a submission can fail.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Script and clip are both required before anything is sent.
    #[error("{0}")]
    Validation(&'static str),
    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status. The body is logged,
    /// not parsed.
    #[error("backend returned {status}")]
    Backend { status: u16 },
    /// A 2xx response that could not be decoded.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

/// Checks that a submission is possible: a non-empty script and a recorded,
/// non-empty clip. No network call happens unless this passes.
pub fn validate(script: &str, clip: Option<&Clip>) -> Result<(), SubmitError> {
    if script.trim().is_empty() {
        return Err(SubmitError::Validation(
            "Paste a script before submitting.",
        ));
    }
    match clip {
        None => Err(SubmitError::Validation(
            "Record audio before submitting.",
        )),
        Some(clip) if clip.is_empty() => Err(SubmitError::Validation(
            "The recording is empty. Record audio before submitting.",
        )),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(samples: usize) -> Clip {
        Clip::from_samples(vec![0i16; samples], 16000).unwrap()
    }

    #[test]
    fn test_validate_rejects_empty_script() {
        let c = clip(160);
        assert!(matches!(
            validate("", Some(&c)),
            Err(SubmitError::Validation(_))
        ));
        assert!(matches!(
            validate("   \n", Some(&c)),
            Err(SubmitError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_clip() {
        assert!(matches!(
            validate("To be or not to be", None),
            Err(SubmitError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_clip() {
        let c = clip(0);
        assert!(matches!(
            validate("To be or not to be", Some(&c)),
            Err(SubmitError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_accepts_script_and_clip() {
        let c = clip(160);
        assert!(validate("To be or not to be", Some(&c)).is_ok());
    }
}
