//! HTTP client for the feedback backend.
//!
//! Issues a single multipart POST to `{base_url}/predict` with the script
//! text and the recorded audio. No retry; any failure is terminal for the
//! attempt.

use super::{PredictResponse, SubmitError};
use crate::session::clip::EXPORT_FILE_NAME;

/// Submits one practice attempt to the backend.
///
/// The multipart body carries a `script` text field and an `audio` part with
/// the WAV bytes. The response JSON is returned as-is for the UI to surface.
///
/// # Errors
/// - [`SubmitError::Network`] if the request fails in transit
/// - [`SubmitError::Backend`] for non-2xx statuses (body logged, not parsed)
/// - [`SubmitError::InvalidResponse`] if a 2xx body cannot be decoded
pub async fn submit(
    base_url: &str,
    script: String,
    wav: Vec<u8>,
) -> Result<PredictResponse, SubmitError> {
    let client = reqwest::Client::new();

    let audio_part = reqwest::multipart::Part::bytes(wav)
        .file_name(EXPORT_FILE_NAME)
        .mime_str("audio/wav")
        .map_err(|e| SubmitError::Network(format!("failed to build audio part: {e}")))?;

    let form = reqwest::multipart::Form::new()
        .text("script", script)
        .part("audio", audio_part);

    let url = format!("{}/predict", base_url.trim_end_matches('/'));

    tracing::debug!(
        "Feedback API Call:\n  URL: {}\n  Method: POST\n  Content-Type: multipart/form-data\n  Body parts: script, audio ({})",
        url,
        EXPORT_FILE_NAME
    );

    let response = match client.post(&url).multipart(form).send().await {
        Ok(resp) => resp,
        Err(e) => {
            let error_msg = if e.is_connect() {
                "Failed to connect to the feedback backend. Check your network and the configured backend URL.".to_string()
            } else if e.is_timeout() {
                "Request to the feedback backend timed out.".to_string()
            } else {
                format!("{e}")
            };
            return Err(SubmitError::Network(error_msg));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("Backend error (status {}): {}", status, error_body);
        return Err(SubmitError::Backend {
            status: status.as_u16(),
        });
    }

    let feedback: PredictResponse = response
        .json()
        .await
        .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;

    tracing::info!(
        "Feedback received: {} characters for script of {} characters",
        feedback.message.len(),
        feedback.script.len()
    );

    Ok(feedback)
}
