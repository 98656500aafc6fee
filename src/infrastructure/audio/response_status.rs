use std::time::Duration;

use reqwest::StatusCode;

use crate::application::ports::TranscriptionError;

/// Maps a non-success HTTP status from a transcription service onto the error classes the
/// retry controller understands.
pub(super) fn classify_status(status: StatusCode, body: String, timeout: Duration) -> TranscriptionError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => TranscriptionError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TranscriptionError::Timeout(timeout)
        }
        StatusCode::NOT_FOUND => TranscriptionError::AudioUnavailable(body),
        s if s.is_server_error() => {
            TranscriptionError::ServiceUnavailable(format!("status {}: {}", s, body))
        }
        s => TranscriptionError::Rejected(format!("status {}: {}", s, body)),
    }
}

pub(super) fn classify_send_error(error: reqwest::Error, timeout: Duration) -> TranscriptionError {
    if error.is_timeout() {
        TranscriptionError::Timeout(timeout)
    } else {
        TranscriptionError::ServiceUnavailable(format!("request: {}", error))
    }
}
