use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Serialize;

use super::error::{error_response, job_service_error_response};
use crate::application::services::UploadOutcome;
use crate::domain::AudioMetadata;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub id: String,
}

/// Accepts a `file` part and an optional `author` text part. The file name becomes the
/// recording's title.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut content: Option<Bytes> = None;
    let mut metadata = AudioMetadata::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(e.status(), format!("Failed to read multipart: {}", e));
            }
        };

        match field.name() {
            Some("file") => {
                metadata.title = field
                    .file_name()
                    .map(title_from_file_name)
                    .filter(|t| !t.is_empty());
                match field.bytes().await {
                    Ok(data) => content = Some(data),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read file bytes");
                        return error_response(e.status(), format!("Failed to read file: {}", e));
                    }
                }
            }
            Some("author") => {
                metadata.author = field
                    .text()
                    .await
                    .ok()
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty());
            }
            _ => {}
        }
    }

    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    tracing::debug!(bytes = content.len(), title = ?metadata.title, "File data received");

    match state.job_service.stage_upload(content, metadata).await {
        Ok(UploadOutcome::Stored { job_id, .. }) => (
            StatusCode::CREATED,
            Json(UploadResponse {
                status: "file_uploaded",
                id: job_id.to_string(),
            }),
        )
            .into_response(),
        Ok(UploadOutcome::TranscriptExists { job_id }) => (
            StatusCode::OK,
            Json(UploadResponse {
                status: "transcript_exists",
                id: job_id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => job_service_error_response(e),
    }
}

fn title_from_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}
