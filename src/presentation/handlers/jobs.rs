use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::error::{error_response, job_service_error_response};
use crate::application::services::{JobMessage, SubmitOutcome};
use crate::domain::{JobId, JobRecord, JobStatus, SpeakerMappings, SpeakerSettings};
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    pub job_id: String,
    #[serde(default)]
    pub enable_speakers: Option<bool>,
    #[serde(default)]
    pub num_speakers: Option<i64>,
}

#[derive(Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: &'static str,
    pub job_status: JobStatus,
}

#[derive(Serialize)]
pub struct JobStatusResponse {
    #[serde(flatten)]
    pub record: JobRecord,
    pub running: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSpeakersRequest {
    pub speaker_mappings: SpeakerMappings,
}

#[tracing::instrument(skip(state, request), fields(job_id = %request.job_id))]
pub async fn submit_job_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> Response {
    let job_id = match parse_job_id(&request.job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let settings = SpeakerSettings::from_request(request.enable_speakers, request.num_speakers);

    match state.job_service.submit(job_id.clone(), settings, false).await {
        Ok(SubmitOutcome::TranscriptExists(job)) => (
            StatusCode::OK,
            Json(SubmitJobResponse {
                job_id: job.id.to_string(),
                status: "transcript_exists",
                job_status: job.status,
            }),
        )
            .into_response(),
        Ok(SubmitOutcome::Accepted(job)) => {
            if let Err(response) = enqueue(&state, job_id).await {
                return response;
            }
            (
                StatusCode::ACCEPTED,
                Json(SubmitJobResponse {
                    job_id: job.id.to_string(),
                    status: "accepted",
                    job_status: job.status,
                }),
            )
                .into_response()
        }
        Err(e) => job_service_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let job_id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_service.get_status(&job_id).await {
        Ok(record) => {
            let running = state.job_service.active_jobs().is_active(&job_id);
            (StatusCode::OK, Json(JobStatusResponse { record, running })).into_response()
        }
        Err(e) => job_service_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn resume_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let job_id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let record = match state.job_service.get_status(&job_id).await {
        Ok(record) => record,
        Err(e) => return job_service_error_response(e),
    };

    if record.status == JobStatus::Completed {
        return (
            StatusCode::OK,
            Json(JobStatusResponse {
                record,
                running: false,
            }),
        )
            .into_response();
    }

    if let Err(response) = enqueue(&state, job_id).await {
        return response;
    }
    (
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id: record.id.to_string(),
            status: "resuming",
            job_status: record.status,
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state, request))]
pub async fn update_speakers_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateSpeakersRequest>,
) -> Response {
    let job_id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .job_service
        .update_speaker_mappings(&job_id, request.speaker_mappings)
        .await
    {
        Ok(record) => (
            StatusCode::OK,
            Json(JobStatusResponse {
                record,
                running: false,
            }),
        )
            .into_response(),
        Err(e) => job_service_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let job_id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_service.delete(&job_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => job_service_error_response(e),
    }
}

fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    JobId::parse(raw)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", e.0)))
}

async fn enqueue(state: &AppState, job_id: JobId) -> Result<(), Response> {
    state
        .job_sender
        .send(JobMessage {
            job_id: job_id.clone(),
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to enqueue job");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Job queue full or worker unavailable",
            )
        })?;

    tracing::info!(job_id = %job_id, "Job enqueued");
    Ok(())
}
