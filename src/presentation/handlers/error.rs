use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::JobServiceError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn job_service_error_response(error: JobServiceError) -> Response {
    let status = match &error {
        JobServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        JobServiceError::AlreadyRunning(_) => StatusCode::CONFLICT,
        JobServiceError::Pipeline(_)
        | JobServiceError::Repository(_)
        | JobServiceError::Staging(_) => {
            tracing::error!(error = %error, "Job operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, error.to_string())
}
