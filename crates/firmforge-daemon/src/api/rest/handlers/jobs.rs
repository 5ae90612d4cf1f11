//! Job status, download and cleanup handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use firmforge_types::{JobId, JobStatus, JobSummary};
use serde::{Deserialize, Serialize};

const JOB_NOT_FOUND: &str = "Job not found or expired";

/// Identifiers that cannot name a job are reported like unknown jobs.
fn job_id(raw: &str) -> Option<JobId> {
    JobId::parse(raw).ok()
}

/// Job status response
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_name: Option<String>,
}

impl JobStatusResponse {
    fn with_message(status: &JobStatus, message: impl Into<String>) -> Self {
        Self {
            status: status.as_str().to_string(),
            message: Some(message.into()),
            errors: None,
            firmware_url: None,
            firmware_size: None,
            firmware_name: None,
        }
    }

    fn from_status(id: &str, status: JobStatus) -> Self {
        match &status {
            JobStatus::NotFound => Self::with_message(&status, JOB_NOT_FOUND),
            JobStatus::Compiling => Self::with_message(&status, "Compilation in progress"),
            JobStatus::PendingOrFailed => Self::with_message(&status, "No firmware found"),
            JobStatus::Failed { message, errors } => Self {
                errors: errors.clone(),
                ..Self::with_message(&status, message.clone())
            },
            JobStatus::Completed { artifact } => Self {
                status: status.as_str().to_string(),
                message: None,
                errors: None,
                firmware_url: Some(format!("/download/{}", id)),
                firmware_size: Some(artifact.size),
                firmware_name: Some(artifact.name.clone()),
            },
        }
    }
}

/// Check a job's status
pub async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let status = match job_id(&id) {
        Some(job_id) => state.jobs.status(&job_id).await?,
        None => JobStatus::NotFound,
    };

    Ok(Json(JobStatusResponse::from_status(&id, status)))
}

/// Download the located firmware artifact
pub async fn download_firmware(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let job_id = job_id(&id).ok_or_else(|| ApiError::NotFound(JOB_NOT_FOUND.to_string()))?;
    let download = state.jobs.artifact(&job_id).await?;

    tracing::debug!(
        job_id = %job_id,
        file = %download.name,
        size = download.bytes.len(),
        "Serving firmware"
    );

    Ok(attachment("application/octet-stream", &download.name, download.bytes))
}

/// Download the whole build directory as a ZIP
pub async fn download_all(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let job_id = job_id(&id).ok_or_else(|| ApiError::NotFound(JOB_NOT_FOUND.to_string()))?;
    let (name, bytes) = state.jobs.archive(&job_id).await?;

    Ok(attachment("application/zip", &name, bytes))
}

fn attachment(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name.replace('"', "")),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Cleanup response
#[derive(Debug, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a job's workspace; deleting twice is not an error
pub async fn cleanup_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CleanupResponse>> {
    let removed = match job_id(&id) {
        Some(job_id) => state.jobs.cleanup(&job_id).await?,
        None => false,
    };

    let response = if removed {
        CleanupResponse {
            success: true,
            message: format!("Job {} cleaned up", id),
        }
    } else {
        CleanupResponse {
            success: false,
            message: "Job not found".to_string(),
        }
    };

    Ok(Json(response))
}

/// Job listing response
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub count: usize,
    pub jobs: Vec<JobSummary>,
}

/// List known jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<JobListResponse>> {
    let jobs = state.jobs.list().await?;
    Ok(Json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}
