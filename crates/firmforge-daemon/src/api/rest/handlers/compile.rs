//! Compile handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use firmforge_core::{split_list, CompileRequest};
use firmforge_types::{CompileReport, SourceFile};
use serde::{Deserialize, Serialize};

/// JSON compile request
#[derive(Debug, Deserialize)]
pub struct CompileCodeRequest {
    pub board: String,
    pub code: String,
    #[serde(default)]
    pub libraries: Option<Vec<String>>,
    #[serde(default)]
    pub build_flags: Option<Vec<String>>,
}

impl From<CompileCodeRequest> for CompileRequest {
    fn from(req: CompileCodeRequest) -> Self {
        CompileRequest::single(req.board, req.code)
            .with_libraries(req.libraries.unwrap_or_default())
            .with_flags(req.build_flags.unwrap_or_default())
    }
}

/// Outcome of a synchronous compile
#[derive(Debug, Serialize, Deserialize)]
pub struct CompileResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_size: Option<u64>,
}

impl From<CompileReport> for CompileResponse {
    fn from(report: CompileReport) -> Self {
        let firmware_url = report
            .success
            .then(|| format!("/download/{}", report.job_id));

        Self {
            success: report.success,
            message: report.message,
            job_id: Some(report.job_id.to_string()),
            output: Some(report.stdout),
            errors: report.stderr,
            firmware_url,
            firmware_size: report.artifact.map(|a| a.size),
        }
    }
}

/// Compile a single source body and wait for the result
pub async fn compile_code(
    State(state): State<AppState>,
    Json(request): Json<CompileCodeRequest>,
) -> ApiResult<Json<CompileResponse>> {
    let report = state.jobs.compile(request.into()).await?;
    Ok(Json(report.into()))
}

/// Compile uploaded files and wait for the result
///
/// Form fields: `board`, `libraries` and `build_flags` (comma separated), and
/// one or more `files`.
pub async fn compile_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<CompileResponse>> {
    let mut board = None;
    let mut libraries = Vec::new();
    let mut flags = Vec::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        ApiError::BadRequest(format!("Failed to read {}: {}", file_name, e))
                    })?;
                files.push(SourceFile::new(file_name, content.to_vec()));
            }
            "board" | "libraries" | "build_flags" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid field {}: {}", name, e)))?;
                match name.as_str() {
                    "board" => board = Some(value),
                    "libraries" => libraries = split_list(&value),
                    _ => flags = split_list(&value),
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let board = board.ok_or_else(|| ApiError::BadRequest("Missing form field: board".to_string()))?;
    if files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    let request = CompileRequest::files(board, files)
        .with_libraries(libraries)
        .with_flags(flags);
    let report = state.jobs.compile(request).await?;
    Ok(Json(report.into()))
}

/// Accepted asynchronous job
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: String,
    pub status_url: String,
}

/// Start a compile and return immediately; poll `/status/{job_id}`
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<CompileCodeRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    let submitted = state.jobs.submit(request.into()).await?;
    let job_id = submitted.job_id.to_string();

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            status_url: format!("/status/{}", job_id),
            job_id,
            status: "compiling".to_string(),
        }),
    ))
}
