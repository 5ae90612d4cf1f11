//! Service info, health and toolchain handlers

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use firmforge_core::ToolchainInfo;
use serde::Serialize;
use std::collections::BTreeMap;

/// Service description
#[derive(Debug, Serialize)]
pub struct ServiceInfoResponse {
    pub name: String,
    pub version: String,
    pub uptime: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// Root endpoint with the endpoint index
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfoResponse> {
    let endpoints = BTreeMap::from([
        ("GET /", "API info"),
        ("GET /health", "Health check"),
        ("GET /boards", "List all supported boards"),
        ("GET /platforms", "List installed platforms"),
        ("POST /compile", "Compile code (JSON body)"),
        ("POST /compile/upload", "Compile uploaded files"),
        ("POST /jobs", "Start a compile without waiting"),
        ("GET /jobs", "List known jobs"),
        ("GET /status/{job_id}", "Check compilation status"),
        ("GET /download/{job_id}", "Download compiled firmware"),
        ("GET /download/{job_id}/all", "Download the build directory as ZIP"),
        ("DELETE /cleanup/{job_id}", "Clean up job files"),
    ]);

    Json(ServiceInfoResponse {
        name: "Firmforge Compiler API".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        endpoints,
    })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub platformio: ToolchainInfo,
    pub version: String,
    pub uptime: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Health check endpoint; healthy iff the toolchain answers `--version`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let toolchain = state.jobs.invoker().probe().await;
    let status = if toolchain.available {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        platformio: toolchain,
        version: state.version.clone(),
        uptime: state.uptime(),
        timestamp: chrono::Utc::now(),
    })
}

/// Installed platforms response
#[derive(Debug, Serialize)]
pub struct PlatformsResponse {
    pub platforms: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// List platforms installed in the toolchain
pub async fn list_platforms(State(state): State<AppState>) -> Json<PlatformsResponse> {
    let response = match state.jobs.invoker().installed_platforms().await {
        Ok(out) if out.success() => PlatformsResponse {
            platforms: out.stdout,
            success: true,
            error: None,
        },
        Ok(out) => PlatformsResponse {
            platforms: out.stdout,
            success: false,
            error: Some(out.stderr),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Could not list toolchain platforms");
            PlatformsResponse {
                platforms: String::new(),
                success: false,
                error: Some(e.to_string()),
            }
        }
    };

    Json(response)
}
