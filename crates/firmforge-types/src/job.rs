//! Job lifecycle types
//!
//! A job owns one workspace. Internally it moves through
//! `Compiling -> Succeeded | Failed`, and is deleted either explicitly, by the
//! failure-path cleanup, or by the retention sweep.

use crate::JobId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Located build artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// File name, e.g. `firmware.hex`
    pub name: String,

    /// Absolute path inside the job workspace (never exposed to clients)
    #[serde(skip)]
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,
}

impl ArtifactRef {
    /// Extension of the artifact file, lower-cased.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Why a build produced no artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The toolchain ran and exited unsuccessfully
    Build { exit_code: Option<i32> },

    /// The toolchain exceeded the wall-clock limit and was killed
    Timeout { secs: u64 },

    /// The toolchain could not be started at all
    Launch { reason: String },
}

/// Result of one compile job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileReport {
    pub job_id: JobId,
    pub success: bool,
    pub message: String,

    /// Trailing part of the toolchain's stdout
    pub stdout: String,

    /// Trailing part of stderr, or a synthetic diagnostic; only on failure
    pub stderr: Option<String>,

    /// Artifact located after a successful build, if any
    pub artifact: Option<ArtifactRef>,

    /// Failure classification when `success` is false
    pub failure: Option<FailureKind>,

    /// Wall-clock duration of the toolchain run
    pub elapsed_ms: u64,
}

/// Internally tracked job phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Compiling,
    Succeeded,
    Failed,
}

/// Externally visible job state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Never created, already deleted, or unknown identifier
    NotFound,

    /// The build task is still running
    Compiling,

    /// An artifact was located
    Completed { artifact: ArtifactRef },

    /// The build finished without an artifact
    Failed {
        message: String,
        errors: Option<String>,
    },

    /// A workspace exists but holds no artifact and no build is tracked for it
    PendingOrFailed,
}

impl JobStatus {
    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::NotFound => "not_found",
            JobStatus::Compiling => "compiling",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed { .. } => "failed",
            JobStatus::PendingOrFailed => "pending_or_failed",
        }
    }
}

/// Listing entry for a known job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: JobId,

    /// Board alias the job was submitted for, when tracked
    pub target: Option<String>,

    /// Tracked phase; `None` for workspaces found on disk only
    pub phase: Option<JobPhase>,

    /// Whether the job still owns a workspace
    pub has_workspace: bool,

    /// Last time the job changed
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(JobStatus::NotFound.as_str(), "not_found");
        assert_eq!(JobStatus::Compiling.as_str(), "compiling");
        assert_eq!(JobStatus::PendingOrFailed.as_str(), "pending_or_failed");
        assert_eq!(
            JobStatus::Failed {
                message: "Compilation failed".to_string(),
                errors: None
            }
            .as_str(),
            "failed"
        );
    }

    #[test]
    fn test_artifact_path_not_serialized() {
        let artifact = ArtifactRef {
            name: "firmware.hex".to_string(),
            path: PathBuf::from("/tmp/x/.pio/build/target/firmware.hex"),
            size: 42,
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["name"], "firmware.hex");
        assert_eq!(json["size"], 42);
        assert!(json.get("path").is_none());
        assert_eq!(artifact.extension().as_deref(), Some("hex"));
    }

    #[test]
    fn test_failure_kind_tagging() {
        let json = serde_json::to_value(FailureKind::Timeout { secs: 300 }).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["secs"], 300);
    }
}
