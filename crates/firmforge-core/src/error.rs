//! Error types for firmforge-core.
//!
//! Validation problems, toolchain problems and filesystem problems are kept
//! apart so callers can map them to distinct responses.

use firmforge_types::{InvalidJobId, JobId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while materializing a job workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No uploaded source file contained a setup/loop or main signature.
    #[error("no main entry point found")]
    MissingEntryPoint,

    /// An uploaded file name has no usable final path component.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    /// Filesystem failure while writing the workspace.
    #[error("workspace I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job store could not allocate the workspace.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkspaceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkspaceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while running the external toolchain.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The toolchain executable could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The toolchain ran past the wall-clock limit and was killed.
    #[error("Compile timeout (exceeded {secs} seconds)")]
    Timeout {
        secs: u64,
        /// Stdout buffered before the process was killed
        stdout: String,
    },

    /// Waiting on the running toolchain failed.
    #[error("toolchain I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a job store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Workspace for this job already exists.
    #[error("workspace already exists for job {0}")]
    AlreadyExists(JobId),

    /// Directory entry that cannot be a job.
    #[error(transparent)]
    InvalidId(#[from] InvalidJobId),

    /// Backend I/O failure.
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Job-level errors surfaced to callers of the lifecycle manager.
#[derive(Debug, Error)]
pub enum JobError {
    /// Board alias is not in the target registry.
    #[error("Unsupported board: {0}")]
    UnknownTarget(String),

    /// Multi-file submission without any entry point.
    #[error("No main entry point found. Ensure your code has setup()/loop() or main() function.")]
    MissingEntryPoint,

    /// Uploaded file name rejected.
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// Job (or its artifact) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Filesystem failure while preparing or reading a job.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Store backend failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The build task ended without reporting, e.g. the job was deleted
    /// while compiling.
    #[error("Job {0} was cancelled before it finished")]
    Abandoned(JobId),
}

impl JobError {
    /// Whether the error is a problem with the request itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            JobError::UnknownTarget(_) | JobError::MissingEntryPoint | JobError::InvalidFileName(_)
        )
    }
}

impl From<WorkspaceError> for JobError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::MissingEntryPoint => JobError::MissingEntryPoint,
            WorkspaceError::InvalidFileName(name) => JobError::InvalidFileName(name),
            WorkspaceError::Store(e) => JobError::Store(e),
            io @ WorkspaceError::Io { .. } => JobError::Resource(io.to_string()),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_errors_map_to_job_errors() {
        assert!(matches!(
            JobError::from(WorkspaceError::MissingEntryPoint),
            JobError::MissingEntryPoint
        ));

        let io = WorkspaceError::io("/tmp/x", std::io::Error::other("disk full"));
        match JobError::from(io) {
            JobError::Resource(msg) => assert!(msg.contains("disk full")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_validation_classification() {
        assert!(JobError::UnknownTarget("x".into()).is_validation());
        assert!(JobError::MissingEntryPoint.is_validation());
        assert!(!JobError::NotFound("x".into()).is_validation());
        assert!(!JobError::Resource("x".into()).is_validation());
    }

    #[test]
    fn test_timeout_message() {
        let err = InvokeError::Timeout {
            secs: 300,
            stdout: String::new(),
        };
        assert_eq!(err.to_string(), "Compile timeout (exceeded 300 seconds)");
    }
}
