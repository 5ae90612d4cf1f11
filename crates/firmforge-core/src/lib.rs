//! Firmforge Core - compile-job orchestration
//!
//! Turns a compile request into a firmware artifact:
//!
//! - **registry**: board alias -> (platform, board, framework)
//! - **workspace**: per-job directory with sources and a `platformio.ini`
//! - **invoker**: bounded, killable run of the external toolchain
//! - **locator**: finds the produced binary in the build directory
//! - **lifecycle**: job ledger, build tasks, status, downloads, cleanup
//! - **retention**: periodic removal of expired jobs

#![deny(unsafe_code)]

pub mod archive;
pub mod error;
pub mod invoker;
pub mod lifecycle;
pub mod locator;
pub mod manifest;
pub mod output;
pub mod registry;
pub mod request;
pub mod retention;
pub mod store;
pub mod workspace;

pub use error::{InvokeError, JobError, JobResult, StoreError, StoreResult, WorkspaceError};
pub use invoker::{BuildInvoker, InvocationOutput, ToolchainConfig, ToolchainInfo};
pub use lifecycle::{
    ArtifactDownload, JobManager, SubmittedJob, SweepStats, DEFAULT_MAX_CONCURRENT_BUILDS,
};
pub use manifest::BuildManifest;
pub use registry::{TargetEntry, TargetRegistry};
pub use request::{split_list, CompileRequest, SourceBundle};
pub use retention::{Reaper, RetentionPolicy};
pub use store::{DiskJobStore, JobStore, StoredJob};
pub use workspace::{Workspace, WorkspaceBuilder};
