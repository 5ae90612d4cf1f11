//! Firmforge Types - Core types for firmware compile jobs
//!
//! Firmforge accepts embedded-firmware sources over HTTP, compiles them for a
//! fixed set of hardware targets with an external toolchain, and hands back
//! the resulting binary.
//!
//! ## Key Concepts
//!
//! - **TargetConfig**: resolved (platform, board, framework) triple for an alias
//! - **SourceFile**: one uploaded file, classified into a [`SourceRole`]
//! - **JobId**: short opaque identifier owning one workspace
//! - **CompileReport**: the outcome of one build, with bounded diagnostics
//! - **JobStatus**: the externally visible state of a job

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod ids;
pub mod job;
pub mod source;
pub mod target;

pub use ids::{InvalidJobId, JobId};
pub use job::{ArtifactRef, CompileReport, FailureKind, JobPhase, JobStatus, JobSummary};
pub use source::{SourceFile, SourceRole};
pub use target::TargetConfig;
