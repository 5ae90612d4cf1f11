//! Job store
//!
//! Owns the mapping from job identifier to workspace. The lifecycle manager
//! only talks to the [`JobStore`] trait; local disk is the one backend today.

mod disk;
mod traits;

pub use disk::DiskJobStore;
pub use traits::{JobStore, StoredJob};
