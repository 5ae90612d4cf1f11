//! Hardware target descriptions

use serde::Serialize;

/// Resolved toolchain target for a board alias.
///
/// Instances only come out of the static target registry, so the fields borrow
/// from the table for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TargetConfig {
    /// Toolchain platform identifier (e.g. `atmelavr`)
    pub platform: &'static str,

    /// Board identifier understood by the platform (e.g. `uno`)
    pub board: &'static str,

    /// Framework identifier (e.g. `arduino`)
    pub framework: &'static str,
}

impl TargetConfig {
    pub const fn new(platform: &'static str, board: &'static str, framework: &'static str) -> Self {
        Self {
            platform,
            board,
            framework,
        }
    }
}

impl std::fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.platform, self.board, self.framework)
    }
}
