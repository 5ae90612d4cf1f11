//! Job identifiers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of generated job identifiers.
pub const GENERATED_ID_LEN: usize = 8;

/// Upper bound on the length of identifiers accepted from callers.
pub const MAX_ID_LEN: usize = 64;

/// Opaque, short, globally unique job identifier.
///
/// Identifiers double as directory names inside the job store, so parsing only
/// admits ASCII alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

/// Rejected job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid job ID: {0:?}")]
pub struct InvalidJobId(pub String);

impl JobId {
    /// Generate a fresh identifier from a v4 UUID.
    pub fn generate() -> Self {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(GENERATED_ID_LEN);
        Self(id)
    }

    /// Parse an identifier supplied by a caller.
    pub fn parse(raw: &str) -> Result<Self, InvalidJobId> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidJobId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
