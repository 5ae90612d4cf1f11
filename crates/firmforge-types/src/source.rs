//! Uploaded source files

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extension sketch files are renamed to once they are known to hold an
/// entry point.
pub const CANONICAL_SOURCE_EXTENSION: &str = "cpp";

/// A logical input file: a name and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Role derived from the file extension.
    pub fn role(&self) -> SourceRole {
        SourceRole::from_name(&self.name)
    }
}

/// Role of a source file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    /// `.h` / `.hpp`, placed in the include directory
    Header,
    /// `.c` / `.cpp`, scanned for an entry point
    Source,
    /// `.ino`, scanned and renamed to `.cpp` when it holds an entry point
    Sketch,
    /// Anything else, copied into the source directory untouched
    Other,
}

impl SourceRole {
    pub fn from_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("h") | Some("hpp") => SourceRole::Header,
            Some("c") | Some("cpp") => SourceRole::Source,
            Some("ino") => SourceRole::Sketch,
            _ => SourceRole::Other,
        }
    }

    /// Whether files of this role are searched for entry-point signatures.
    pub fn is_scanned(&self) -> bool {
        matches!(self, SourceRole::Source | SourceRole::Sketch)
    }

    pub fn is_header(&self) -> bool {
        matches!(self, SourceRole::Header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_by_extension() {
        assert_eq!(SourceRole::from_name("pins.h"), SourceRole::Header);
        assert_eq!(SourceRole::from_name("Driver.HPP"), SourceRole::Header);
        assert_eq!(SourceRole::from_name("main.cpp"), SourceRole::Source);
        assert_eq!(SourceRole::from_name("util.c"), SourceRole::Source);
        assert_eq!(SourceRole::from_name("Blink.INO"), SourceRole::Sketch);
        assert_eq!(SourceRole::from_name("notes.txt"), SourceRole::Other);
        assert_eq!(SourceRole::from_name("Makefile"), SourceRole::Other);
    }

    #[test]
    fn test_scanned_roles() {
        assert!(SourceRole::Source.is_scanned());
        assert!(SourceRole::Sketch.is_scanned());
        assert!(!SourceRole::Header.is_scanned());
        assert!(!SourceRole::Other.is_scanned());
    }
}
