//! Compile request types

use firmforge_types::SourceFile;

/// Sources submitted with a compile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBundle {
    /// One source body, written as `src/main.cpp`
    Single(String),

    /// Uploaded files; at least one must hold an entry point
    Files(Vec<SourceFile>),
}

/// A request to compile sources for a board alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Board alias, resolved through the target registry
    pub board: String,
    pub sources: SourceBundle,
    pub libraries: Vec<String>,
    pub flags: Vec<String>,
}

impl CompileRequest {
    pub fn single(board: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            sources: SourceBundle::Single(code.into()),
            libraries: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn files(board: impl Into<String>, files: Vec<SourceFile>) -> Self {
        Self {
            board: board.into(),
            sources: SourceBundle::Files(files),
            libraries: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn with_libraries(mut self, libraries: Vec<String>) -> Self {
        self.libraries = libraries;
        self
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }
}

/// Split a comma-separated form field into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" Wire, SPI ,,Servo "), vec!["Wire", "SPI", "Servo"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_builders() {
        let req = CompileRequest::single("uno", "void setup(){}")
            .with_libraries(vec!["Wire".into()])
            .with_flags(vec!["-DDEBUG".into()]);
        assert_eq!(req.board, "uno");
        assert_eq!(req.libraries, vec!["Wire"]);
        assert_eq!(req.flags, vec!["-DDEBUG"]);
        assert!(matches!(req.sources, SourceBundle::Single(_)));
    }
}
