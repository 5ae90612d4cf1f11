//! Workspace builder
//!
//! Materializes the isolated directory tree a job compiles in:
//!
//! ```text
//! <root>/<job_id>/
//!   platformio.ini
//!   include/      headers
//!   src/          everything else
//!   .pio/build/target/   toolchain output (written by the toolchain)
//! ```

use crate::error::{StoreError, WorkspaceError};
use crate::manifest::{BuildManifest, ENV_NAME, MANIFEST_FILE};
use crate::request::SourceBundle;
use crate::store::JobStore;
use firmforge_types::source::CANONICAL_SOURCE_EXTENSION;
use firmforge_types::{JobId, SourceFile, SourceRole, TargetConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Substrings that mark a file as holding the program entry point.
pub const ENTRY_POINT_SIGNATURES: &[&str] = &["void setup(", "void loop(", "int main("];

/// File the single-body request path writes.
pub const DEFAULT_SOURCE_FILE: &str = "main.cpp";

const SOURCE_DIR: &str = "src";
const INCLUDE_DIR: &str = "include";

/// Attempts at allocating a fresh identifier before giving up.
const ALLOCATE_ATTEMPTS: usize = 3;

/// Paths of one job's workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    job_id: JobId,
    root: PathBuf,
}

impl Workspace {
    pub fn new(job_id: JobId, root: impl Into<PathBuf>) -> Self {
        Self {
            job_id,
            root: root.into(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIR)
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join(INCLUDE_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Directory the toolchain writes artifacts to.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(".pio").join("build").join(ENV_NAME)
    }

    /// Subdirectories every workspace starts with.
    pub(crate) fn skeleton_dirs(&self) -> [PathBuf; 2] {
        [self.src_dir(), self.include_dir()]
    }
}

/// Whether decoded source text contains an entry-point signature.
///
/// This is a plain substring search, so a signature inside a comment or a
/// string literal also counts.
pub fn has_entry_point(text: &str) -> bool {
    ENTRY_POINT_SIGNATURES.iter().any(|sig| text.contains(sig))
}

/// Final path component of an uploaded name. `Ok(None)` means the entry
/// carried no name at all and is skipped.
fn upload_file_name(raw: &str) -> Result<Option<&str>, WorkspaceError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match raw.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => Ok(Some(name)),
        _ => Err(WorkspaceError::InvalidFileName(raw.to_string())),
    }
}

/// Creates and populates job workspaces in a [`JobStore`].
#[derive(Clone)]
pub struct WorkspaceBuilder {
    store: Arc<dyn JobStore>,
}

impl WorkspaceBuilder {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Allocate a fresh job identifier and its empty workspace.
    pub async fn allocate(&self) -> Result<Workspace, WorkspaceError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let job_id = JobId::generate();
            match self.store.create(&job_id).await {
                Ok(workspace) => return Ok(workspace),
                Err(StoreError::AlreadyExists(id)) if attempt < ALLOCATE_ATTEMPTS => {
                    tracing::debug!(job_id = %id, "Job ID collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Allocate and populate a workspace. Any failure discards whatever was
    /// already written before the error is returned.
    pub async fn create(
        &self,
        target: TargetConfig,
        sources: &SourceBundle,
        libraries: &[String],
        flags: &[String],
    ) -> Result<Workspace, WorkspaceError> {
        let workspace = self.allocate().await?;

        if let Err(err) = self.populate(&workspace, target, sources, libraries, flags).await {
            tracing::debug!(
                job_id = %workspace.job_id(),
                error = %err,
                "Discarding partially written workspace"
            );
            if let Err(e) = self.store.delete(workspace.job_id()).await {
                tracing::warn!(
                    job_id = %workspace.job_id(),
                    error = %e,
                    "Failed to discard workspace"
                );
            }
            return Err(err);
        }

        tracing::info!(
            job_id = %workspace.job_id(),
            target = %target,
            libraries = libraries.len(),
            flags = flags.len(),
            "Workspace created"
        );
        Ok(workspace)
    }

    /// Write sources and manifest into an allocated workspace.
    ///
    /// Entry-point validation for multi-file bundles happens after every file
    /// is written, so on `MissingEntryPoint` the workspace is left partially
    /// populated and the caller must discard it.
    pub async fn populate(
        &self,
        workspace: &Workspace,
        target: TargetConfig,
        sources: &SourceBundle,
        libraries: &[String],
        flags: &[String],
    ) -> Result<(), WorkspaceError> {
        match sources {
            SourceBundle::Single(code) => {
                let path = workspace.src_dir().join(DEFAULT_SOURCE_FILE);
                write_file(&path, code.as_bytes()).await?;
            }
            SourceBundle::Files(files) => {
                if !write_files(workspace, files).await? {
                    return Err(WorkspaceError::MissingEntryPoint);
                }
            }
        }

        let manifest = BuildManifest::new(target, libraries, flags).render();
        write_file(&workspace.manifest_path(), manifest.as_bytes()).await
    }
}

/// Write uploaded files; returns whether any of them holds an entry point.
async fn write_files(workspace: &Workspace, files: &[SourceFile]) -> Result<bool, WorkspaceError> {
    let mut found_entry_point = false;

    for file in files {
        let Some(name) = upload_file_name(&file.name)? else {
            continue;
        };

        let role = SourceRole::from_name(name);
        let dest_dir = if role.is_header() {
            workspace.include_dir()
        } else {
            workspace.src_dir()
        };

        let dest = dest_dir.join(name);
        write_file(&dest, &file.content).await?;

        if !role.is_scanned() || !has_entry_point(&String::from_utf8_lossy(&file.content)) {
            continue;
        }
        found_entry_point = true;

        if role == SourceRole::Sketch {
            let renamed = dest.with_extension(CANONICAL_SOURCE_EXTENSION);
            tokio::fs::rename(&dest, &renamed)
                .await
                .map_err(|e| WorkspaceError::io(&dest, e))?;
            tracing::debug!(from = %dest.display(), to = %renamed.display(), "Renamed sketch");
        }
    }

    Ok(found_entry_point)
}

async fn write_file(path: &Path, content: &[u8]) -> Result<(), WorkspaceError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| WorkspaceError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DiskJobStore;
    use tempfile::TempDir;

    fn uno() -> TargetConfig {
        TargetConfig::new("atmelavr", "uno", "arduino")
    }

    fn builder(dir: &TempDir) -> (WorkspaceBuilder, Arc<DiskJobStore>) {
        let store = Arc::new(DiskJobStore::new(dir.path()));
        (WorkspaceBuilder::new(store.clone()), store)
    }

    #[test]
    fn test_entry_point_detection() {
        assert!(has_entry_point("void setup() {}\nvoid loop() {}"));
        assert!(has_entry_point("int main(void) { return 0; }"));
        assert!(has_entry_point("// void setup( in a comment"));
        assert!(!has_entry_point("int add(int a, int b);"));
        assert!(!has_entry_point("void setup_pins();"));
    }

    #[test]
    fn test_upload_file_name() {
        assert_eq!(upload_file_name("main.cpp").unwrap(), Some("main.cpp"));
        assert_eq!(upload_file_name("dir/sub/main.cpp").unwrap(), Some("main.cpp"));
        assert_eq!(upload_file_name("C:\\proj\\util.h").unwrap(), Some("util.h"));
        assert_eq!(upload_file_name("").unwrap(), None);
        assert!(upload_file_name("..").is_err());
        assert!(upload_file_name("src/").is_err());
    }

    #[tokio::test]
    async fn test_single_body_workspace() {
        let dir = TempDir::new().unwrap();
        let (builder, _) = builder(&dir);

        let sources = SourceBundle::Single("void setup(){}\nvoid loop(){}".to_string());
        let ws = builder.create(uno(), &sources, &[], &[]).await.unwrap();

        let main = std::fs::read_to_string(ws.src_dir().join("main.cpp")).unwrap();
        assert!(main.contains("void loop()"));
        assert!(ws.include_dir().is_dir());

        let manifest = std::fs::read_to_string(ws.manifest_path()).unwrap();
        assert!(manifest.starts_with("[env:target]\nplatform = atmelavr\n"));
    }

    #[tokio::test]
    async fn test_single_body_skips_entry_point_check() {
        let dir = TempDir::new().unwrap();
        let (builder, _) = builder(&dir);

        let sources = SourceBundle::Single("int helper() { return 1; }".to_string());
        assert!(builder.create(uno(), &sources, &[], &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_multi_file_placement_and_sketch_rename() {
        let dir = TempDir::new().unwrap();
        let (builder, _) = builder(&dir);

        let sources = SourceBundle::Files(vec![
            SourceFile::new("Blink.ino", "#include \"pins.h\"\nvoid setup(){}\nvoid loop(){}"),
            SourceFile::new("pins.h", "#define LED 13"),
            SourceFile::new("helper.ino", "int helper() { return 1; }"),
            SourceFile::new("util.c", "int util(void) { return 0; }"),
            SourceFile::new("", "ignored"),
        ]);
        let libs = vec!["Servo".to_string()];
        let ws = builder.create(uno(), &sources, &libs, &[]).await.unwrap();

        assert!(ws.src_dir().join("Blink.cpp").is_file());
        assert!(!ws.src_dir().join("Blink.ino").exists());
        // Sketches without an entry point keep their extension.
        assert!(ws.src_dir().join("helper.ino").is_file());
        assert!(ws.src_dir().join("util.c").is_file());
        assert!(ws.include_dir().join("pins.h").is_file());
        assert!(!ws.src_dir().join("pins.h").exists());

        let manifest = std::fs::read_to_string(ws.manifest_path()).unwrap();
        assert!(manifest.contains("lib_deps =\n    Servo\n"));
    }

    #[tokio::test]
    async fn test_headers_are_not_scanned_for_entry_points() {
        let dir = TempDir::new().unwrap();
        let (builder, _) = builder(&dir);

        let sources = SourceBundle::Files(vec![SourceFile::new("main.h", "int main();")]);
        let err = builder.create(uno(), &sources, &[], &[]).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::MissingEntryPoint));
    }

    #[tokio::test]
    async fn test_populate_leaves_partial_workspace_on_missing_entry_point() {
        let dir = TempDir::new().unwrap();
        let (builder, _) = builder(&dir);

        let ws = builder.allocate().await.unwrap();
        let sources =
            SourceBundle::Files(vec![SourceFile::new("lib.cpp", "int f() { return 2; }")]);
        let err = builder
            .populate(&ws, uno(), &sources, &[], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, WorkspaceError::MissingEntryPoint));
        assert!(ws.src_dir().join("lib.cpp").is_file());
        assert!(!ws.manifest_path().exists());
    }

    #[tokio::test]
    async fn test_create_discards_workspace_on_failure() {
        let dir = TempDir::new().unwrap();
        let (builder, store) = builder(&dir);

        let sources = SourceBundle::Files(vec![SourceFile::new("lib.cpp", "int f();")]);
        assert!(builder.create(uno(), &sources, &[], &[]).await.is_err());
        assert!(store.list().await.unwrap().is_empty());
    }
}
