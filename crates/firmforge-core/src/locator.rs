//! Artifact locator
//!
//! Different platform/toolchain combinations name their outputs differently,
//! so the build directory is searched with an ordered set of conventions:
//!
//! 1. `firmware.hex`, `firmware.bin`, `firmware.elf`, first that exists
//! 2. any `*.hex`, then any `*.bin`, in file-name order
//!
//! Flashable formats win over debug images, and the conventional name wins
//! over anything else. Contents are never inspected.

use firmforge_types::ArtifactRef;
use std::path::Path;

/// Stem of the conventionally named artifact.
pub const FIRMWARE_STEM: &str = "firmware";

/// Extensions tried for the conventional name, in order.
pub const FIRMWARE_EXTENSIONS: &[&str] = &["hex", "bin", "elf"];

/// Extensions accepted for arbitrarily named artifacts, in order.
pub const FALLBACK_EXTENSIONS: &[&str] = &["hex", "bin"];

/// Search `build_dir` for the artifact. A missing directory is simply "not
/// found".
pub async fn locate(build_dir: &Path) -> Option<ArtifactRef> {
    for ext in FIRMWARE_EXTENSIONS {
        let candidate = build_dir.join(format!("{}.{}", FIRMWARE_STEM, ext));
        if let Some(artifact) = artifact_at(&candidate).await {
            return Some(artifact);
        }
    }

    let names = sorted_file_names(build_dir).await;
    for ext in FALLBACK_EXTENSIONS {
        for name in &names {
            let matches = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == *ext);
            if !matches {
                continue;
            }
            if let Some(artifact) = artifact_at(&build_dir.join(name)).await {
                return Some(artifact);
            }
        }
    }

    None
}

async fn artifact_at(path: &Path) -> Option<ArtifactRef> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    if !meta.is_file() {
        return None;
    }
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some(ArtifactRef {
        name,
        path: path.to_path_buf(),
        size: meta.len(),
    })
}

async fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return names;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    names
}
