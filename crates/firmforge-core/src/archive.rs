//! Zip bundles of a job's build output

use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// Zip every regular file under `dir`, named relative to `dir`.
pub fn zip_dir(dir: &Path) -> io::Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();

    for path in files {
        let name = path
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name, options)?;
        let contents = std::fs::read(&path)?;
        zip.write_all(&contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// [`zip_dir`] on the blocking pool.
pub async fn zip_dir_async(dir: PathBuf) -> io::Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || zip_dir(&dir))
        .await
        .map_err(io::Error::other)?
}
