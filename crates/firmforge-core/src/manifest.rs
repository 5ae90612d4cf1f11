//! Build manifest (`platformio.ini`) generation

use firmforge_types::TargetConfig;
use std::fmt::Write;

/// File name of the manifest inside a workspace.
pub const MANIFEST_FILE: &str = "platformio.ini";

/// Name of the single build environment every manifest declares. The
/// toolchain writes its output under `.pio/build/<env>`.
pub const ENV_NAME: &str = "target";

/// Manifest contents for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest<'a> {
    pub target: TargetConfig,
    pub libraries: &'a [String],
    pub flags: &'a [String],
}

impl<'a> BuildManifest<'a> {
    pub fn new(target: TargetConfig, libraries: &'a [String], flags: &'a [String]) -> Self {
        Self {
            target,
            libraries,
            flags,
        }
    }

    /// Render the manifest. Output depends only on the target, libraries and
    /// flags; list entries are written verbatim.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "[env:{}]", ENV_NAME);
        let _ = writeln!(out, "platform = {}", self.target.platform);
        let _ = writeln!(out, "board = {}", self.target.board);
        let _ = writeln!(out, "framework = {}", self.target.framework);

        write_list(&mut out, "lib_deps", self.libraries);
        write_list(&mut out, "build_flags", self.flags);
        out
    }
}

fn write_list(out: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{} =", key);
    for item in items {
        let _ = writeln!(out, "    {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uno() -> TargetConfig {
        TargetConfig::new("atmelavr", "uno", "arduino")
    }

    #[test]
    fn test_minimal_manifest() {
        let rendered = BuildManifest::new(uno(), &[], &[]).render();
        assert_eq!(
            rendered,
            "[env:target]\nplatform = atmelavr\nboard = uno\nframework = arduino\n"
        );
    }

    #[test]
    fn test_manifest_with_libraries_and_flags() {
        let libs = vec!["Wire".to_string(), "SPI".to_string()];
        let flags = vec!["-DDEBUG".to_string()];
        let rendered = BuildManifest::new(uno(), &libs, &flags).render();

        assert_eq!(
            rendered,
            "[env:target]\n\
             platform = atmelavr\n\
             board = uno\n\
             framework = arduino\n\
             \n\
             lib_deps =\n    Wire\n    SPI\n\
             \n\
             build_flags =\n    -DDEBUG\n"
        );
    }

    #[test]
    fn test_entries_are_not_deduplicated() {
        let libs = vec!["Servo".to_string(), "Servo".to_string()];
        let rendered = BuildManifest::new(uno(), &libs, &[]).render();
        assert_eq!(rendered.matches("    Servo\n").count(), 2);
        assert!(!rendered.contains("build_flags"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let flags = vec!["-O2".to_string()];
        let a = BuildManifest::new(uno(), &[], &flags).render();
        let b = BuildManifest::new(uno(), &[], &flags).render();
        assert_eq!(a, b);
    }
}
