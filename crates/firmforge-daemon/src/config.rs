//! Configuration for firmforge-daemon

use firmforge_core::{RetentionPolicy, ToolchainConfig, DEFAULT_MAX_CONCURRENT_BUILDS};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Workspace storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// External toolchain
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Build scheduling
    #[serde(default)]
    pub builds: BuildsConfig,

    /// Expiry of finished jobs
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one workspace per job
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Build scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildsConfig {
    /// Maximum toolchain processes running at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for BuildsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Run the background reaper
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Age after which a finished job is deleted
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Time between sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl RetentionConfig {
    pub fn policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            ttl: Duration::from_secs(self.ttl_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

fn default_max_body_size() -> usize {
    16 * 1024 * 1024
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("/tmp/pio_compiler")
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_BUILDS
}

fn default_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `FIRMFORGE_*` environment variables (`__` separates nested keys, e.g.
    /// `FIRMFORGE_TOOLCHAIN__TIMEOUT_SECS`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FIRMFORGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(config.server.listen_addr.ip().is_unspecified());
        assert_eq!(config.storage.root, PathBuf::from("/tmp/pio_compiler"));
        assert_eq!(config.toolchain.program, "pio");
        assert_eq!(config.toolchain.timeout_secs, 300);
        assert_eq!(config.builds.max_concurrent, 4);
    }

    #[test]
    fn test_retention_policy() {
        let retention = RetentionConfig::default();
        assert!(retention.enabled);
        let policy = retention.policy();
        assert_eq!(policy.ttl, Duration::from_secs(3600));
        assert_eq!(policy.sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("firmforge.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[storage]
root = "/var/lib/firmforge"

[toolchain]
program = "/opt/pio/bin/pio"
timeout_secs = 120

[retention]
enabled = false
"#
        )
        .unwrap();

        let config = DaemonConfig::load(path.to_str()).unwrap();
        assert_eq!(config.storage.root, PathBuf::from("/var/lib/firmforge"));
        assert_eq!(config.toolchain.program, "/opt/pio/bin/pio");
        assert_eq!(config.toolchain.timeout_secs, 120);
        assert_eq!(config.toolchain.args, vec!["run", "-d", "{workspace}"]);
        assert!(!config.retention.enabled);
        assert_eq!(config.retention.ttl_secs, 3600);
        assert_eq!(config.server.listen_addr.port(), 8080);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = DaemonConfig::load(Some("/nonexistent/firmforge")).unwrap();
        assert_eq!(config.builds.max_concurrent, 4);
    }
}
