//! Firmforge Daemon - remote firmware compilation service
//!
//! The daemon provides:
//! - REST API for compiling Arduino-style sources for supported boards
//! - Firmware and build-directory downloads
//! - Background expiry of finished jobs

use clap::Parser;
use firmforge_daemon::config::DaemonConfig;
use firmforge_daemon::error::{DaemonError, DaemonResult};
use firmforge_daemon::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Firmforge Daemon CLI
#[derive(Parser)]
#[command(name = "firmforged")]
#[command(about = "Firmforge Daemon - remote firmware compilation service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FIRMFORGE_CONFIG")]
    config: Option<String>,

    /// Listen address (overrides the configuration file)
    #[arg(short, long, env = "FIRMFORGE_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "FIRMFORGE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "FIRMFORGE_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Print startup banner
    println!(
        r#"
  _____ _                 __
 |  ___(_)_ __ _ __ ___  / _| ___  _ __ __ _  ___
 | |_  | | '__| '_ ` _ \| |_ / _ \| '__/ _` |/ _ \
 |  _| | | |  | | | | | |  _| (_) | | | (_| |  __/
 |_|   |_|_|  |_| |_| |_|_|  \___/|_|  \__, |\___|
                                        |___/
  Remote firmware compilation service
  Version: {}
  Toolchain: {}
  Workspaces: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.toolchain.program,
        config.storage.root.display(),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config)?;
    server.run().await
}
