//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use firmforge_core::{BuildInvoker, DiskJobStore, JobManager, Reaper};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Firmforge daemon server
pub struct Server {
    config: DaemonConfig,
    store: Arc<DiskJobStore>,
    jobs: JobManager,
    reaper: Option<Arc<Reaper>>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        if config.toolchain.program.trim().is_empty() {
            return Err(DaemonError::Config(
                "toolchain.program must not be empty".to_string(),
            ));
        }

        let store = Arc::new(DiskJobStore::new(&config.storage.root));
        let invoker = BuildInvoker::new(config.toolchain.clone());
        let jobs = JobManager::new(store.clone(), invoker, config.builds.max_concurrent);

        let reaper = config
            .retention
            .enabled
            .then(|| Reaper::new(config.retention.policy(), jobs.clone()));

        Ok(Self {
            config,
            store,
            jobs,
            reaper,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        self.store.ensure_root().await?;
        tracing::info!(root = %self.store.root().display(), "Workspace root ready");

        let toolchain = self.jobs.invoker().probe().await;
        if toolchain.available {
            tracing::info!(version = %toolchain.version, "Toolchain available");
        } else {
            tracing::warn!(
                program = %self.config.toolchain.program,
                "Toolchain not available; builds will fail until it is installed"
            );
        }

        let state = AppState::new(self.jobs.clone());
        let app = create_router(state, &self.config.server);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Firmforge daemon listening on {}", addr);

        if let Some(reaper) = &self.reaper {
            tokio::spawn(reaper.clone().start());
        } else {
            tracing::info!("Retention sweep disabled");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Firmforge daemon shutting down");

        if let Some(reaper) = &self.reaper {
            reaper.stop();
        }

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
