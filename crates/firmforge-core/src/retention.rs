//! Retention sweep for finished jobs

use crate::error::JobResult;
use crate::lifecycle::{JobManager, SweepStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

/// How long finished jobs are kept and how often they are swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

/// Background task deleting expired workspaces and ledger entries.
pub struct Reaper {
    policy: RetentionPolicy,
    jobs: JobManager,
    shutdown_tx: watch::Sender<bool>,
}

impl Reaper {
    pub fn new(policy: RetentionPolicy, jobs: JobManager) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            policy,
            jobs,
            shutdown_tx,
        })
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Run sweeps until [`Reaper::stop`] is called.
    pub async fn start(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            return;
        }

        let mut ticker = interval(self.policy.sweep_interval.max(Duration::from_millis(10)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::info!(
            ttl_secs = self.policy.ttl.as_secs(),
            interval_secs = self.policy.sweep_interval.as_secs(),
            "Reaper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        tracing::error!(error = %e, "Retention sweep failed");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Reaper stopped");
    }

    /// Signal the sweep loop to exit.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub async fn sweep_once(&self) -> JobResult<SweepStats> {
        let stats = self.jobs.sweep(self.policy.ttl).await?;
        if stats != SweepStats::default() {
            tracing::info!(
                workspaces_removed = stats.workspaces_removed,
                records_purged = stats.records_purged,
                "Retention sweep finished"
            );
        } else {
            tracing::debug!("Retention sweep found nothing to remove");
        }
        Ok(stats)
    }
}
